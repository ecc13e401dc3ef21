//! Deposit catch-up calculator: how long a household needs to save a home
//! deposit when the property price keeps rising.

pub mod api;
pub mod core;
