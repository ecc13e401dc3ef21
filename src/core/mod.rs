mod engine;
mod format;
mod link;
mod session;
mod store;
mod types;
mod verdict;

pub use engine::{evaluate, has_required_inputs, monthly_growth_rate, project};
pub use format::{format_currency, format_duration, format_rate};
pub use link::{NEXT_STEPS_PATH, next_steps_link};
pub use session::{Session, SessionSettings};
pub use store::{
    FileStore, KeyValueStore, MemoryStore, STORAGE_KEY, StoreError, clear_inputs, load_inputs,
    save_inputs,
};
pub use types::{
    BASE_DEPOSIT_PERCENT, Evaluation, FieldRange, HORIZON_MONTHS, InputConfig, InputField,
    InputModel, MeterSegment, PriceCoupling, ProjectionResult, Verdict, VerdictBucket,
    VerdictPolicy,
};
pub use verdict::{METER_LABELS, classify};
