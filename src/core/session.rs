use log::debug;

use super::engine::evaluate;
use super::store::{KeyValueStore, clear_inputs, load_inputs, save_inputs};
use super::types::{
    Evaluation, InputConfig, InputField, InputModel, MAX_MORTGAGE_INCOME_MULTIPLE,
    PRICE_CAP_INCOME_MULTIPLE, PriceCoupling, VerdictPolicy,
};

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub config: InputConfig,
    pub policy: VerdictPolicy,
    pub coupling: PriceCoupling,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            config: InputConfig::default(),
            policy: VerdictPolicy::IncomeCap,
            coupling: PriceCoupling::Off,
        }
    }
}

/// One user's calculator state. The in-memory inputs are authoritative; the
/// store is written after every committed change so the next session resumes.
#[derive(Debug)]
pub struct Session<S: KeyValueStore> {
    store: S,
    settings: SessionSettings,
    inputs: InputModel,
}

impl<S: KeyValueStore> Session<S> {
    pub fn start(mut store: S, settings: SessionSettings) -> Self {
        let inputs = load_inputs(&mut store, &settings.config)
            .unwrap_or_else(|| settings.config.defaults());
        Self {
            store,
            settings,
            inputs,
        }
    }

    pub fn inputs(&self) -> &InputModel {
        &self.inputs
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Applies a user edit: clamps to the field range, retargets the price when
    /// income changes under a coupling rule, then persists.
    pub fn set(&mut self, field: InputField, value: f64) -> Evaluation {
        let config = &self.settings.config;
        let clamped = config.range(field).clamp(value);
        self.inputs.set(field, clamped);

        if field == InputField::GrossAnnualIncome {
            if let Some(price) = coupled_price(
                self.settings.coupling,
                clamped,
                self.inputs.target_property_price,
            ) {
                let price = config.target_property_price.clamp(price);
                self.inputs.target_property_price = price;
                debug!("income {clamped} retargeted price to {price}");
            }
        }

        debug!("{} set to {clamped}", field.key());
        save_inputs(&mut self.store, &self.inputs);
        self.evaluate()
    }

    pub fn evaluate(&self) -> Evaluation {
        evaluate(&self.inputs, &self.settings.config, self.settings.policy)
    }

    /// Back to defaults with the stored record removed.
    pub fn reset(&mut self) -> Evaluation {
        self.inputs = self.settings.config.defaults();
        clear_inputs(&mut self.store);
        self.evaluate()
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

fn coupled_price(coupling: PriceCoupling, income: f64, current_price: f64) -> Option<f64> {
    match coupling {
        PriceCoupling::Off => None,
        PriceCoupling::FollowIncome => Some(income * MAX_MORTGAGE_INCOME_MULTIPLE),
        PriceCoupling::CapToIncome => {
            let floor = income * MAX_MORTGAGE_INCOME_MULTIPLE;
            let cap = income * PRICE_CAP_INCOME_MULTIPLE;
            Some(current_price.clamp(floor, cap))
        }
    }
}
