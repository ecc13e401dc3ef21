use serde::{Deserialize, Serialize};

/// Deposit share required when income is not the binding constraint.
pub const BASE_DEPOSIT_PERCENT: f64 = 0.10;
/// Rule-of-thumb borrowing limit as a multiple of gross annual income.
pub const MAX_MORTGAGE_INCOME_MULTIPLE: f64 = 4.0;
/// Upper bound used when the target price is capped to income.
pub const PRICE_CAP_INCOME_MULTIPLE: f64 = 5.0;
/// Projection horizon in months (40 years).
pub const HORIZON_MONTHS: u32 = 480;
/// Catch months at or below this count as "under five years".
pub const FIVE_YEARS_MONTHS: u32 = 60;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerdictPolicy {
    /// Flat 10% deposit, four outcome buckets.
    Simple,
    /// Deposit rises when 4x income cannot cover the price; adds `INCOME_MISMATCH`.
    IncomeCap,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceCoupling {
    Off,
    FollowIncome,
    CapToIncome,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InputField {
    GrossAnnualIncome,
    TargetPropertyPrice,
    CurrentSavings,
    MonthlySavings,
    PropertyGrowthRate,
}

impl InputField {
    pub const ALL: [InputField; 5] = [
        InputField::GrossAnnualIncome,
        InputField::TargetPropertyPrice,
        InputField::CurrentSavings,
        InputField::MonthlySavings,
        InputField::PropertyGrowthRate,
    ];

    /// Key used in the persisted record and in API payloads.
    pub fn key(self) -> &'static str {
        match self {
            InputField::GrossAnnualIncome => "grossAnnualIncome",
            InputField::TargetPropertyPrice => "targetPropertyPrice",
            InputField::CurrentSavings => "currentSavings",
            InputField::MonthlySavings => "monthlySavings",
            InputField::PropertyGrowthRate => "propertyGrowthRate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputModel {
    pub gross_annual_income: f64,
    pub target_property_price: f64,
    pub current_savings: f64,
    pub monthly_savings: f64,
    /// Percent per year, e.g. `6.0` for 6%.
    pub property_growth_rate: f64,
}

impl InputModel {
    pub fn get(&self, field: InputField) -> f64 {
        match field {
            InputField::GrossAnnualIncome => self.gross_annual_income,
            InputField::TargetPropertyPrice => self.target_property_price,
            InputField::CurrentSavings => self.current_savings,
            InputField::MonthlySavings => self.monthly_savings,
            InputField::PropertyGrowthRate => self.property_growth_rate,
        }
    }

    pub fn set(&mut self, field: InputField, value: f64) {
        let slot = match field {
            InputField::GrossAnnualIncome => &mut self.gross_annual_income,
            InputField::TargetPropertyPrice => &mut self.target_property_price,
            InputField::CurrentSavings => &mut self.current_savings,
            InputField::MonthlySavings => &mut self.monthly_savings,
            InputField::PropertyGrowthRate => &mut self.property_growth_rate,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRange {
    pub default: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl FieldRange {
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    /// Clamp into `[min, max]` and snap to the nearest step counted from `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.default;
        }
        let bounded = value.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return bounded;
        }
        let steps = ((bounded - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputConfig {
    pub gross_annual_income: FieldRange,
    pub target_property_price: FieldRange,
    pub current_savings: FieldRange,
    pub monthly_savings: FieldRange,
    pub property_growth_rate: FieldRange,
}

impl InputConfig {
    pub fn range(&self, field: InputField) -> &FieldRange {
        match field {
            InputField::GrossAnnualIncome => &self.gross_annual_income,
            InputField::TargetPropertyPrice => &self.target_property_price,
            InputField::CurrentSavings => &self.current_savings,
            InputField::MonthlySavings => &self.monthly_savings,
            InputField::PropertyGrowthRate => &self.property_growth_rate,
        }
    }

    pub fn defaults(&self) -> InputModel {
        InputModel {
            gross_annual_income: self.gross_annual_income.default,
            target_property_price: self.target_property_price.default,
            current_savings: self.current_savings.default,
            monthly_savings: self.monthly_savings.default,
            property_growth_rate: self.property_growth_rate.default,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            gross_annual_income: FieldRange {
                default: 60_000.0,
                min: 10_000.0,
                max: 400_000.0,
                step: 1_000.0,
            },
            target_property_price: FieldRange {
                default: 240_000.0,
                min: 50_000.0,
                max: 2_000_000.0,
                step: 5_000.0,
            },
            current_savings: FieldRange {
                default: 10_000.0,
                min: 0.0,
                max: 500_000.0,
                step: 500.0,
            },
            monthly_savings: FieldRange {
                default: 800.0,
                min: 0.0,
                max: 10_000.0,
                step: 50.0,
            },
            property_growth_rate: FieldRange {
                default: 6.0,
                min: 3.0,
                max: 9.0,
                step: 0.5,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub deposit_today: f64,
    pub deposit_percent_used: f64,
    pub required_deposit_percent_today: f64,
    /// Only set under [`VerdictPolicy::IncomeCap`].
    pub max_mortgage: Option<f64>,
    pub monthly_growth_rate: f64,
    pub catch_month: Option<u32>,
    pub deposit_at_catch: Option<f64>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictBucket {
    NeedsInput,
    IncomeMismatch,
    DepositSaved,
    CantSave,
    #[serde(rename = "UNDER_5Y")]
    Under5y,
    #[serde(rename = "OVER_5Y")]
    Over5y,
}

impl VerdictBucket {
    /// Name used in outbound links; matches the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            VerdictBucket::NeedsInput => "NEEDS_INPUT",
            VerdictBucket::IncomeMismatch => "INCOME_MISMATCH",
            VerdictBucket::DepositSaved => "DEPOSIT_SAVED",
            VerdictBucket::CantSave => "CANT_SAVE",
            VerdictBucket::Under5y => "UNDER_5Y",
            VerdictBucket::Over5y => "OVER_5Y",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterSegment {
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub bucket: VerdictBucket,
    pub label: String,
    pub detail: String,
    pub outcome: String,
    pub time_to_save: String,
    pub supporting_line: Option<String>,
    pub meter_index: usize,
    pub meter: Vec<MeterSegment>,
    pub rule_of_thumb_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub inputs: InputModel,
    pub policy: VerdictPolicy,
    pub projection: Option<ProjectionResult>,
    pub verdict: Verdict,
    pub next_steps_link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_snaps_to_step_from_min() {
        let range = InputConfig::default().property_growth_rate;
        assert_eq!(range.clamp(6.3), 6.5);
        assert_eq!(range.clamp(1.0), 3.0);
        assert_eq!(range.clamp(12.0), 9.0);
        assert_eq!(range.clamp(f64::NAN), 6.0);
    }

    #[test]
    fn clamp_keeps_on_step_values() {
        let range = InputConfig::default().target_property_price;
        assert_eq!(range.clamp(240_000.0), 240_000.0);
        assert_eq!(range.clamp(242_400.0), 240_000.0);
        assert_eq!(range.clamp(242_600.0), 245_000.0);
    }

    #[test]
    fn input_model_set_and_get_cover_every_field() {
        let mut inputs = InputConfig::default().defaults();
        for (i, field) in InputField::ALL.into_iter().enumerate() {
            inputs.set(field, i as f64 + 1.0);
        }
        for (i, field) in InputField::ALL.into_iter().enumerate() {
            assert_eq!(inputs.get(field), i as f64 + 1.0);
        }
    }

    #[test]
    fn bucket_names_match_serialization() {
        for bucket in [
            VerdictBucket::NeedsInput,
            VerdictBucket::IncomeMismatch,
            VerdictBucket::DepositSaved,
            VerdictBucket::CantSave,
            VerdictBucket::Under5y,
            VerdictBucket::Over5y,
        ] {
            let json = serde_json::to_string(&bucket).expect("bucket should serialize");
            assert_eq!(json, format!("\"{}\"", bucket.as_str()));
        }
    }

    #[test]
    fn input_model_serializes_flat_camel_case_record() {
        let json = serde_json::to_value(InputConfig::default().defaults())
            .expect("inputs should serialize");
        let object = json.as_object().expect("flat object");
        assert_eq!(object.len(), 5);
        for field in InputField::ALL {
            assert!(object.contains_key(field.key()), "missing {}", field.key());
        }
    }
}
