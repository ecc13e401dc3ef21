use super::link::next_steps_link;
use super::types::{
    BASE_DEPOSIT_PERCENT, Evaluation, HORIZON_MONTHS, InputConfig, InputField, InputModel,
    MAX_MORTGAGE_INCOME_MULTIPLE, ProjectionResult, VerdictPolicy,
};
use super::verdict::classify;

#[derive(Debug, Clone, Copy)]
struct DepositRequirement {
    percent_used: f64,
    required_percent_today: f64,
    max_mortgage: Option<f64>,
}

/// True when every field is finite, inside its configured range, and the
/// domain constraints hold (price > 0, income > 0, savings >= 0).
pub fn has_required_inputs(inputs: &InputModel, config: &InputConfig) -> bool {
    let in_range = InputField::ALL
        .into_iter()
        .all(|field| config.range(field).contains(inputs.get(field)));

    in_range
        && inputs.target_property_price > 0.0
        && inputs.gross_annual_income > 0.0
        && inputs.current_savings >= 0.0
        && inputs.monthly_savings >= 0.0
}

/// Exact monthly-compounding equivalent of an annual percentage rate.
pub fn monthly_growth_rate(annual_rate_percent: f64) -> f64 {
    (1.0 + annual_rate_percent / 100.0).powf(1.0 / 12.0) - 1.0
}

/// Runs the month-by-month catch-up search. Callers must check
/// [`has_required_inputs`] first.
pub fn project(inputs: &InputModel, policy: VerdictPolicy) -> ProjectionResult {
    let requirement = deposit_requirement(inputs, policy);
    let deposit_today = inputs.target_property_price * requirement.percent_used;
    let monthly_growth = monthly_growth_rate(inputs.property_growth_rate);

    let mut catch_month = None;
    let mut deposit_at_catch = None;
    for month in 0..=HORIZON_MONTHS {
        let savings = savings_at(inputs, month);
        let target = deposit_target_at(deposit_today, monthly_growth, month);
        if savings >= target {
            catch_month = Some(month);
            deposit_at_catch = Some(target);
            break;
        }
    }

    ProjectionResult {
        deposit_today,
        deposit_percent_used: requirement.percent_used,
        required_deposit_percent_today: requirement.required_percent_today,
        max_mortgage: requirement.max_mortgage,
        monthly_growth_rate: monthly_growth,
        catch_month,
        deposit_at_catch,
    }
}

/// Projection, verdict and outbound link for one set of inputs.
pub fn evaluate(inputs: &InputModel, config: &InputConfig, policy: VerdictPolicy) -> Evaluation {
    let projection = has_required_inputs(inputs, config).then(|| project(inputs, policy));
    let verdict = classify(inputs, projection.as_ref(), policy);
    let next_steps_link = next_steps_link(&verdict, projection.as_ref(), inputs);
    Evaluation {
        inputs: *inputs,
        policy,
        projection,
        verdict,
        next_steps_link,
    }
}

fn deposit_requirement(inputs: &InputModel, policy: VerdictPolicy) -> DepositRequirement {
    match policy {
        VerdictPolicy::Simple => DepositRequirement {
            percent_used: BASE_DEPOSIT_PERCENT,
            required_percent_today: BASE_DEPOSIT_PERCENT,
            max_mortgage: None,
        },
        VerdictPolicy::IncomeCap => {
            let max_mortgage = inputs.gross_annual_income * MAX_MORTGAGE_INCOME_MULTIPLE;
            let shortfall =
                ((inputs.target_property_price - max_mortgage) / inputs.target_property_price)
                    .max(0.0);
            let required = shortfall.max(BASE_DEPOSIT_PERCENT);
            DepositRequirement {
                percent_used: required,
                required_percent_today: required,
                max_mortgage: Some(max_mortgage),
            }
        }
    }
}

fn savings_at(inputs: &InputModel, month: u32) -> f64 {
    inputs.current_savings + inputs.monthly_savings * month as f64
}

fn deposit_target_at(deposit_today: f64, monthly_growth: f64, month: u32) -> f64 {
    deposit_today * (1.0 + monthly_growth).powf(month as f64)
}
