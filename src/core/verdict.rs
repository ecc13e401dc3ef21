use super::format::{format_currency, format_duration, format_rate};
use super::types::{
    BASE_DEPOSIT_PERCENT, FIVE_YEARS_MONTHS, InputModel, MeterSegment, ProjectionResult, Verdict,
    VerdictBucket, VerdictPolicy,
};

pub const METER_LABELS: [&str; 4] = [
    "Out of reach",
    "Over 5 years",
    "Under 5 years",
    "Deposit stage",
];

const NOT_REACHABLE: &str = "Not reachable";
const ALREADY_SAVED: &str = "Deposit already saved";
const NOT_AVAILABLE: &str = "Not available";

/// Maps a projection onto its outcome bucket. First matching rule wins.
pub fn classify(
    inputs: &InputModel,
    projection: Option<&ProjectionResult>,
    policy: VerdictPolicy,
) -> Verdict {
    let Some(projection) = projection else {
        return needs_input();
    };

    if policy == VerdictPolicy::IncomeCap
        && projection.required_deposit_percent_today > BASE_DEPOSIT_PERCENT
    {
        return income_mismatch(inputs, projection);
    }

    if inputs.current_savings >= projection.deposit_today {
        return deposit_saved(inputs, projection);
    }

    match projection.catch_month {
        None => cant_save(inputs, projection),
        Some(month) if month <= FIVE_YEARS_MONTHS => reachable(
            VerdictBucket::Under5y,
            "Within five years",
            "Your savings pace outruns price growth within five years.",
            month,
            projection,
        ),
        Some(month) => reachable(
            VerdictBucket::Over5y,
            "More than five years",
            "You get there, but rising prices stretch the journey past five years.",
            month,
            projection,
        ),
    }
}

fn needs_input() -> Verdict {
    build(
        VerdictBucket::NeedsInput,
        0,
        "Add your numbers",
        "Enter your income, target price, savings and a price growth rate to see a result."
            .to_string(),
        "Results appear here when required inputs are present.",
        NOT_AVAILABLE.to_string(),
        None,
    )
}

fn income_mismatch(inputs: &InputModel, projection: &ProjectionResult) -> Verdict {
    let max_mortgage = projection.max_mortgage.unwrap_or_default();
    let detail = format!(
        "Borrowing at 4x income tops out around {}, so about {}% of {} would need to come from savings today.",
        format_currency(max_mortgage),
        format_rate((projection.required_deposit_percent_today * 100.0).round()),
        format_currency(inputs.target_property_price),
    );
    let mut verdict = build(
        VerdictBucket::IncomeMismatch,
        3,
        "Income and price mismatch",
        detail,
        "On a rule-of-thumb basis this price sits above what your income usually supports.",
        time_to_save(projection.catch_month),
        Some(format!(
            "Deposit needed today at this price: {}.",
            format_currency(projection.deposit_today)
        )),
    );
    verdict.rule_of_thumb_only = true;
    verdict
}

fn deposit_saved(inputs: &InputModel, projection: &ProjectionResult) -> Verdict {
    build(
        VerdictBucket::DepositSaved,
        3,
        "Deposit saved",
        format!(
            "Your savings of {} already cover the {} deposit on {}.",
            format_currency(inputs.current_savings),
            format_currency(projection.deposit_today),
            format_currency(inputs.target_property_price),
        ),
        "You have reached today's deposit target.",
        ALREADY_SAVED.to_string(),
        None,
    )
}

fn cant_save(inputs: &InputModel, projection: &ProjectionResult) -> Verdict {
    build(
        VerdictBucket::CantSave,
        0,
        "Out of reach at this pace",
        format!(
            "Saving {} a month does not catch a deposit rising at {}% a year within 40 years.",
            format_currency(inputs.monthly_savings),
            format_rate(inputs.property_growth_rate),
        ),
        "The deposit target moves faster than your savings.",
        NOT_REACHABLE.to_string(),
        Some(format!(
            "Today's deposit target is {}.",
            format_currency(projection.deposit_today)
        )),
    )
}

fn reachable(
    bucket: VerdictBucket,
    label: &str,
    outcome: &str,
    month: u32,
    projection: &ProjectionResult,
) -> Verdict {
    let supporting_line = projection.deposit_at_catch.map(|deposit| {
        format!(
            "Deposit needed at that point: {}.",
            format_currency(deposit)
        )
    });
    let meter_index = if bucket == VerdictBucket::Under5y { 2 } else { 1 };
    build(
        bucket,
        meter_index,
        label,
        format!(
            "You catch the rising deposit in {}.",
            format_duration(month)
        ),
        outcome,
        format_duration(month),
        supporting_line,
    )
}

fn time_to_save(catch_month: Option<u32>) -> String {
    match catch_month {
        Some(0) => ALREADY_SAVED.to_string(),
        Some(month) => format_duration(month),
        None => NOT_REACHABLE.to_string(),
    }
}

fn build(
    bucket: VerdictBucket,
    meter_index: usize,
    label: &str,
    detail: String,
    outcome: &str,
    time_to_save: String,
    supporting_line: Option<String>,
) -> Verdict {
    let meter = METER_LABELS
        .into_iter()
        .enumerate()
        .map(|(i, label)| MeterSegment {
            label,
            active: i == meter_index,
        })
        .collect();

    Verdict {
        bucket,
        label: label.to_string(),
        detail,
        outcome: outcome.to_string(),
        time_to_save,
        supporting_line,
        meter_index,
        meter,
        rule_of_thumb_only: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::project;
    use proptest::prelude::{prop_assert_eq, proptest};

    fn sample_inputs() -> InputModel {
        InputModel {
            gross_annual_income: 60_000.0,
            target_property_price: 240_000.0,
            current_savings: 0.0,
            monthly_savings: 400.0,
            property_growth_rate: 6.0,
        }
    }

    fn classify_inputs(inputs: &InputModel, policy: VerdictPolicy) -> Verdict {
        let projection = project(inputs, policy);
        classify(inputs, Some(&projection), policy)
    }

    fn active_segments(verdict: &Verdict) -> Vec<usize> {
        verdict
            .meter
            .iter()
            .enumerate()
            .filter(|(_, segment)| segment.active)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn missing_projection_needs_input() {
        let verdict = classify(&sample_inputs(), None, VerdictPolicy::IncomeCap);
        assert_eq!(verdict.bucket, VerdictBucket::NeedsInput);
        assert_eq!(verdict.meter_index, 0);
        assert_eq!(verdict.time_to_save, NOT_AVAILABLE);
    }

    #[test]
    fn slow_saver_lands_over_five_years() {
        let verdict = classify_inputs(&sample_inputs(), VerdictPolicy::Simple);
        assert_eq!(verdict.bucket, VerdictBucket::Over5y);
        assert_eq!(verdict.meter_index, 1);
        assert!(verdict.time_to_save.contains("years"));
        assert!(verdict.supporting_line.is_some());
        assert!(!verdict.rule_of_thumb_only);
    }

    #[test]
    fn fast_saver_lands_under_five_years() {
        let mut inputs = sample_inputs();
        inputs.current_savings = 10_000.0;
        inputs.monthly_savings = 800.0;
        let verdict = classify_inputs(&inputs, VerdictPolicy::Simple);
        assert_eq!(verdict.bucket, VerdictBucket::Under5y);
        assert_eq!(verdict.meter_index, 2);
    }

    #[test]
    fn deposit_already_saved() {
        let mut inputs = sample_inputs();
        inputs.current_savings = 24_000.0;
        let verdict = classify_inputs(&inputs, VerdictPolicy::Simple);
        assert_eq!(verdict.bucket, VerdictBucket::DepositSaved);
        assert_eq!(verdict.meter_index, 3);
        assert_eq!(verdict.time_to_save, "Deposit already saved");
    }

    #[test]
    fn unreachable_deposit_cannot_be_saved() {
        let mut inputs = sample_inputs();
        inputs.monthly_savings = 0.0;
        let verdict = classify_inputs(&inputs, VerdictPolicy::Simple);
        assert_eq!(verdict.bucket, VerdictBucket::CantSave);
        assert_eq!(verdict.meter_index, 0);
        assert_eq!(verdict.time_to_save, "Not reachable");
    }

    #[test]
    fn income_mismatch_wins_regardless_of_savings_pace() {
        let mut inputs = sample_inputs();
        inputs.gross_annual_income = 50_000.0;
        inputs.target_property_price = 400_000.0;
        inputs.monthly_savings = 10_000.0;
        let verdict = classify_inputs(&inputs, VerdictPolicy::IncomeCap);
        assert_eq!(verdict.bucket, VerdictBucket::IncomeMismatch);
        assert_eq!(verdict.meter_index, 3);
        assert!(verdict.rule_of_thumb_only);
        assert!(verdict.detail.contains("50%"));
        assert!(verdict.detail.contains("€200,000"));
    }

    #[test]
    fn income_mismatch_precedes_deposit_saved() {
        let mut inputs = sample_inputs();
        inputs.gross_annual_income = 50_000.0;
        inputs.target_property_price = 400_000.0;
        inputs.current_savings = 250_000.0;
        let verdict = classify_inputs(&inputs, VerdictPolicy::IncomeCap);
        assert_eq!(verdict.bucket, VerdictBucket::IncomeMismatch);
        assert_eq!(verdict.time_to_save, "Deposit already saved");
    }

    #[test]
    fn income_requirement_at_floor_is_not_a_mismatch() {
        let mut inputs = sample_inputs();
        inputs.gross_annual_income = 54_000.0;
        inputs.target_property_price = 240_000.0;
        let projection = project(&inputs, VerdictPolicy::IncomeCap);
        assert!((projection.required_deposit_percent_today - BASE_DEPOSIT_PERCENT).abs() < 1e-12);

        let verdict = classify(&inputs, Some(&projection), VerdictPolicy::IncomeCap);
        assert_ne!(verdict.bucket, VerdictBucket::IncomeMismatch);
        assert_eq!(verdict.bucket, VerdictBucket::Over5y);
        assert!(!verdict.rule_of_thumb_only);
    }

    #[test]
    fn simple_policy_never_reports_income_mismatch() {
        let mut inputs = sample_inputs();
        inputs.gross_annual_income = 50_000.0;
        inputs.target_property_price = 400_000.0;
        let verdict = classify_inputs(&inputs, VerdictPolicy::Simple);
        assert_ne!(verdict.bucket, VerdictBucket::IncomeMismatch);
    }

    #[test]
    fn meter_always_lists_four_segments_with_one_active() {
        let mut inputs = sample_inputs();
        for monthly in [0.0, 400.0, 2_000.0] {
            inputs.monthly_savings = monthly;
            let verdict = classify_inputs(&inputs, VerdictPolicy::Simple);
            assert_eq!(verdict.meter.len(), 4);
            assert_eq!(active_segments(&verdict), vec![verdict.meter_index]);
            let labels: Vec<&str> = verdict.meter.iter().map(|s| s.label).collect();
            assert_eq!(labels, METER_LABELS);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_covered_deposit_is_always_saved(
            price_k in 50u32..2_000,
            surplus in 0u32..50_000,
            monthly_savings in 0u32..10_000,
            growth_half_points in 6u32..19,
        ) {
            let mut inputs = InputModel {
                gross_annual_income: 60_000.0,
                target_property_price: price_k as f64 * 1_000.0,
                current_savings: 0.0,
                monthly_savings: monthly_savings as f64,
                property_growth_rate: growth_half_points as f64 * 0.5,
            };
            inputs.current_savings = inputs.target_property_price * BASE_DEPOSIT_PERCENT + surplus as f64;
            let verdict = classify_inputs(&inputs, VerdictPolicy::Simple);
            prop_assert_eq!(verdict.bucket, VerdictBucket::DepositSaved);
        }
    }
}
