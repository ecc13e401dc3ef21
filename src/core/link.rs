use super::types::{InputModel, ProjectionResult, Verdict};

pub const NEXT_STEPS_PATH: &str = "/next-steps";

/// Query link handed to the next-steps page: `bucket`, `months` (or `na`),
/// plus `tpp`/`ghi` when the inputs produced a projection.
pub fn next_steps_link(
    verdict: &Verdict,
    projection: Option<&ProjectionResult>,
    inputs: &InputModel,
) -> String {
    let months = projection
        .and_then(|p| p.catch_month)
        .map_or_else(|| "na".to_string(), |m| m.to_string());

    let mut link = format!(
        "{NEXT_STEPS_PATH}?bucket={}&months={months}",
        verdict.bucket.as_str()
    );
    if projection.is_some() {
        link.push_str(&format!(
            "&tpp={:.0}&ghi={:.0}",
            inputs.target_property_price.round(),
            inputs.gross_annual_income.round()
        ));
    }
    link
}
