//! Display helpers shared by the verdict copy and the CLI.

/// Whole euros with comma grouping, e.g. `€24,000` or `-€1,500`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "€–".to_string();
    }
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}€{grouped}")
}

/// `"<y> year(s) <m> month(s)"`, pluralising each unit on its own.
pub fn format_duration(total_months: u32) -> String {
    let years = total_months / 12;
    let months = total_months % 12;
    format!(
        "{years} {} {months} {}",
        plural(years, "year", "years"),
        plural(months, "month", "months")
    )
}

/// A percentage without trailing zeros: `6`, `6.5`.
pub fn format_rate(percent: f64) -> String {
    if percent.fract() == 0.0 {
        format!("{percent:.0}")
    } else {
        let text = format!("{percent:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn plural(count: u32, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 { one } else { many }
}
