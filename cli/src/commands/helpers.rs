use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            "tomorrow" => Ok(Local::now().date_naive() + chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

/// Parse a "name:value" pair argument ("Rice:200" or "Rice:200g").
pub(crate) fn parse_name_value(s: &str) -> Result<(String, f64)> {
    let Some((name, value)) = s.split_once(':') else {
        bail!("Invalid entry '{s}'. Use format 'name:value' (e.g. 'Rice:200')");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("Invalid entry '{s}'. Name must not be empty");
    }
    let value = parse_grams(value)?;
    Ok((name.to_string(), value))
}

/// Parse a quantity like "200" or "200g".
pub(crate) fn parse_grams(s: &str) -> Result<f64> {
    let trimmed = s.trim().trim_end_matches('g').trim();
    let value: f64 = trimmed
        .parse()
        .with_context(|| format!("Invalid quantity: '{s}'. Use a number like '200' or '200g'"))?;
    if value <= 0.0 {
        bail!("Quantity must be greater than 0");
    }
    Ok(value)
}

/// Render an optional value, "N/A" when absent.
pub(crate) fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.precision$}"))
}

/// Render a signed delta with its sign, "N/A" when absent.
pub(crate) fn fmt_delta(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:+.2}", no_neg_zero(v)))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}
