use crate::config::{MAX_DEBOUNCE_MS, MIN_DEBOUNCE_MS};
use asset_filters::EmptyQueryPolicy;
use once_cell::sync::Lazy;
use regex::Regex;

// Compiled regexes for tag sanitizing
static WHITESPACE_RUN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static DISALLOWED_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9-]").unwrap());
static EDGE_HYPHENS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-+|-+$").unwrap());

/// Normalize a free-text tag.
///
/// Trims, lowercases, turns whitespace runs into `-`, drops anything outside
/// `[a-z0-9-]` and strips leading/trailing hyphens.
pub fn sanitize_tag(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let hyphenated = WHITESPACE_RUN_REGEX.replace_all(&lowered, "-");
    let cleaned = DISALLOWED_REGEX.replace_all(&hyphenated, "");
    EDGE_HYPHENS_REGEX.replace_all(&cleaned, "").into_owned()
}

/// Generic numeric input validation
pub fn validate_numeric_input<T>(
    input: &str,
    min: Option<T>,
    max: Option<T>,
    field_name: &str,
) -> Result<T, String>
where
    T: std::str::FromStr + std::fmt::Display + PartialOrd,
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", field_name));
    }

    match trimmed.parse::<T>() {
        Ok(val) => {
            if let Some(min_val) = min {
                if val < min_val {
                    return Err(format!("{} must be at least {}", field_name, min_val));
                }
            }
            if let Some(max_val) = max {
                if val > max_val {
                    return Err(format!("{} cannot exceed {}", field_name, max_val));
                }
            }
            Ok(val)
        }
        Err(_) => Err(format!("{} must be a valid number", field_name)),
    }
}

/// Validate a `data-debounce-ms` override
pub fn parse_debounce_ms(input: &str) -> Result<u32, String> {
    validate_numeric_input(input, Some(MIN_DEBOUNCE_MS), Some(MAX_DEBOUNCE_MS), "Debounce")
}

/// Validate a `data-empty-query` override
pub fn parse_empty_query(input: &str) -> Result<EmptyQueryPolicy, String> {
    match input.trim() {
        "all" => Ok(EmptyQueryPolicy::ShowAll),
        "none" => Ok(EmptyQueryPolicy::ShowNone),
        other => Err(format!("expected `all` or `none`, got {:?}", other)),
    }
}
