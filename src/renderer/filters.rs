use crate::{constants::MAX_DECIMALS, locale::FormatProvider};
use log::warn;
use minijinja::{Environment, Error, ErrorKind};
use regex::Regex;
use std::sync::Arc;

/// Fraction digits used by `format_number` when the template gives none.
pub const DEFAULT_DECIMALS: usize = 2;

/// Tests if a string matches a given regular expression pattern.
///
/// An invalid pattern never matches.
pub fn matches_filter(val: &str, re: &str) -> bool {
    match Regex::new(re) {
        Ok(re) => re.is_match(val),
        Err(err) => {
            warn!("Invalid regex '{re}': {err}");
            false
        }
    }
}

/// Registers the filters that do not depend on the render call.
pub fn register(env: &mut Environment<'static>) {
    env.add_filter("matches", matches_filter);
}

/// Registers `format_number` and `format_date` bound to one format provider.
///
/// Both filters report bad arguments as evaluator errors so the caller's
/// disclosure policy applies to them.
///
/// # Arguments
/// * `env` - The environment to register the filters on
/// * `provider` - Locale conventions for this render call
pub fn register_locale_filters(env: &mut Environment<'static>, provider: Arc<FormatProvider>) {
    let numbers = Arc::clone(&provider);
    env.add_filter(
        "format_number",
        move |value: f64, decimals: Option<usize>| -> Result<String, Error> {
            let decimals = decimals.unwrap_or(DEFAULT_DECIMALS);
            if decimals > MAX_DECIMALS {
                return Err(Error::new(
                    ErrorKind::InvalidOperation,
                    format!("format_number accepts at most {MAX_DECIMALS} decimals, got {decimals}"),
                ));
            }
            Ok(numbers.format_number(value, decimals))
        },
    );
    env.add_filter(
        "format_date",
        move |value: String, pattern: Option<String>| -> Result<String, Error> {
            provider
                .format_date(&value, pattern.as_deref())
                .map_err(|err| Error::new(ErrorKind::InvalidOperation, err.to_string()))
        },
    );
}
