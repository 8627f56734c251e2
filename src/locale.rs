use crate::{
    constants::{INVARIANT_LOCALE, MAX_DECIMALS},
    error::{Error, Result},
};
use chrono::{format::StrftimeItems, format::Item, DateTime, NaiveDate};
use log::debug;
use regex::Regex;
use std::fmt::{Display, Write};
use std::sync::OnceLock;

const TAG_PATTERN: &str = r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,8})*$";

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(TAG_PATTERN).expect("locale tag pattern is valid"))
}

/// Number and date conventions for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatProvider {
    tag: String,
    decimal_separator: char,
    group_separator: char,
    date_format: &'static str,
    datetime_format: &'static str,
}

impl FormatProvider {
    /// Culture-neutral conventions: `1,234.5`, `2024-03-09`.
    pub fn invariant() -> Self {
        Self {
            tag: INVARIANT_LOCALE.to_string(),
            decimal_separator: '.',
            group_separator: ',',
            date_format: "%Y-%m-%d",
            datetime_format: "%Y-%m-%d %H:%M:%S",
        }
    }

    /// Looks up conventions for a BCP 47 style tag such as `de-DE`.
    ///
    /// Unknown languages keep their tag but use invariant conventions. Empty
    /// or malformed tags are rejected.
    pub fn for_tag(tag: &str) -> Result<Self> {
        let tag = tag.trim();
        if tag.eq_ignore_ascii_case(INVARIANT_LOCALE) {
            return Ok(Self::invariant());
        }
        if !tag_regex().is_match(tag) {
            return Err(Error::invalid_argument(
                "format_provider",
                format!("'{tag}' is not a valid locale tag"),
            ));
        }

        let mut subtags = tag.split('-');
        let language = subtags.next().unwrap_or_default().to_ascii_lowercase();
        let region = subtags.next().map(str::to_ascii_uppercase);

        let (decimal_separator, group_separator, date_format, datetime_format) =
            match (language.as_str(), region.as_deref()) {
                ("en", Some("GB" | "AU" | "IE" | "NZ")) => {
                    ('.', ',', "%d/%m/%Y", "%d/%m/%Y %H:%M")
                }
                ("en", _) => ('.', ',', "%m/%d/%Y", "%m/%d/%Y %I:%M %p"),
                ("de", _) => (',', '.', "%d.%m.%Y", "%d.%m.%Y %H:%M"),
                ("fr", _) => (',', '\u{202f}', "%d/%m/%Y", "%d/%m/%Y %H:%M"),
                ("es" | "it" | "pt", _) => (',', '.', "%d/%m/%Y", "%d/%m/%Y %H:%M"),
                ("nl", _) => (',', '.', "%d-%m-%Y", "%d-%m-%Y %H:%M"),
                ("ja" | "zh", _) => ('.', ',', "%Y/%m/%d", "%Y/%m/%d %H:%M"),
                _ => {
                    debug!("No conventions known for '{tag}', using invariant formats");
                    let invariant = Self::invariant();
                    return Ok(Self { tag: tag.to_string(), ..invariant });
                }
            };

        Ok(Self {
            tag: tag.to_string(),
            decimal_separator,
            group_separator,
            date_format,
            datetime_format,
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    pub fn group_separator(&self) -> char {
        self.group_separator
    }

    /// Formats `value` with `decimals` fractional digits and grouped thousands.
    ///
    /// `decimals` is capped at [`MAX_DECIMALS`].
    pub fn format_number(&self, value: f64, decimals: usize) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let decimals = decimals.min(MAX_DECIMALS);
        let digits = format!("{:.*}", decimals, value.abs());
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (digits.as_str(), None),
        };

        let mut out = String::with_capacity(digits.len() + int_part.len() / 3 + 1);
        if value < 0.0 && digits.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
            out.push('-');
        }
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                out.push(self.group_separator);
            }
            out.push(ch);
        }
        if let Some(frac_part) = frac_part {
            out.push(self.decimal_separator);
            out.push_str(frac_part);
        }
        out
    }

    /// Formats an RFC 3339 timestamp or a `YYYY-MM-DD` date.
    ///
    /// Without `pattern` the locale's datetime or date format is used. The
    /// pattern uses strftime syntax.
    pub fn format_date(&self, value: &str, pattern: Option<&str>) -> Result<String> {
        if let Some(pattern) = pattern {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(Error::invalid_argument(
                    "pattern",
                    format!("'{pattern}' is not a valid date format"),
                ));
            }
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return write_formatted(dt.format(pattern.unwrap_or(self.datetime_format)));
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return write_formatted(date.format(pattern.unwrap_or(self.date_format)));
        }
        Err(Error::invalid_argument("value", format!("'{value}' is not a date")))
    }
}

// chrono reports specifiers that do not apply to the value (a time on a
// plain date) as a fmt error, which `to_string` would turn into a panic.
fn write_formatted(formatted: impl Display) -> Result<String> {
    let mut out = String::new();
    write!(out, "{formatted}").map_err(|_| {
        Error::invalid_argument("pattern", "date format does not apply to this value")
    })?;
    Ok(out)
}

impl Default for FormatProvider {
    fn default() -> Self {
        Self::invariant()
    }
}
