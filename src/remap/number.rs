// src/remap/number.rs

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConfigError;

// ASCII digits only, so every match parses as f64
static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?[0-9]+(\.[0-9]+)?").expect("number pattern should compile"));

/// Most fraction digits kept when rendering a grouped number.
const MAX_FRACTION_DIGITS: usize = 3;

/// Separators used when rendering grouped numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLocale {
    pub id: &'static str,
    pub decimal_separator: char,
    pub thousands_separator: char,
}

pub static EN_US: NumberLocale = NumberLocale {
    id: "en-US",
    decimal_separator: '.',
    thousands_separator: ',',
};

pub static EN_GB: NumberLocale = NumberLocale {
    id: "en-GB",
    decimal_separator: '.',
    thousands_separator: ',',
};

pub static DE_DE: NumberLocale = NumberLocale {
    id: "de-DE",
    decimal_separator: ',',
    thousands_separator: '.',
};

/// U+00A0 NO-BREAK SPACE between groups.
pub static FR_FR: NumberLocale = NumberLocale {
    id: "fr-FR",
    decimal_separator: ',',
    thousands_separator: '\u{00A0}',
};

pub static VI_VN: NumberLocale = NumberLocale {
    id: "vi-VN",
    decimal_separator: ',',
    thousands_separator: '.',
};

static LOCALES: &[&NumberLocale] = &[&EN_US, &EN_GB, &DE_DE, &FR_FR, &VI_VN];

impl NumberLocale {
    /// Look a locale up by tag, accepting `_` for `-` and any case.
    pub fn parse(id: &str) -> Result<Self, ConfigError> {
        let wanted = id.trim().replace('_', "-");
        LOCALES
            .iter()
            .find(|l| l.id.eq_ignore_ascii_case(&wanted))
            .map(|l| **l)
            .ok_or_else(|| ConfigError::UnknownLocale(id.to_string()))
    }
}

impl Default for NumberLocale {
    fn default() -> Self {
        EN_US
    }
}

/// First signed integer/decimal in `text` once thousands commas are removed.
pub fn extract_number(text: &str) -> Option<f64> {
    let stripped = text.replace(',', "");
    NUMBER_RE
        .find(&stripped)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// Render `value` with grouped thousands and up to three fraction digits.
///
/// Rounding is half away from zero on the shortest decimal form of `value`, so `1.0625`
/// renders as `1.063` and `1.0005` as `1.001`.
pub fn format_grouped(value: f64, locale: &NumberLocale) -> String {
    let shortest = value.abs().to_string();
    let (int_part, frac_part) = round_half_up(&shortest, MAX_FRACTION_DIGITS);
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3 + frac_part.len() + 2);
    let is_zero = int_part.bytes().all(|b| b == b'0') && frac_part.is_empty();
    if value.is_sign_negative() && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(&int_part, locale.thousands_separator));
    if !frac_part.is_empty() {
        out.push(locale.decimal_separator);
        out.push_str(frac_part);
    }
    out
}

/// Round a plain non-negative decimal string to `places` fraction digits, ties away from zero.
fn round_half_up(decimal: &str, places: usize) -> (String, String) {
    let (int_part, frac_part) = decimal.split_once('.').unwrap_or((decimal, ""));
    if frac_part.len() <= places {
        return (int_part.to_string(), frac_part.to_string());
    }

    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(places))
        .collect();
    if frac_part.as_bytes()[places] >= b'5' {
        let mut i = kept.len();
        loop {
            if i == 0 {
                kept.insert(0, b'1');
                break;
            }
            i -= 1;
            if kept[i] == b'9' {
                kept[i] = b'0';
            } else {
                kept[i] += 1;
                break;
            }
        }
    }

    let split = kept.len() - places;
    let digits = |bytes: &[u8]| bytes.iter().map(|&b| b as char).collect::<String>();
    (digits(&kept[..split]), digits(&kept[split..]))
}

fn group_thousands(int_part: &str, sep: char) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in int_part.chars().enumerate() {
        let pos_from_end = len - i;
        out.push(ch);
        if pos_from_end > 1 && pos_from_end % 3 == 1 {
            out.push(sep);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_number() {
        assert_eq!(extract_number("1,234"), Some(1234.0));
        assert_eq!(extract_number("TP: -12.5 pts"), Some(-12.5));
        assert_eq!(extract_number("2,500 / 3,000"), Some(2500.0));
        assert_eq!(extract_number("abc"), None);
        // non-ASCII digits are not numbers; the ASCII total after them is
        assert_eq!(extract_number("\u{0663} pts: 1,234"), Some(1234.0));
        assert_eq!(extract_number("\u{0663}\u{0664}"), None);
        assert_eq!(extract_number(""), None);
    }

    #[test]
    fn test_format_grouped_en_us() {
        assert_eq!(format_grouped(1234.0, &EN_US), "1,234");
        assert_eq!(format_grouped(2500.0, &EN_US), "2,500");
        assert_eq!(format_grouped(999.0, &EN_US), "999");
        assert_eq!(format_grouped(1234567.891, &EN_US), "1,234,567.891");
        assert_eq!(format_grouped(1234.5, &EN_US), "1,234.5");
        assert_eq!(format_grouped(-1234.0, &EN_US), "-1,234");
        assert_eq!(format_grouped(0.0, &EN_US), "0");
    }

    #[test]
    fn test_format_grouped_rounds_to_three_digits() {
        assert_eq!(format_grouped(1.23456, &EN_US), "1.235");
        assert_eq!(format_grouped(-0.0001, &EN_US), "0");
    }

    #[test]
    fn test_format_grouped_ties_round_away_from_zero() {
        assert_eq!(format_grouped(1.0625, &EN_US), "1.063");
        assert_eq!(format_grouped(2.3125, &EN_US), "2.313");
        assert_eq!(format_grouped(1.0005, &EN_US), "1.001");
        assert_eq!(format_grouped(-1.0625, &EN_US), "-1.063");
        assert_eq!(format_grouped(999.9995, &EN_US), "1,000");
        assert_eq!(format_grouped(0.9999, &EN_US), "1");
    }

    #[test]
    fn test_format_grouped_other_locales() {
        assert_eq!(format_grouped(1234567.5, &DE_DE), "1.234.567,5");
        assert_eq!(format_grouped(1234.0, &VI_VN), "1.234");
        assert_eq!(format_grouped(1234.0, &FR_FR), "1\u{00A0}234");
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!(NumberLocale::parse("en-US").unwrap(), EN_US);
        assert_eq!(NumberLocale::parse("vi_vn").unwrap(), VI_VN);
        assert_eq!(
            NumberLocale::parse("xx-YY"),
            Err(ConfigError::UnknownLocale("xx-YY".to_string()))
        );
    }
}
