//! Email and phone normalization.
//!
//! Both rewrites are deliberately lossy: the original domain and any extra
//! leading phone digits are discarded.

use once_cell::sync::Lazy;
use regex::Regex;

static DOMAIN_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)@.*").expect("Invalid regex: email domain"));

static NON_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9]").expect("Invalid regex: non-digit"));

/// Replace everything from the first `@` onward with `@<domain>`.
///
/// An address without `@` gets the domain appended.
pub(crate) fn normalize_email(value: &str, domain: &str) -> String {
    let replacement = format!("@{}", domain);
    if DOMAIN_PART.is_match(value) {
        DOMAIN_PART
            .replace(value, regex::NoExpand(&replacement))
            .into_owned()
    } else {
        format!("{}{}", value, replacement)
    }
}

/// Strip non-digits, left-pad with zeros to `digits`, keep the last `digits`
/// digits and prepend `country_code`.
pub(crate) fn normalize_phone(value: &str, country_code: &str, digits: usize) -> String {
    let only_digits = NON_DIGITS.replace_all(value, "");
    let padded = format!("{:0>width$}", only_digits, width = digits);
    let tail = &padded[padded.len() - digits..];
    format!("{}{}", country_code, tail)
}
