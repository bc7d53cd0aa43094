//! Reusable validation predicates

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use reqwest::Url;
use uuid::Uuid;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("pattern is valid")
});

static HOST_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$").expect("pattern is valid")
});

static TLD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z]{2,63}$").expect("pattern is valid")
});

static ACCENTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[À-ÖØ-öø-ÿ]").expect("pattern is valid")
});

static EXPIRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})\s*/\s*(\d{2}|\d{4})$").expect("pattern is valid")
});

const URL_PROTOCOLS: &[&str] = &["http", "https", "ftp"];

pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Length in characters, not bytes
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Absolute URL with an explicit protocol and a host
pub fn is_url_with_protocol(value: &str) -> bool {
    if !value.contains("://") {
        return false;
    }
    match Url::parse(value) {
        Ok(url) => URL_PROTOCOLS.contains(&url.scheme()) && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// Fully qualified domain name: at least two labels and an alphabetic TLD
pub fn is_fqdn(value: &str) -> bool {
    let value = value.strip_suffix('.').unwrap_or(value);
    if value.is_empty() || value.len() > 253 {
        return false;
    }
    let labels: Vec<&str> = value.split('.').collect();
    let Some((tld, rest)) = labels.split_last() else {
        return false;
    };
    !rest.is_empty() && TLD_RE.is_match(tld) && rest.iter().all(|l| HOST_LABEL_RE.is_match(l))
}

pub fn is_uuid_v4(value: &str) -> bool {
    Uuid::parse_str(value).is_ok_and(|id| id.get_version_num() == 4)
}

pub fn has_accented_chars(value: &str) -> bool {
    ACCENTED_RE.is_match(value)
}

/// Strip the spaces and dashes people type into card numbers
pub fn card_digits(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Luhn checksum over a string of ASCII digits
pub fn luhn_valid(digits: &str) -> bool {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryError {
    Invalid,
    Passed,
}

/// Check an `MM/YY` or `MM/YYYY` card expiry against `today`.
///
/// A card is good through the last day of its expiry month.
pub fn check_card_expiry(value: &str, today: NaiveDate) -> Result<(), ExpiryError> {
    let caps = EXPIRY_RE
        .captures(value.trim())
        .ok_or(ExpiryError::Invalid)?;
    let month: u32 = caps[1].parse().map_err(|_| ExpiryError::Invalid)?;
    let year_part = &caps[2];
    let mut year: i32 = year_part.parse().map_err(|_| ExpiryError::Invalid)?;
    if year_part.len() == 2 {
        year += 2000;
    }
    if !(1..=12).contains(&month) {
        return Err(ExpiryError::Invalid);
    }
    if (year, month) < (today.year(), today.month()) {
        return Err(ExpiryError::Passed);
    }
    Ok(())
}

pub fn is_on_off(value: &str) -> bool {
    matches!(value, "on" | "off")
}

/// Rough 0-4 password strength score for the meter
pub fn password_strength(value: &str) -> u8 {
    let len = char_len(value);
    if len == 0 {
        return 0;
    }
    let classes = [
        value.chars().any(|c| c.is_lowercase()),
        value.chars().any(|c| c.is_uppercase()),
        value.chars().any(|c| c.is_ascii_digit()),
        value.chars().any(|c| !c.is_alphanumeric()),
    ]
    .iter()
    .filter(|&&present| present)
    .count() as u8;

    let length_score: u8 = match len {
        0..=8 => 0,
        9..=11 => 1,
        12..=15 => 2,
        _ => 3,
    };
    let score = length_score + classes.saturating_sub(1);
    if len < 9 {
        score.min(1)
    } else {
        score.min(4)
    }
}
