//! Card-side validation and formatting for the payment form.
//!
//! These are deliberately pure; the gateway never sees a card the form has
//! not already validated.

use chrono::{Datelike, NaiveDate};

/// Issuer families recognized by leading-digit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardType {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Unknown,
}

impl CardType {
    pub const fn label(self) -> &'static str {
        match self {
            CardType::Visa => "visa",
            CardType::Mastercard => "mastercard",
            CardType::Amex => "amex",
            CardType::Discover => "discover",
            CardType::Unknown => "unknown",
        }
    }
}

/// A card number is valid when it is 13-19 decimal digits (whitespace
/// ignored) and passes the Luhn checksum.
pub fn validate_card_number(card_number: &str) -> bool {
    let cleaned = strip_spaces(card_number);
    if cleaned.len() < 13 || cleaned.len() > 19 {
        return false;
    }
    if !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    luhn_check(&cleaned)
}

/// `MM/YY`, both parts exactly two digits, month in range, and the pair not
/// strictly before `today`'s (year mod 100, month).
pub fn validate_expiry_date(expiry: &str, today: NaiveDate) -> bool {
    let mut parts = expiry.splitn(2, '/');
    let (month, year) = match (parts.next(), parts.next()) {
        (Some(month), Some(year)) if month.len() == 2 && year.len() == 2 => (month, year),
        _ => return false,
    };

    let exp_month: u32 = match month.parse() {
        Ok(value) => value,
        Err(_) => return false,
    };
    let exp_year: i32 = match year.parse() {
        Ok(value) => value,
        Err(_) => return false,
    };

    if !(1..=12).contains(&exp_month) {
        return false;
    }

    let current_year = today.year().rem_euclid(100);
    let current_month = today.month();

    if exp_year < current_year {
        return false;
    }
    if exp_year == current_year && exp_month < current_month {
        return false;
    }

    true
}

pub fn validate_cvv(cvv: &str) -> bool {
    (3..=4).contains(&cvv.len()) && cvv.chars().all(|c| c.is_ascii_digit())
}

/// Regroups the digits into blocks of four separated by single spaces.
pub fn format_card_number(card_number: &str) -> String {
    let cleaned = strip_spaces(card_number);
    let chunks: Vec<String> = cleaned
        .as_bytes()
        .chunks(4)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect();
    chunks.join(" ")
}

/// Keeps only digits and inserts the `/` separator once a third digit
/// arrives, capping at `MM/YY`.
pub fn format_expiry_date(expiry: &str) -> String {
    let cleaned: String = expiry.chars().filter(|c| c.is_ascii_digit()).collect();
    if cleaned.len() < 2 {
        return cleaned;
    }
    if cleaned.len() == 2 {
        return cleaned;
    }
    let month = &cleaned[..2];
    let year = &cleaned[2..cleaned.len().min(4)];
    format!("{month}/{year}")
}

/// Classifies the issuer by standard prefix ranges.
pub fn card_type(card_number: &str) -> CardType {
    let cleaned = strip_spaces(card_number);
    let mut digits = cleaned.chars();
    let first = digits.next();
    let second = digits.next();

    match (first, second) {
        (Some('4'), _) => CardType::Visa,
        (Some('5'), Some(second)) if ('1'..='5').contains(&second) => CardType::Mastercard,
        (Some('3'), Some('4')) | (Some('3'), Some('7')) => CardType::Amex,
        (Some('6'), _) => CardType::Discover,
        _ => CardType::Unknown,
    }
}

fn strip_spaces(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

fn luhn_check(digits: &str) -> bool {
    let mut sum = 0u32;
    let mut double = false;

    for c in digits.chars().rev() {
        let mut digit = match c.to_digit(10) {
            Some(d) => d,
            None => return false,
        };

        if double {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }

        sum += digit;
        double = !double;
    }

    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
    }

    #[test]
    fn accepts_valid_luhn_number_with_spaces() {
        assert!(validate_card_number("4111 1111 1111 1111"));
    }

    #[test]
    fn rejects_short_and_non_luhn_numbers() {
        assert!(!validate_card_number("1234"));
        assert!(!validate_card_number("4111111111111112"));
        assert!(!validate_card_number("4111a11111111111"));
    }

    #[test]
    fn formats_card_number_into_blocks_of_four() {
        assert_eq!(format_card_number("4111111111111111"), "4111 1111 1111 1111");
        assert_eq!(format_card_number("378282246310005"), "3782 8224 6310 005");
    }

    #[test]
    fn formats_expiry_progressively() {
        assert_eq!(format_expiry_date("1"), "1");
        assert_eq!(format_expiry_date("12"), "12");
        assert_eq!(format_expiry_date("1225"), "12/25");
        assert_eq!(format_expiry_date("12/25"), "12/25");
    }

    #[test]
    fn expiry_in_the_past_is_rejected() {
        assert!(!validate_expiry_date("01/20", reference_date()));
        assert!(!validate_expiry_date("05/25", reference_date()));
    }

    #[test]
    fn expiry_current_month_and_future_accepted() {
        assert!(validate_expiry_date("06/25", reference_date()));
        assert!(validate_expiry_date("12/30", reference_date()));
    }

    #[test]
    fn expiry_requires_two_digit_parts() {
        assert!(!validate_expiry_date("1/25", reference_date()));
        assert!(!validate_expiry_date("13/30", reference_date()));
        assert!(!validate_expiry_date("1230", reference_date()));
    }

    #[test]
    fn cvv_must_be_three_or_four_digits() {
        assert!(validate_cvv("123"));
        assert!(validate_cvv("1234"));
        assert!(!validate_cvv("12"));
        assert!(!validate_cvv("12345"));
        assert!(!validate_cvv("12a"));
    }

    #[test]
    fn classifies_issuers_by_prefix() {
        assert_eq!(card_type("4111111111111111"), CardType::Visa);
        assert_eq!(card_type("5500000000000004"), CardType::Mastercard);
        assert_eq!(card_type("340000000000009"), CardType::Amex);
        assert_eq!(card_type("370000000000002"), CardType::Amex);
        assert_eq!(card_type("6011000000000004"), CardType::Discover);
        assert_eq!(card_type("9999999999999999"), CardType::Unknown);
        assert_eq!(card_type("5600000000000000"), CardType::Unknown);
    }
}
