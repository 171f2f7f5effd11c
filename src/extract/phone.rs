//! Phone-number scanning
//!
//! The `regex` crate has no lookaround, so the digit-run boundaries are
//! checked by hand: a match may not start right after a digit, and a match
//! that runs into a digit is shortened to the longest prefix that does not.

use regex::Regex;
use std::ops::Range;

const PHONE_PATTERN: &str = r"(?:\+[0-9]{1,3}\s*)?(?:\(?[0-9]{2,4}\)?[\s.-]*)?[0-9]{3,4}[\s.-]*[0-9]{3,4}(?:[\s.-]*[0-9]{2,4})?";

const MIN_DIGITS: usize = 7;
const MAX_DIGITS: usize = 15;

/// Finds phone-shaped tokens in free text
#[derive(Debug, Clone)]
pub struct PhoneScanner {
    prefix: Regex,
    exact: Regex,
}

impl Default for PhoneScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl PhoneScanner {
    pub fn new() -> Self {
        Self {
            prefix: Regex::new(&format!("^(?:{})", PHONE_PATTERN)).expect("valid phone regex"),
            exact: Regex::new(&format!("^(?:{})$", PHONE_PATTERN)).expect("valid phone regex"),
        }
    }

    /// Byte ranges of every phone-shaped token, left to right, non-overlapping
    pub fn scan(&self, text: &str) -> Vec<Range<usize>> {
        let mut found = Vec::new();
        let mut pos = 0;

        while let Some(ch) = text[pos..].chars().next() {
            let after_digit = text[..pos]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_digit());

            if !after_digit && (ch == '+' || ch == '(' || ch.is_ascii_digit()) {
                if let Some(len) = self.match_len_at(&text[pos..]) {
                    found.push(pos..pos + len);
                    pos += len;
                    continue;
                }
            }

            pos += ch.len_utf8();
        }

        found
    }

    fn match_len_at(&self, rest: &str) -> Option<usize> {
        let greedy = self.prefix.find(rest)?.end();
        if !followed_by_digit(rest, greedy) {
            return Some(greedy);
        }

        (1..greedy)
            .rev()
            .filter(|&end| rest.is_char_boundary(end) && !followed_by_digit(rest, end))
            .find(|&end| self.exact.is_match(&rest[..end]))
    }
}

fn followed_by_digit(text: &str, at: usize) -> bool {
    text[at..].chars().next().is_some_and(|c| c.is_ascii_digit())
}

pub fn phone_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// A phone token is kept when it carries 7 to 15 digits
pub fn valid_phone_digits(digits: &str) -> bool {
    (MIN_DIGITS..=MAX_DIGITS).contains(&digits.len())
}

/// Reduces a phone token to its digits, keeping a leading `+`
pub fn normalize_phone(raw: &str) -> String {
    let digits = phone_digits(raw);
    if raw.trim().starts_with('+') {
        format!("+{}", digits)
    } else {
        digits
    }
}
