pub const DEFAULT_COUNTRY_CODE: &str = "49";

const MIN_DIGITS: usize = 8;
const MAX_DIGITS: usize = 16;

pub fn normalize_phone(raw: &str) -> Option<String> {
    normalize_phone_with_country(raw, DEFAULT_COUNTRY_CODE)
}

pub fn normalize_phone_with_country(raw: &str, country_code: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut cleaned = String::new();
    if trimmed.starts_with('+') {
        cleaned.push('+');
    }
    for ch in trimmed.chars() {
        if ch.is_ascii_digit() {
            cleaned.push(ch);
        }
    }

    let digits = if let Some(rest) = cleaned.strip_prefix("00") {
        rest.to_string()
    } else if let Some(rest) = cleaned.strip_prefix('0') {
        format!("{country_code}{rest}")
    } else if let Some(rest) = cleaned.strip_prefix('+') {
        rest.to_string()
    } else {
        cleaned
    };

    if digits.len() < MIN_DIGITS || digits.len() > MAX_DIGITS {
        return None;
    }
    if !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }

    Some(format!("+{digits}"))
}

pub fn is_valid_country_code(value: &str) -> bool {
    !value.is_empty() && value.len() <= 3 && value.chars().all(|ch| ch.is_ascii_digit())
}

pub fn is_canonical_phone(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('+') else {
        return false;
    };
    digits.len() >= MIN_DIGITS
        && digits.len() <= MAX_DIGITS
        && digits.chars().all(|ch| ch.is_ascii_digit())
}
