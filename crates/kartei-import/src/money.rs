/// Parses a German-locale price string into integer cents.
///
/// Currency symbols and whitespace are dropped, `.` is read as a thousands
/// separator and `,` as the decimal separator. Returns `None` when no digits
/// remain.
pub fn parse_cents(raw: &str) -> Option<i64> {
    let mut cleaned = String::new();
    for ch in raw.chars() {
        if ch.is_ascii_digit() || matches!(ch, ',' | '.' | '-') {
            cleaned.push(ch);
        }
    }
    if !cleaned.chars().any(|ch| ch.is_ascii_digit()) {
        return None;
    }

    let normalized = cleaned.replace('.', "").replace(',', ".");
    let value: f64 = normalized.parse().ok()?;
    Some((value * 100.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::parse_cents;

    #[test]
    fn parses_thousands_and_decimal_separators() {
        assert_eq!(parse_cents("1.234,50"), Some(123_450));
    }

    #[test]
    fn parses_bare_integer_as_whole_euros() {
        assert_eq!(parse_cents("45"), Some(4_500));
    }

    #[test]
    fn drops_currency_symbol_and_whitespace() {
        assert_eq!(parse_cents("€ 1.200"), Some(120_000));
        assert_eq!(parse_cents("250,00 EUR"), Some(25_000));
    }

    #[test]
    fn keeps_sign() {
        assert_eq!(parse_cents("-50,00"), Some(-5_000));
    }

    #[test]
    fn rejects_input_without_digits() {
        assert_eq!(parse_cents(""), None);
        assert_eq!(parse_cents("n/a"), None);
        assert_eq!(parse_cents("-"), None);
    }

    #[test]
    fn rounds_to_nearest_cent() {
        assert_eq!(parse_cents("0,005"), Some(1));
    }
}
