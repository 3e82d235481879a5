//! Parsing of engineering-notation numeric strings, e.g. `"1u"`, `"200n"`, `"2.5k"`.

/// Error returned when a string cannot be parsed as an engineering-notation number.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseEngNumberError {
    /// The input string was empty (after trimming).
    #[error("empty number string")]
    Empty,
    /// The mantissa (the part before an optional SI-prefix letter) did not parse as a number.
    #[error("invalid numeric mantissa in `{0}`")]
    InvalidMantissa(String),
}

/// Fixed SI-prefix table. Case-sensitive so that `m` (milli, 1e-3) and `M` (mega, 1e6) stay
/// distinct.
const PREFIXES: &[(char, f64)] = &[
    ('f', 1e-15),
    ('p', 1e-12),
    ('n', 1e-9),
    ('u', 1e-6),
    ('m', 1e-3),
    ('k', 1e3),
    ('M', 1e6),
    ('G', 1e9),
    ('T', 1e12),
];

/// Parses an engineering-notation string such as `"1u"` or `"200n"` into a plain `f64`.
///
/// A trailing letter from a fixed SI-prefix table scales the mantissa; a string with no such
/// trailing letter is parsed literally.
///
/// ```
/// # use mosgen::units::parse_eng_number;
/// assert_eq!(parse_eng_number("1u").unwrap(), 1e-6);
/// assert_eq!(parse_eng_number("200n").unwrap(), 200e-9);
/// assert_eq!(parse_eng_number("100").unwrap(), 100.0);
/// ```
pub fn parse_eng_number(s: &str) -> Result<f64, ParseEngNumberError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ParseEngNumberError::Empty);
    }

    let last = s.chars().last().expect("checked non-empty above");
    if let Some(&(_, scale)) = PREFIXES.iter().find(|(c, _)| *c == last) {
        let mantissa = &s[..s.len() - last.len_utf8()];
        let value: f64 = mantissa
            .parse()
            .map_err(|_| ParseEngNumberError::InvalidMantissa(s.to_string()))?;
        Ok(value * scale)
    } else {
        s.parse()
            .map_err(|_| ParseEngNumberError::InvalidMantissa(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parses_micro_and_nano() {
        assert_relative_eq!(parse_eng_number("1u").unwrap(), 1e-6);
        assert_relative_eq!(parse_eng_number("200n").unwrap(), 200e-9);
    }

    #[test]
    fn distinguishes_milli_from_mega() {
        assert_relative_eq!(parse_eng_number("2.5m").unwrap(), 2.5e-3);
        assert_relative_eq!(parse_eng_number("2.5M").unwrap(), 2.5e6);
    }

    #[test]
    fn parses_plain_numbers() {
        assert_relative_eq!(parse_eng_number("100").unwrap(), 100.0);
        assert_relative_eq!(parse_eng_number(" 0.045 ").unwrap(), 0.045);
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert_eq!(parse_eng_number("").unwrap_err(), ParseEngNumberError::Empty);
        assert!(matches!(
            parse_eng_number("abc").unwrap_err(),
            ParseEngNumberError::InvalidMantissa(_)
        ));
    }
}
