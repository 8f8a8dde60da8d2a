/// Best-effort canonicalization of free-text phone input into a dialable
/// E.164-ish form. The provider remains the final validator.
pub fn normalize(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let has_plus = raw.starts_with('+');
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    if has_plus {
        return Some(format!("+{}", digits));
    }

    if digits.len() == 10 {
        // North-American subscriber number
        return Some(format!("+1{}", digits));
    }
    if digits.len() == 11 && digits.starts_with('1') {
        return Some(format!("+{}", digits));
    }

    Some(format!("+{}", digits))
}

/// Last ten digits of a number, used as the inbound matching key.
pub fn last_ten(number: &str) -> Option<String> {
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 10 {
        return None;
    }
    Some(digits[digits.len() - 10..].to_string())
}

/// The three ways a North-American number is commonly stored: bare ten
/// digits, eleven with a leading 1, and full E.164.
pub fn variants(last10: &str) -> [String; 3] {
    [
        last10.to_string(),
        format!("1{}", last10),
        format!("+1{}", last10),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_digit_gets_na_country_code() {
        assert_eq!(normalize(Some("5871234567")).as_deref(), Some("+15871234567"));
        assert_eq!(
            normalize(Some("(587) 123-4567")).as_deref(),
            Some("+15871234567")
        );
    }

    #[test]
    fn eleven_digit_with_leading_one() {
        assert_eq!(normalize(Some("15871234567")).as_deref(), Some("+15871234567"));
    }

    #[test]
    fn plus_prefixed_passthrough() {
        assert_eq!(normalize(Some("+15871234567")).as_deref(), Some("+15871234567"));
        assert_eq!(normalize(Some("+44 20 7946 0958")).as_deref(), Some("+442079460958"));
    }

    #[test]
    fn other_lengths_get_bare_plus() {
        assert_eq!(normalize(Some("123456")).as_deref(), Some("+123456"));
    }

    #[test]
    fn empty_and_null_are_none() {
        assert_eq!(normalize(None), None);
        assert_eq!(normalize(Some("")), None);
        assert_eq!(normalize(Some("   ")), None);
        assert_eq!(normalize(Some("ext.")), None);
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["5871234567", "15871234567", "+15871234567", "123456"] {
            let once = normalize(Some(raw)).unwrap();
            assert_eq!(normalize(Some(&once)).unwrap(), once);
        }
    }

    #[test]
    fn last_ten_and_variants() {
        let last10 = last_ten("+15871234567").unwrap();
        assert_eq!(last10, "5871234567");
        assert_eq!(
            variants(&last10),
            [
                "5871234567".to_string(),
                "15871234567".to_string(),
                "+15871234567".to_string()
            ]
        );
        assert_eq!(last_ten("12345"), None);
    }
}
