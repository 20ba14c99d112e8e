/// Symbol and quantity rules for portfolio entries.
///
/// A valid symbol is either a Japanese securities code (4 or 5 ASCII digits,
/// a dot, and one of the exchange letters `T F N S`) or a plain ticker of 1
/// to 5 ASCII uppercase letters.
pub fn is_valid_symbol(symbol: &str) -> bool {
    if let Some((code, suffix)) = symbol.split_once('.') {
        return (4..=5).contains(&code.len())
            && code.chars().all(|c| c.is_ascii_digit())
            && matches!(suffix, "T" | "F" | "N" | "S");
    }
    (1..=5).contains(&symbol.len()) && symbol.chars().all(|c| c.is_ascii_uppercase())
}

pub fn is_valid_quantity(quantity: f64) -> bool {
    quantity.is_finite() && quantity >= 1.0 && quantity.fract() == 0.0
}

/// Coerce arbitrary numeric input into a legal quantity: floor, clamp to at
/// least 1; NaN and other garbage come out as 1.
pub fn normalize_quantity(raw: f64) -> u32 {
    if !raw.is_finite() {
        return 1;
    }
    let floored = raw.floor();
    if floored < 1.0 {
        1
    } else if floored >= u32::MAX as f64 {
        u32::MAX
    } else {
        floored as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_japanese_codes_and_us_tickers() {
        for symbol in ["7203.T", "9984.S", "13320.F", "6758.N", "A", "AAPL", "GOOGL"] {
            assert!(is_valid_symbol(symbol), "{symbol} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_symbols() {
        for symbol in [
            "", "aapl", "TOOLONGG", "720.T", "7203.X", "7203.", ".T", "7203T", "72O3.T",
            "AAPL.US",
        ] {
            assert!(!is_valid_symbol(symbol), "{symbol} should be invalid");
        }
    }

    #[test]
    fn quantity_must_be_a_positive_integer() {
        assert!(is_valid_quantity(1.0));
        assert!(is_valid_quantity(250.0));
        assert!(!is_valid_quantity(0.0));
        assert!(!is_valid_quantity(-3.0));
        assert!(!is_valid_quantity(2.5));
        assert!(!is_valid_quantity(f64::NAN));
        assert!(!is_valid_quantity(f64::INFINITY));
    }

    #[test]
    fn normalization_floors_and_clamps() {
        assert_eq!(normalize_quantity(5.9), 5);
        assert_eq!(normalize_quantity(1.0), 1);
        assert_eq!(normalize_quantity(0.4), 1);
        assert_eq!(normalize_quantity(-12.0), 1);
        assert_eq!(normalize_quantity(f64::NAN), 1);
        assert_eq!(normalize_quantity(f64::INFINITY), 1);
        assert_eq!(normalize_quantity(1e18), u32::MAX);
    }
}
