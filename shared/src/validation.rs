//! Input validation helpers
//!
//! All checks run before any storage I/O so that malformed input never
//! reaches the database.

use rust_decimal::Decimal;

/// Validate that a required text field is present and non-blank,
/// returning the trimmed value
pub fn require_text(value: Option<&str>) -> Result<&str, &'static str> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s.trim()),
        _ => Err("Required field is missing or blank"),
    }
}

/// Validate that a quantity magnitude is a positive value
pub fn validate_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate that a monetary amount, when present, is non-negative
pub fn validate_amount(amount: Option<Decimal>) -> Result<(), &'static str> {
    if let Some(a) = amount {
        if a < Decimal::ZERO {
            return Err("Amount cannot be negative");
        }
    }
    Ok(())
}

/// Validate a metric name: non-blank, at most 64 characters
pub fn validate_metric_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Metric name is required");
    }
    if name.len() > 64 {
        return Err("Metric name must be at most 64 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_require_text_blank() {
        assert!(require_text(Some("   ")).is_err());
        assert!(require_text(None).is_err());
        assert_eq!(require_text(Some(" ok ")), Ok("ok"));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(dec("0.1")).is_ok());
        assert!(validate_quantity(Decimal::ZERO).is_err());
        assert!(validate_quantity(dec("-3")).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(None).is_ok());
        assert!(validate_amount(Some(dec("10.50"))).is_ok());
        assert!(validate_amount(Some(dec("-0.01"))).is_err());
    }

    #[test]
    fn test_validate_metric_name() {
        assert!(validate_metric_name("grossRevenue").is_ok());
        assert!(validate_metric_name("").is_err());
        assert!(validate_metric_name(&"x".repeat(65)).is_err());
    }
}
