//! # Validation Module
//!
//! Parsing and validation of operator input.
//!
//! Validation is layered: this module catches malformed input before any
//! business logic runs, and the SQLite schema backs it up with NOT NULL /
//! CHECK / UNIQUE / foreign-key constraints. Parsers take the raw text the
//! operator typed and return typed values, so "6", " 6 " and "six" are
//! decided here, once, rather than in every caller.

use crate::error::ValidationError;
use crate::money::{Money, Percent};
use crate::types::PaymentMethod;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Parsers
// =============================================================================

/// Parses a quantity from raw input.
///
/// ## Rules
/// - must not be empty ("missing input")
/// - must parse as an integer
/// - must be strictly positive
///
/// ## Example
/// ```rust
/// use till_core::validation::parse_quantity;
///
/// assert_eq!(parse_quantity("quantity", " 6 ").unwrap(), 6);
/// assert!(parse_quantity("quantity", "").is_err());
/// assert!(parse_quantity("quantity", "0").is_err());
/// assert!(parse_quantity("quantity", "six").is_err());
/// ```
pub fn parse_quantity(field: &str, input: &str) -> ValidationResult<i64> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    match input.parse::<i64>() {
        Ok(qty) if qty > 0 => Ok(qty),
        _ => Err(ValidationError::NotAPositiveInteger {
            field: field.to_string(),
        }),
    }
}

/// Parses a percentage from raw input into basis points.
///
/// Accepts fractional percentages ("12.5"); rejects anything outside
/// 0..=100 with no effect on the caller's state.
pub fn parse_percent(field: &str, input: &str) -> ValidationResult<Percent> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let pct: f64 = input.parse().map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a number".to_string(),
    })?;

    if !(0.0..=100.0).contains(&pct) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(Percent::from_bps((pct * 100.0).round() as u32))
}

/// Parses a payment method name against the fixed accepted set.
pub fn parse_payment_method(input: &str) -> ValidationResult<PaymentMethod> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ValidationError::Required {
            field: "payment method".to_string(),
        });
    }

    PaymentMethod::parse(input).ok_or_else(|| ValidationError::NotAllowed {
        field: "payment method".to_string(),
        allowed: PaymentMethod::ALL.iter().map(|m| m.to_string()).collect(),
    })
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a short required name (product, customer, supplier, category).
///
/// Returns the trimmed name.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(name.to_string())
}

/// Validates a price or amount in cents. Zero is allowed (free items);
/// the upper bound keeps totals inside i64 (see [`Money::MAX_CENTS`]).
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    if cents > Money::MAX_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: Money::MAX_CENTS,
        });
    }
    Ok(())
}

/// Validates a stock count or threshold. Must be >= 0.
pub fn validate_stock_count(field: &str, count: i64) -> ValidationResult<()> {
    if count < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_happy_path() {
        assert_eq!(parse_quantity("quantity", "6").unwrap(), 6);
        assert_eq!(parse_quantity("quantity", "  12  ").unwrap(), 12);
    }

    #[test]
    fn quantity_rejections() {
        assert!(matches!(
            parse_quantity("quantity", ""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            parse_quantity("quantity", "0"),
            Err(ValidationError::NotAPositiveInteger { .. })
        ));
        assert!(matches!(
            parse_quantity("quantity", "-3"),
            Err(ValidationError::NotAPositiveInteger { .. })
        ));
        assert!(matches!(
            parse_quantity("quantity", "2.5"),
            Err(ValidationError::NotAPositiveInteger { .. })
        ));
        assert!(matches!(
            parse_quantity("quantity", "six"),
            Err(ValidationError::NotAPositiveInteger { .. })
        ));
    }

    #[test]
    fn percent_parsing() {
        assert_eq!(parse_percent("discount", "10").unwrap().bps(), 1000);
        assert_eq!(parse_percent("discount", "12.5").unwrap().bps(), 1250);
        assert_eq!(parse_percent("discount", "0").unwrap().bps(), 0);
        assert_eq!(parse_percent("discount", "100").unwrap().bps(), 10_000);
    }

    #[test]
    fn percent_rejections() {
        assert!(matches!(
            parse_percent("discount", "101"),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_percent("discount", "-1"),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_percent("discount", "lots"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_percent("discount", ""),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn payment_method_set() {
        assert_eq!(
            parse_payment_method("Cash").unwrap(),
            PaymentMethod::Cash
        );
        assert_eq!(
            parse_payment_method("credit card").unwrap(),
            PaymentMethod::CreditCard
        );
        assert!(matches!(
            parse_payment_method("iou"),
            Err(ValidationError::NotAllowed { .. })
        ));
        assert!(matches!(
            parse_payment_method(""),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn names_and_amounts() {
        assert_eq!(validate_name("name", "  Cola ").unwrap(), "Cola");
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_amount_cents("price", 0).is_ok());
        assert!(validate_amount_cents("price", -1).is_err());
        assert!(validate_amount_cents("price", Money::MAX_CENTS).is_ok());
        assert!(matches!(
            validate_amount_cents("price", Money::MAX_CENTS + 1),
            Err(ValidationError::OutOfRange { max, .. }) if max == Money::MAX_CENTS
        ));
        assert!(validate_stock_count("min_stock", 5).is_ok());
        assert!(validate_stock_count("min_stock", -5).is_err());
    }
}
