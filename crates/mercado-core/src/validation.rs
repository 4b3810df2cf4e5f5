//! # Validation Module
//!
//! Input validation for catalog writes.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: UI layer (external)                                       │
//! │  └── Basic format checks, immediate feedback                        │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE, called by the catalog service                │
//! │  └── Business-rule validation before anything touches the store     │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database (SQLite)                                         │
//! │  └── NOT NULL / UNIQUE / CHECK / foreign key constraints            │
//! │                                                                     │
//! │  Defense in depth: each layer catches different mistakes            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::Product;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a barcode.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only alphanumeric characters, hyphens and underscores
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }
    if barcode.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 50,
        });
    }
    if !barcode
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product, category or supplier display name.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }
    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the cost/sale price pair.
///
/// ## Rules
/// - Neither price may be negative
/// - Sale price must be >= cost price (write-time invariant)
pub fn validate_prices(cost_cents: i64, price_cents: i64) -> ValidationResult<()> {
    if cost_cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "cost_cents".to_string(),
        });
    }
    if price_cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "price_cents".to_string(),
        });
    }
    if price_cents < cost_cents {
        return Err(ValidationError::PriceBelowCost {
            price_cents,
            cost_cents,
        });
    }

    Ok(())
}

/// Validates a stock quantity or minimum threshold (must be >= 0).
pub fn validate_stock_qty(field: &str, qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates a full product before insert/update.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_barcode(&product.barcode)?;
    validate_name(&product.name)?;
    validate_prices(product.cost_cents, product.price_cents)?;
    validate_stock_qty("stock_qty", product.stock_qty)?;
    validate_stock_qty("min_stock_qty", product.min_stock_qty)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("7891000100103").is_ok());
        assert!(validate_barcode("SKU-330_A").is_ok());
        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("  ").is_err());
        assert!(validate_barcode(&"9".repeat(51)).is_err());
        assert!(validate_barcode("abc 123").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Arroz Branco 5kg").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_prices() {
        assert!(validate_prices(500, 800).is_ok());
        assert!(validate_prices(500, 500).is_ok());
        assert!(matches!(
            validate_prices(800, 500),
            Err(ValidationError::PriceBelowCost { .. })
        ));
        assert!(validate_prices(-1, 500).is_err());
        assert!(validate_prices(0, -1).is_err());
    }

    #[test]
    fn test_validate_product() {
        let product = Product {
            id: "p1".to_string(),
            barcode: "7891000100103".to_string(),
            name: "Leite Integral 1L".to_string(),
            category_id: "c1".to_string(),
            cost_cents: 350,
            price_cents: 549,
            stock_qty: 12,
            min_stock_qty: 3,
            unit: "UN".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(validate_product(&product).is_ok());

        let mut bad = product.clone();
        bad.price_cents = 100;
        assert!(validate_product(&bad).is_err());

        let mut bad = product;
        bad.min_stock_qty = -1;
        assert!(validate_product(&bad).is_err());
    }
}
