//! Validation shared by the curriculum CRUD surface.

use crate::error::CoreError;

/// Validate an entity title: required, non-empty after trimming.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".to_string()));
    }
    Ok(())
}

/// Validate a pricing plan price. Prices are integer cents.
pub fn validate_price_cents(price_cents: i32) -> Result<(), CoreError> {
    if price_cents < 0 {
        return Err(CoreError::Validation(
            "Price must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// Validate an ISO 4217 currency code (three uppercase ASCII letters).
pub fn validate_currency(code: &str) -> Result<(), CoreError> {
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid currency code: '{code}'"
        )))
    }
}
