//! Common validation rules shared across request payloads.

use std::collections::BTreeMap;

use validator::ValidationError;

/// Validates username format.
///
/// Requirements:
/// - No whitespace anywhere (the value is trimmed before validation)
/// - Length bounds are checked by the derive on the payload
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.chars().any(char::is_whitespace) {
        return Err(ValidationError::new("username_contains_whitespace"));
    }
    Ok(())
}

/// Rejects names that are empty or only whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Validates a category map of `category -> sub-category -> amount`.
///
/// Requirements:
/// - Category and sub-category names are non-blank
/// - Amounts are finite and non-negative
pub fn validate_categories(
    categories: &BTreeMap<String, BTreeMap<String, f64>>,
) -> Result<(), ValidationError> {
    for (category, sub_categories) in categories {
        if category.trim().is_empty() {
            return Err(ValidationError::new("category_name_blank"));
        }
        for (sub_category, amount) in sub_categories {
            if sub_category.trim().is_empty() {
                return Err(ValidationError::new("sub_category_name_blank"));
            }
            if !amount.is_finite() || *amount < 0.0 {
                return Err(ValidationError::new("amount_invalid"));
            }
        }
    }
    Ok(())
}
