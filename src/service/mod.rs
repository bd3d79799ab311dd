//! Rules the schema cannot express on its own: status transitions, balance
//! checks, stock floors, email normalization and password hashing.
//!
//! Every operation takes a `&mut PgConnection`; operations that touch more
//! than one row open their own transaction, which nests as a savepoint when
//! the caller already has one open.

pub mod appointments;
pub mod billing;
pub mod clinical;
pub mod doctors;
pub mod inventory;
pub mod notifications;
pub mod patients;
pub mod users;

use rust_decimal::Decimal;

use crate::error::ClinicError;

/// Largest value a `NUMERIC(10, 2)` column can hold: 99_999_999.99.
const MAX_MONEY: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

pub(crate) fn required_text(field: &str, value: &str) -> Result<String, ClinicError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClinicError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_owned())
}

/// Trims an optional text field, treating blank input as absent.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Rejects amounts the money columns would round or overflow.
pub(crate) fn money(field: &str, amount: Decimal, allow_zero: bool) -> Result<Decimal, ClinicError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ClinicError::validation(format!("{field} must not be negative")));
    }
    if amount.is_zero() && !allow_zero {
        return Err(ClinicError::validation(format!("{field} must be greater than zero")));
    }
    if amount.normalize().scale() > 2 {
        return Err(ClinicError::validation(format!(
            "{field} has more than two decimal places"
        )));
    }
    if amount > MAX_MONEY {
        return Err(ClinicError::validation(format!("{field} exceeds {MAX_MONEY}")));
    }
    Ok(amount)
}
