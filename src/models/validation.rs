use rust_decimal::Decimal;
use thiserror::Error;

/// Storage precision for money columns: 12 digits, 2 of them decimal.
pub(crate) const AMOUNT_MAX_DIGITS: u32 = 12;
pub(crate) const AMOUNT_DECIMAL_PLACES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} cannot be blank")]
    Blank { field: &'static str },

    #[error("{field} has {len} characters, at most {max} allowed")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("{field} has more than {max_digits} digits")]
    TooManyDigits {
        field: &'static str,
        max_digits: u32,
    },

    #[error("Destination and origin accounts are mutually exclusive")]
    AccountsMutuallyExclusive,

    #[error("TransferInEvent must have an associated origin account")]
    MissingOriginAccount,

    #[error("*TransferOutEvent must have an associated destination account")]
    MissingDestinationAccount,
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    Ok(())
}

pub(crate) fn max_chars(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::TooLong { field, len, max });
    }
    Ok(())
}

/// Reject amounts that would not fit a DECIMAL(12, 2) column.
pub(crate) fn check_amount(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    let integer_digits = value.abs().trunc().to_string().trim_start_matches('0').len() as u32;
    if integer_digits > AMOUNT_MAX_DIGITS - AMOUNT_DECIMAL_PLACES || value.scale() > AMOUNT_DECIMAL_PLACES {
        return Err(ValidationError::TooManyDigits {
            field,
            max_digits: AMOUNT_MAX_DIGITS,
        });
    }
    Ok(())
}
