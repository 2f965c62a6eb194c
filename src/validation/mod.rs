//! Boundary validation for inbound request payloads. Rejects malformed input
//! early instead of propagating it into the transaction lifecycle.

use std::fmt;

pub const SKU_CODE_MAX_LEN: usize = 64;
pub const CUSTOMER_NO_MAX_LEN: usize = 32;
pub const PAYMENT_METHOD_MAX_LEN: usize = 32;
pub const PHONE_NUMBER_MAX_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

pub fn validate_sku_code(sku_code: &str) -> ValidationResult {
    let sku_code = sanitize_string(sku_code);
    validate_required("sku_code", &sku_code)?;
    validate_max_len("sku_code", &sku_code, SKU_CODE_MAX_LEN)?;

    if !sku_code
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Err(ValidationError::new(
            "sku_code",
            "must contain only letters, digits, '-' or '_'",
        ));
    }

    Ok(())
}

pub fn validate_customer_no(customer_no: &str) -> ValidationResult {
    let customer_no = sanitize_string(customer_no);
    validate_required("customer_no", &customer_no)?;
    validate_max_len("customer_no", &customer_no, CUSTOMER_NO_MAX_LEN)?;

    if !customer_no.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return Err(ValidationError::new(
            "customer_no",
            "must contain only letters and digits",
        ));
    }

    Ok(())
}

pub fn validate_payment_method(payment_method: &str) -> ValidationResult {
    let payment_method = sanitize_string(payment_method);
    validate_required("payment_method", &payment_method)?;
    validate_max_len("payment_method", &payment_method, PAYMENT_METHOD_MAX_LEN)?;

    Ok(())
}

pub fn validate_phone_number(phone_number: &str) -> ValidationResult {
    let phone_number = sanitize_string(phone_number);
    validate_required("phone_number", &phone_number)?;
    validate_max_len("phone_number", &phone_number, PHONE_NUMBER_MAX_LEN)?;

    if !phone_number
        .chars()
        .all(|ch| ch.is_ascii_digit() || ch == '+')
    {
        return Err(ValidationError::new(
            "phone_number",
            "must contain only digits and '+'",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_required_field() {
        assert!(validate_required("field", "value").is_ok());
        assert!(validate_required("field", "   ").is_err());
    }

    #[test]
    fn validates_max_len() {
        assert!(validate_max_len("field", "abc", 3).is_ok());
        assert!(validate_max_len("field", "abcd", 3).is_err());
    }

    #[test]
    fn sanitizes_strings() {
        assert_eq!(sanitize_string("  ML-100 \t"), "ML-100");
        assert_eq!(sanitize_string("ab\u{0000}cd"), "abcd");
    }

    #[test]
    fn validates_sku_codes() {
        assert!(validate_sku_code("ML-100").is_ok());
        assert!(validate_sku_code("ff_dm_5").is_ok());
        assert!(validate_sku_code("").is_err());
        assert!(validate_sku_code("sku code").is_err());
        assert!(validate_sku_code(&"A".repeat(65)).is_err());
    }

    #[test]
    fn validates_customer_numbers() {
        assert!(validate_customer_no("123456789").is_ok());
        assert!(validate_customer_no("12345zone9").is_ok());
        assert!(validate_customer_no("").is_err());
        assert!(validate_customer_no("12;drop").is_err());
    }

    #[test]
    fn validates_phone_numbers() {
        assert!(validate_phone_number("+628123456789").is_ok());
        assert!(validate_phone_number("08123456789").is_ok());
        assert!(validate_phone_number("phone").is_err());
    }
}
