use regex::Regex;
use std::sync::OnceLock;
use validator::{Validate, ValidationError};

pub fn validate<T: Validate>(val: &T) -> Result<(), validator::ValidationErrors> {
    val.validate()
}

fn mobile_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("valid mobile regex"))
}

fn pincode_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{6}$").expect("valid pincode regex"))
}

fn failed(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

pub fn validate_mobile(value: &str) -> Result<(), ValidationError> {
    if mobile_re().is_match(value) {
        Ok(())
    } else {
        Err(failed("mobile", "must be a 10-digit number"))
    }
}

pub fn validate_pincode(value: &str) -> Result<(), ValidationError> {
    if pincode_re().is_match(value) {
        Ok(())
    } else {
        Err(failed("pincode", "must be a 6-digit number"))
    }
}

pub fn validate_time(value: &str) -> Result<(), ValidationError> {
    if crate::utils::time::is_valid_time(value) {
        Ok(())
    } else {
        Err(failed("time", "must be HH:MM"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_numbers() {
        assert!(validate_mobile("9876543210").is_ok());
        assert!(validate_mobile("987654321").is_err());
        assert!(validate_mobile("98765432100").is_err());
        assert!(validate_mobile("98765abcde").is_err());
    }

    #[test]
    fn pincodes() {
        assert!(validate_pincode("560001").is_ok());
        assert!(validate_pincode("5600").is_err());
        assert!(validate_pincode("56000a").is_err());
    }
}
