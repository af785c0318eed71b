use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;
use zxcvbn::zxcvbn;

const MIN_LENGTH: usize = 8;
const MIN_STRENGTH_SCORE: u8 = 3;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9][0-9 \-]{6,18}[0-9]$").expect("phone pattern is valid")
});

/// Context-aware password validation strength
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_LENGTH {
        let mut error = ValidationError::new("password_length");
        error.message = Some(format!("Must be at least {} characters", MIN_LENGTH).into());
        return Err(error);
    }

    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_alphanumeric());

    if !(has_upper && has_digit && has_symbol) {
        let mut error = ValidationError::new("password_complexity");
        error.message = Some("Must include uppercase, number, and symbol".into());
        return Err(error);
    }

    let estimate = zxcvbn(password, &[]);
    let score = estimate.score() as u8;

    if score < MIN_STRENGTH_SCORE {
        let feedback = estimate.feedback()
            .and_then(|f| f.warning().map(|w| w.to_string()))
            .unwrap_or_else(|| "Password is too weak".to_string());

        let mut error = ValidationError::new("password_strength");
        error.message = Some(feedback.into());
        return Err(error);
    }

    Ok(())
}

/// International-ish phone numbers: digits, spaces and dashes, optional leading `+`.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_RE.is_match(phone.trim()) {
        Ok(())
    } else {
        let mut error = ValidationError::new("phone_format");
        error.message = Some("Invalid phone number".into());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_passwords_are_rejected() {
        assert!(validate_password_strength("short").is_err());
        assert!(validate_password_strength("alllowercase1!").is_err());
        assert!(validate_password_strength("Tr0ub4dor&3-Horse-Battery").is_ok());
    }

    #[test]
    fn phone_numbers() {
        assert!(validate_phone("+509 3412-3456").is_ok());
        assert!(validate_phone("0612345678").is_ok());
        assert!(validate_phone("call me").is_err());
    }
}
