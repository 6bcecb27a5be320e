use bcrypt::{hash, verify, DEFAULT_COST};
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password must be at least 8 characters long")]
    TooShort,
    #[error("Password must be no more than 128 characters long")]
    TooLong,
    #[error("Password must contain at least one uppercase letter")]
    NoUppercase,
    #[error("Password must contain at least one lowercase letter")]
    NoLowercase,
    #[error("Password must contain at least one number")]
    NoNumber,
    #[error("Password must contain at least one special character")]
    NoSpecialChar,
    #[error("Failed to hash password")]
    HashingFailed,
    #[error("Failed to verify password")]
    VerificationFailed,
}

/// Password strength requirements
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_number: bool,
    pub require_special_char: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_uppercase: true,
            require_lowercase: true,
            require_number: true,
            require_special_char: true,
        }
    }
}

/// Validate password strength according to policy
pub fn validate_password_strength(
    password: &str,
    policy: &PasswordPolicy,
) -> Result<(), PasswordError> {
    if password.len() < policy.min_length {
        return Err(PasswordError::TooShort);
    }

    if password.len() > policy.max_length {
        return Err(PasswordError::TooLong);
    }

    if policy.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
        return Err(PasswordError::NoUppercase);
    }

    if policy.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
        return Err(PasswordError::NoLowercase);
    }

    if policy.require_number && !password.chars().any(|c| c.is_numeric()) {
        return Err(PasswordError::NoNumber);
    }

    if policy.require_special_char {
        let special_chars = Regex::new(r"[^a-zA-Z0-9]").unwrap();
        if !special_chars.is_match(password) {
            return Err(PasswordError::NoSpecialChar);
        }
    }

    Ok(())
}

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    validate_password_strength(password, &PasswordPolicy::default())?;

    hash(password, DEFAULT_COST).map_err(|_| PasswordError::HashingFailed)
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    verify(password, hash).map_err(|_| PasswordError::VerificationFailed)
}

/// Generate a 6-digit one-time password for activation/password reset
pub fn generate_otp_code() -> String {
    use rand::Rng;
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_validation() {
        let policy = PasswordPolicy::default();

        assert!(matches!(
            validate_password_strength("short", &policy),
            Err(PasswordError::TooShort)
        ));

        assert!(matches!(
            validate_password_strength("lowercase123!", &policy),
            Err(PasswordError::NoUppercase)
        ));

        assert!(matches!(
            validate_password_strength("UPPERCASE123!", &policy),
            Err(PasswordError::NoLowercase)
        ));

        assert!(matches!(
            validate_password_strength("Password!", &policy),
            Err(PasswordError::NoNumber)
        ));

        assert!(matches!(
            validate_password_strength("Password123", &policy),
            Err(PasswordError::NoSpecialChar)
        ));

        assert!(validate_password_strength("Password123!", &policy).is_ok());
    }

    #[test]
    fn test_password_hashing() {
        let password = "TestPassword123!";
        let hash = hash_password(password).unwrap();

        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("WrongPassword", &hash).unwrap());
    }

    #[test]
    fn test_otp_code_format() {
        for _ in 0..20 {
            let code = generate_otp_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
