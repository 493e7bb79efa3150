//! Password and input helpers

use shared::error::{AppError, ErrorCode};

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Minimal structural email check: `local@domain.tld`, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(AppError::validation("Invalid email format").with_detail("field", "email"))
    }
}

/// At least six characters with an uppercase letter, a digit and a special character
pub fn validate_password(password: &str) -> Result<(), AppError> {
    let strong = password.chars().count() >= MIN_PASSWORD_LENGTH
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace());
    if strong {
        Ok(())
    } else {
        Err(AppError::new(ErrorCode::PasswordTooWeak))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Secret#1").unwrap();
        assert!(verify_password("Secret#1", &hash));
        assert!(!verify_password("secret#1", &hash));
        assert!(!verify_password("Secret#1", "not-a-hash"));
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("ravi@example.com"));
        assert!(is_valid_email("a.b+c@mail.oppa.in"));
        assert!(!is_valid_email("ravi@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ravi example@x.com"));
        assert!(!is_valid_email("a@b@c.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_password_rule() {
        assert!(validate_password("Abc#12").is_ok());
        assert!(validate_password("Ab#1").is_err());
        assert!(validate_password("abc#123").is_err());
        assert!(validate_password("Abcdef#").is_err());
        assert!(validate_password("Abcdef1").is_err());
        assert_eq!(
            validate_password("short").unwrap_err().code,
            ErrorCode::PasswordTooWeak
        );
    }
}
