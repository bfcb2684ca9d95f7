use regex::Regex;

use crate::config::constants::MIN_TEMP_PASSWORD_LEN;
use crate::config::settings::PasswordPolicy;

/// Validate the shape of an email address
pub fn validate_email(email: &str) -> bool {
    // Intentionally loose: the identity provider is the authority, this only
    // rejects obviously malformed input before a network call.
    let re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex");
    re.is_match(email)
}

/// Validate the temporary password an administrator supplies at provisioning
pub fn validate_temp_password(password: &str) -> Result<(), String> {
    if password.len() < MIN_TEMP_PASSWORD_LEN {
        return Err(format!(
            "Temporary password must be at least {} characters",
            MIN_TEMP_PASSWORD_LEN
        ));
    }
    Ok(())
}

/// Validate a new password against the configured gate policy.
///
/// Runs before any network call; a policy violation never reaches the
/// identity provider.
pub fn validate_password_policy(password: &str, policy: &PasswordPolicy) -> Result<(), String> {
    if password.len() < policy.min_length {
        return Err(format!(
            "Password must be at least {} characters",
            policy.min_length
        ));
    }
    if policy.require_upper && !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }
    if policy.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict_policy() -> PasswordPolicy {
        PasswordPolicy {
            min_length: 8,
            require_upper: true,
            require_digit: true,
        }
    }

    fn lenient_policy() -> PasswordPolicy {
        PasswordPolicy {
            min_length: 6,
            require_upper: false,
            require_digit: false,
        }
    }

    #[test]
    fn accepts_plain_addresses() {
        assert!(validate_email("cliente@test.com"));
        assert!(validate_email("maria.lopez@agency.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!validate_email("not-an-email"));
        assert!(!validate_email("missing@tld"));
        assert!(!validate_email("two@@test.com"));
        assert!(!validate_email("spaces in@test.com"));
    }

    #[test]
    fn temp_password_minimum_is_six() {
        assert!(validate_temp_password("abc12").is_err());
        assert!(validate_temp_password("temporal1").is_ok());
    }

    #[test]
    fn strict_policy_rejects_short_and_weak() {
        let policy = strict_policy();
        assert!(validate_password_policy("abc123", &policy).is_err());
        assert!(validate_password_policy("nouppercase1", &policy).is_err());
        assert!(validate_password_policy("NoDigitsHere", &policy).is_err());
        assert!(validate_password_policy("NuevoPass1", &policy).is_ok());
    }

    #[test]
    fn lenient_policy_only_checks_length() {
        let policy = lenient_policy();
        assert!(validate_password_policy("abc12", &policy).is_err());
        assert!(validate_password_policy("abc123", &policy).is_ok());
    }
}
