use crate::auth::AuthError;

/// Translate a provider error message into a structured adapter error.
///
/// This is the only place the application matches on provider message text.
/// The hosted service exposes no stable error codes on these endpoints, so
/// classification works on the known phrases below; anything unmatched
/// becomes `Unknown` carrying the original message.
pub fn classify_provider_error(message: &str) -> AuthError {
    let lowered = message.to_lowercase();

    if lowered.contains("already registered") || lowered.contains("already been registered") {
        AuthError::AlreadyRegistered(message.to_string())
    } else if lowered.contains("password should be at least")
        || lowered.contains("password is too short")
    {
        AuthError::WeakPassword(message.to_string())
    } else if lowered.contains("invalid login credentials")
        || lowered.contains("invalid grant")
        || lowered.contains("email not confirmed")
    {
        AuthError::InvalidCredentials(message.to_string())
    } else {
        AuthError::Unknown(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test per known phrase; the provider occasionally rewords messages
    // between releases, so each phrase earns its own case.

    #[test]
    fn user_already_registered() {
        match classify_provider_error("User already registered") {
            AuthError::AlreadyRegistered(msg) => assert_eq!(msg, "User already registered"),
            other => panic!("expected AlreadyRegistered, got {:?}", other),
        }
    }

    #[test]
    fn email_already_been_registered() {
        assert!(matches!(
            classify_provider_error("A user with this email address has already been registered"),
            AuthError::AlreadyRegistered(_)
        ));
    }

    #[test]
    fn password_should_be_at_least() {
        assert!(matches!(
            classify_provider_error("Password should be at least 6 characters"),
            AuthError::WeakPassword(_)
        ));
    }

    #[test]
    fn password_is_too_short() {
        assert!(matches!(
            classify_provider_error("Password is too short"),
            AuthError::WeakPassword(_)
        ));
    }

    #[test]
    fn invalid_login_credentials() {
        assert!(matches!(
            classify_provider_error("Invalid login credentials"),
            AuthError::InvalidCredentials(_)
        ));
    }

    #[test]
    fn invalid_grant() {
        assert!(matches!(
            classify_provider_error("invalid_grant: invalid password"),
            AuthError::InvalidCredentials(_)
        ));
    }

    #[test]
    fn email_not_confirmed() {
        assert!(matches!(
            classify_provider_error("Email not confirmed"),
            AuthError::InvalidCredentials(_)
        ));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(matches!(
            classify_provider_error("USER ALREADY REGISTERED"),
            AuthError::AlreadyRegistered(_)
        ));
    }

    #[test]
    fn unmatched_text_falls_back_to_unknown_with_message() {
        match classify_provider_error("Database connection refused") {
            AuthError::Unknown(msg) => assert_eq!(msg, "Database connection refused"),
            other => panic!("expected Unknown, got {:?}", other),
        }
    }
}
