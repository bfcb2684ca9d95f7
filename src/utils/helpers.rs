/// Derive the portal username from an email address.
///
/// The username is the local part of the email. Collisions on the derived
/// value surface as a duplicate-username error at provisioning time; the
/// administrator resolves them by using a different email.
pub fn derive_username(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_the_local_part() {
        assert_eq!(derive_username("cliente@test.com"), "cliente");
        assert_eq!(derive_username("maria.lopez@agency.example.org"), "maria.lopez");
    }

    #[test]
    fn input_without_at_sign_passes_through() {
        assert_eq!(derive_username("cliente"), "cliente");
    }
}
