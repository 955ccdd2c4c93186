use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::{rand_core::OsRng, SaltString};
use tracing::instrument;

/// Argon2id hashing for account passwords.
pub struct PasswordService;

impl PasswordService {
    #[instrument(skip(password))]
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    /// `Ok(false)` on a wrong password; `Err` only for an unreadable hash.
    #[instrument(skip(password, hash))]
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
        let parsed_hash = PasswordHash::new(hash)?;
        let argon2 = Argon2::default();

        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_and_are_salted() {
        let first = PasswordService::hash_password("Secret#123").unwrap();
        let second = PasswordService::hash_password("Secret#123").unwrap();

        assert_ne!(first, second);
        assert!(PasswordService::verify_password("Secret#123", &first).unwrap());
        assert!(!PasswordService::verify_password("secret#123", &first).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(PasswordService::verify_password("Secret#123", "not-a-hash").is_err());
    }
}
