//! Argon2id password hashing.
//!
//! Hashes are PHC strings, so parameters and salt travel with the stored
//! value and verification needs no extra configuration.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash as PhcHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};

use crate::domain::ports::{HashingError, PasswordHasher};
use crate::domain::user::{Password, PasswordHash};

/// [`PasswordHasher`] backed by Argon2id with the crate's default cost.
#[derive(Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, HashingError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|err| HashingError::backend(format!("argon2 hash failed: {err}")))?;
        Ok(PasswordHash::new(hash.to_string()))
    }

    fn verify(&self, password: &Password, hash: &PasswordHash) -> bool {
        let Ok(parsed) = PhcHash::new(hash.as_str()) else {
            return false;
        };
        self.argon2
            .verify_password(password.expose().as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::default()
    }

    #[rstest]
    fn hash_verifies_only_the_original(hasher: Argon2PasswordHasher) {
        let hash = hasher.hash(&Password::new("Abc12345")).expect("hash");

        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify(&Password::new("Abc12345"), &hash));
        assert!(!hasher.verify(&Password::new("Abc12346"), &hash));
    }

    #[rstest]
    fn salts_differ_between_hashes(hasher: Argon2PasswordHasher) {
        let password = Password::new("Abc12345");
        let first = hasher.hash(&password).expect("hash");
        let second = hasher.hash(&password).expect("hash");

        assert_ne!(first, second);
    }

    #[rstest]
    fn garbage_hash_never_verifies(hasher: Argon2PasswordHasher) {
        assert!(!hasher.verify(&Password::new("Abc12345"), &PasswordHash::new("not-a-phc")));
    }
}
