use argon2::password_hash::{SaltString, rand_core};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash};

use crate::models::User;

/// Argon2 PHC hashing for device login passwords.
#[derive(Clone, Default)]
pub struct AuthService {
    argon2: Argon2<'static>,
}

impl AuthService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash(&self, password: &str) -> Result<String, password_hash::Error> {
        let salt = SaltString::generate(&mut rand_core::OsRng);

        Ok(self.argon2.hash_password(password.as_bytes(), &salt)?.to_string())
    }

    /// Fails when the stored password is not a PHC string.
    pub fn verify(&self, user: &User, password: &str) -> Result<bool, password_hash::Error> {
        let stored = PasswordHash::new(&user.password)?;

        Ok(self.argon2.verify_password(password.as_bytes(), &stored).is_ok())
    }
}
