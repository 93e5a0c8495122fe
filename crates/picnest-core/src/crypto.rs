//! Password hashing with `Argon2id`.
use crate::error::Error;
use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

/// Hashes the raw password using `Argon2id` with a random salt.
pub fn hash_password(raw_password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(raw_password.as_bytes(), &salt)?
        .to_string();
    Ok(password_hash)
}

/// Verifies the raw password against a PHC string produced by [`hash_password`].
pub fn verify_password(raw_password: &str, password_hash: &str) -> Result<bool, Error> {
    let parsed_hash = PasswordHash::new(password_hash)?;
    match Argon2::default().verify_password(raw_password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_password};

    #[test]
    fn it_verifies_passwords() {
        let password_hash = hash_password("s3cret!").unwrap();
        assert!(password_hash.starts_with("$argon2id$"));
        assert!(verify_password("s3cret!", &password_hash).unwrap());
        assert!(!verify_password("secret", &password_hash).unwrap());
        assert!(verify_password("s3cret!", "not-a-phc-string").is_err());
    }
}
