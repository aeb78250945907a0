//! Password policy, hashing and verification using argon2id.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Accepted password length, in characters.
pub const PASSWORD_LEN: std::ops::RangeInclusive<usize> = 8..=16;

/// Check a candidate password against the length policy.
pub fn check_policy(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if PASSWORD_LEN.contains(&len) {
        Ok(())
    } else {
        Err(format!(
            "password must be between {} and {} characters",
            PASSWORD_LEN.start(),
            PASSWORD_LEN.end()
        ))
    }
}

/// Hash a password with a random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
