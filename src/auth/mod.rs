pub mod extractor;
pub mod jwt;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use subtle::ConstantTimeEq;

use crate::config::AdminConfig;

/// Hash a password using Argon2id (19MB memory, 2 iterations, parallelism 1).
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let params = Params::new(19 * 1024, 2, 1, None).map_err(|e| format!("Invalid params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| format!("Hashing failed: {e}"))
}

/// Check a login attempt against the configured administrator.
///
/// Returns `Ok(false)` for a wrong username or password and `Err` only when
/// the configured hash itself is unusable.
pub fn verify_admin(admin: &AdminConfig, username: &str, password: &str) -> Result<bool, String> {
    let Some(hash) = admin.password_hash.as_deref() else {
        return Ok(false);
    };
    let parsed = PasswordHash::new(hash).map_err(|e| format!("Invalid admin password hash: {e}"))?;

    let password_ok = Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok();
    let user_ok: bool = admin.username.as_bytes().ct_eq(username.as_bytes()).into();

    Ok(user_ok && password_ok)
}
