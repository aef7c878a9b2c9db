use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

/// Outcome of checking a submitted password against a stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    Match,
    Mismatch,
    /// The stored value is not a PHC hash string, e.g. a plain-text row
    /// written before passwords were hashed. Never matches.
    NotHashed,
}

impl PasswordCheck {
    pub fn is_match(self) -> bool {
        self == PasswordCheck::Match
    }
}

/// Argon2id hash with a fresh `OsRng` salt, in PHC string form. Both the
/// SQLite and the spreadsheet stores keep this string as-is.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("argon2 hashing failed: {e}"))
}

/// An empty submission is a mismatch without touching the hasher.
pub fn check_password(plain: &str, stored: &str) -> PasswordCheck {
    if plain.is_empty() {
        return PasswordCheck::Mismatch;
    }
    let Ok(parsed) = PasswordHash::new(stored) else {
        return PasswordCheck::NotHashed;
    };
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => PasswordCheck::Match,
        Err(_) => PasswordCheck::Mismatch,
    }
}
