use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(String);

impl From<password_hash::Error> for PasswordError {
    fn from(err: password_hash::Error) -> Self {
        Self(err.to_string())
    }
}

/// Argon2id password hash in PHC string form (`$argon2id$v=19$...`).
///
/// Never serialized into API responses; only the user store sees it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash with a fresh random salt and the default Argon2id parameters.
    pub fn hash(plain: &str) -> Result<Self, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = Argon2::default().hash_password(plain.as_bytes(), &salt)?;
        Ok(Self(phc.to_string()))
    }

    /// Unparseable stored hashes never verify.
    pub fn verify(&self, plain: &str) -> bool {
        let Ok(parsed) = password_hash::PasswordHash::new(&self.0) else {
            return false;
        };
        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}

impl core::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordHash(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_only_the_original_password() {
        let hash = PasswordHash::hash("hunter22").unwrap();
        assert!(hash.verify("hunter22"));
        assert!(!hash.verify("hunter23"));
    }

    #[test]
    fn stored_form_is_an_argon2id_phc_string() {
        let hash = PasswordHash::hash("hunter22").unwrap();
        let stored = serde_json::to_value(&hash).unwrap();
        let stored = stored.as_str().unwrap();
        assert!(stored.starts_with("$argon2id$"), "{stored}");
        assert!(!stored.contains("hunter22"));
    }

    #[test]
    fn salts_differ_between_hashes() {
        assert_ne!(
            PasswordHash::hash("same").unwrap(),
            PasswordHash::hash("same").unwrap()
        );
    }

    #[test]
    fn garbage_never_verifies() {
        let bogus = PasswordHash("not-a-hash".to_string());
        assert!(!bogus.verify("not-a-hash"));

        // Legacy salted-digest layout is not accepted either.
        let legacy = PasswordHash("00ff$deadbeef".to_string());
        assert!(!legacy.verify("anything"));
    }

    #[test]
    fn debug_hides_digest() {
        assert_eq!(
            format!("{:?}", PasswordHash::hash("x").unwrap()),
            "PasswordHash(***)"
        );
    }
}
