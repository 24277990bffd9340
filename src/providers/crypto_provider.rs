use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::HashingParams;
use crate::errors::InternalError;

type HmacSha256 = Hmac<Sha256>;

/// Cryptographic operations: peppered Argon2id password hashing and HMAC-SHA256
pub struct CryptoProvider {
    password_pepper: String,
    params: Params,
    /// Verified against when the username does not exist, so both failure paths cost the same
    dummy_hash: String,
}

impl CryptoProvider {
    /// Build the provider and precompute the dummy hash
    ///
    /// # Errors
    /// Returns `InternalError::Crypto` when the Argon2 parameters are rejected
    pub fn new(password_pepper: impl Into<String>, hashing: HashingParams) -> Result<Self, InternalError> {
        let params = Params::new(hashing.memory_kib, hashing.iterations, hashing.parallelism, None)
            .map_err(|e| InternalError::crypto("argon2_params", e.to_string()))?;

        let mut provider = Self {
            password_pepper: password_pepper.into(),
            params,
            dummy_hash: String::new(),
        };
        provider.dummy_hash = provider.hash_password("wendessen-dummy-password")?;

        Ok(provider)
    }

    fn argon2(&self) -> Result<Argon2<'_>, InternalError> {
        Argon2::new_with_secret(
            self.password_pepper.as_bytes(),
            Algorithm::Argon2id,
            Version::V0x13,
            self.params.clone(),
        )
        .map_err(|e| InternalError::crypto("argon2_init", e.to_string()))
    }

    /// Hash a password into a PHC string
    pub fn hash_password(&self, password: &str) -> Result<String, InternalError> {
        let salt = SaltString::generate(&mut rand_core::OsRng);

        self.argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| InternalError::crypto("password_hash", e.to_string()))
    }

    /// Constant-time verification; malformed stored hashes verify as false
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        let parsed = match PasswordHash::new(stored_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Stored password hash is not a valid PHC string: {}", e);
                return false;
            }
        };

        match self.argon2() {
            Ok(argon2) => argon2.verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                tracing::error!("Password verification unavailable: {}", e);
                false
            }
        }
    }

    /// Burn the same work as a real verification; always returns false
    pub fn verify_dummy(&self, password: &str) -> bool {
        let _ = self.verify_password(password, &self.dummy_hash);
        false
    }

    /// HMAC-SHA256 of `message` keyed by `key`
    pub fn hmac_sha256(&self, key: &[u8], message: &[u8]) -> Result<Vec<u8>, InternalError> {
        let mut mac = HmacSha256::new_from_slice(key)
            .map_err(|e| InternalError::crypto("hmac_init", e.to_string()))?;
        mac.update(message);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Constant-time comparison of `signature` against the HMAC of `message`
    pub fn verify_hmac_sha256(&self, key: &[u8], message: &[u8], signature: &[u8]) -> bool {
        match HmacSha256::new_from_slice(key) {
            Ok(mut mac) => {
                mac.update(message);
                mac.verify_slice(signature).is_ok()
            }
            Err(_) => false,
        }
    }
}

impl std::fmt::Debug for CryptoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoProvider")
            .field("password_pepper", &"<redacted>")
            .field("params", &self.params)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Cheap parameters keep the tests fast
    fn test_params() -> HashingParams {
        HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn create_test_crypto_provider() -> CryptoProvider {
        CryptoProvider::new("test-pepper-for-unit-tests", test_params()).unwrap()
    }

    #[test]
    fn test_hash_and_verify_password() {
        let crypto = create_test_crypto_provider();
        let hash = crypto.hash_password("secret123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(crypto.verify_password("secret123", &hash));
        assert!(!crypto.verify_password("secret124", &hash));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let crypto = create_test_crypto_provider();

        assert_ne!(crypto.hash_password("secret123").unwrap(), crypto.hash_password("secret123").unwrap());
    }

    #[test]
    fn test_different_pepper_fails_verification() {
        let crypto = create_test_crypto_provider();
        let other = CryptoProvider::new("another-pepper-value-16", test_params()).unwrap();
        let hash = crypto.hash_password("secret123").unwrap();

        assert!(!other.verify_password("secret123", &hash));
    }

    #[test]
    fn test_malformed_hash_verifies_false() {
        let crypto = create_test_crypto_provider();

        assert!(!crypto.verify_password("secret123", "not-a-phc-string"));
        assert!(!crypto.verify_password("secret123", ""));
    }

    #[test]
    fn test_dummy_verification_never_succeeds() {
        let crypto = create_test_crypto_provider();

        assert!(!crypto.verify_dummy("wendessen-dummy-password"));
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let params = HashingParams {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };

        assert!(matches!(
            CryptoProvider::new("test-pepper-for-unit-tests", params),
            Err(InternalError::Crypto { .. })
        ));
    }

    #[test]
    fn test_hmac_round_trip() {
        let crypto = create_test_crypto_provider();
        let key = b"test-secret-key";
        let signature = crypto.hmac_sha256(key, b"payload").unwrap();

        assert_eq!(signature.len(), 32);
        assert!(crypto.verify_hmac_sha256(key, b"payload", &signature));
        assert!(!crypto.verify_hmac_sha256(key, b"payload2", &signature));
        assert!(!crypto.verify_hmac_sha256(b"other-key", b"payload", &signature));
    }

    #[test]
    fn test_debug_does_not_expose_pepper() {
        let crypto = create_test_crypto_provider();
        let debug = format!("{:?}", crypto);

        assert!(!debug.contains("test-pepper-for-unit-tests"));
        assert!(debug.contains("<redacted>"));
    }
}
