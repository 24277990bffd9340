use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::errors::internal::SessionCodecError;
use crate::errors::InternalError;
use crate::providers::CryptoProvider;
use crate::types::internal::Session;

/// Browsers cap cookies at 4 KiB; anything longer was not issued by us
const MAX_TOKEN_LEN: usize = 4096;

/// Signed session token codec
///
/// Token format: `base64url(json) "." base64url(hmac_sha256(secret, base64url(json)))`,
/// both segments without padding.
pub struct SessionCodec {
    secret: Vec<u8>,
    crypto: Arc<CryptoProvider>,
}

impl SessionCodec {
    pub fn new(secret: impl AsRef<[u8]>, crypto: Arc<CryptoProvider>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            crypto,
        }
    }

    pub fn encode(&self, session: &Session) -> Result<String, InternalError> {
        let json = serde_json::to_vec(session).map_err(|e| InternalError::parse("session", e.to_string()))?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = self.crypto.hmac_sha256(&self.secret, payload.as_bytes())?;

        Ok(format!("{}.{}", payload, URL_SAFE_NO_PAD.encode(signature)))
    }

    /// Decode and verify a token. Never panics; callers treat every error as "no session".
    ///
    /// Does not check expiry.
    pub fn decode(&self, token: &str) -> Result<Session, SessionCodecError> {
        if token.is_empty() || token.len() > MAX_TOKEN_LEN {
            return Err(SessionCodecError::Malformed);
        }

        let (payload, signature) = token.split_once('.').ok_or(SessionCodecError::Malformed)?;
        if payload.is_empty() || signature.is_empty() || signature.contains('.') {
            return Err(SessionCodecError::Malformed);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| SessionCodecError::InvalidEncoding)?;

        // Signature first: nothing from an unauthenticated payload is parsed
        if !self.crypto.verify_hmac_sha256(&self.secret, payload.as_bytes(), &signature) {
            return Err(SessionCodecError::InvalidSignature);
        }

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| SessionCodecError::InvalidEncoding)?;

        serde_json::from_slice(&json).map_err(|e| SessionCodecError::InvalidPayload(e.to_string()))
    }
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec").field("secret", &"<redacted>").finish()
    }
}
