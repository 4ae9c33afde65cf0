//! Seam for the external engine that encrypts generated secrets.
//!
//! The synthesizer never encrypts anything itself; it only records the
//! operator key on credential resources. Engines that do seal a secret
//! implement [`SecretSealer`] and return a [`SealedSecret`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::context::PgpKey;
use crate::error::{SynthesisError, SynthesisResult};

/// Base64 ciphertext of a secret encrypted under an operator public key.
#[derive(Clone, PartialEq, Eq)]
pub struct SealedSecret(String);

impl SealedSecret {
    /// Accepts only non-empty, strictly padded base64.
    pub fn new(ciphertext: impl Into<String>) -> SynthesisResult<Self> {
        let ciphertext = ciphertext.into();
        if ciphertext.is_empty() || STANDARD.decode(&ciphertext).is_err() {
            return Err(SynthesisError::configuration(
                "sealed secret is not valid base64 ciphertext",
            ));
        }
        Ok(Self(ciphertext))
    }

    pub fn as_base64(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SealedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SealedSecret({} base64 chars)", self.0.len())
    }
}

pub trait SecretSealer {
    fn seal(&self, plaintext: &str, key: &PgpKey) -> SynthesisResult<SealedSecret>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stand-in engine: base64 of `<key>:<plaintext>`.
    struct FakeSealer;

    impl SecretSealer for FakeSealer {
        fn seal(&self, plaintext: &str, key: &PgpKey) -> SynthesisResult<SealedSecret> {
            SealedSecret::new(STANDARD.encode(format!("{}:{plaintext}", key.as_base64())))
        }
    }

    #[test]
    fn test_sealed_secret_requires_base64() {
        assert!(SealedSecret::new("").is_err());
        assert!(SealedSecret::new("not base64!").is_err());
        assert!(SealedSecret::new("c2VjcmV0").is_ok());
    }

    #[test]
    fn test_sealer_seam() {
        let key = PgpKey::from_bytes(b"public key").unwrap();
        let sealed = FakeSealer.seal("hunter2", &key).unwrap();
        let decoded = STANDARD.decode(sealed.as_base64()).unwrap();
        assert!(String::from_utf8(decoded).unwrap().ends_with(":hunter2"));
        assert!(!format!("{sealed:?}").contains(sealed.as_base64()));
    }
}
