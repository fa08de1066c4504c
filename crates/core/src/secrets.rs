//! Persisted forms of password values.
//!
//! With a passphrase, secrets are sealed with AES-256-GCM under a key
//! derived by PBKDF2-HMAC-SHA256. Without one they are only base64 encoded,
//! which keeps them out of casual view but gives no confidentiality.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

pub const ALGORITHM: &str = "aes-256-gcm";
pub const PBKDF2_ROUNDS: u32 = 120_000;
const KEY_LEN: usize = 32;
const SALT_LEN: usize = 16;
const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// A secret sealed with a passphrase. Byte fields are base64.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedSecret {
    pub encrypted: bool,
    pub algorithm: String,
    pub iv: String,
    pub salt: String,
    pub auth_tag: String,
    pub ciphertext: String,
}

/// A secret stored as base64 of its plaintext.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EncodedSecret {
    pub encoded: bool,
    pub value: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum SecretEnvelope {
    Encrypted(EncryptedSecret),
    Encoded(EncodedSecret),
}

impl SecretEnvelope {
    /// Wraps `plain`, encrypting when a non-empty passphrase is given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encryption`] if the cipher rejects its input.
    pub fn seal(plain: &str, passphrase: Option<&str>) -> Result<Self> {
        match passphrase.filter(|p| !p.is_empty()) {
            Some(passphrase) => encrypt(plain, passphrase).map(SecretEnvelope::Encrypted),
            None => Ok(SecretEnvelope::Encoded(encode(plain))),
        }
    }

    /// Recovers the plaintext.
    ///
    /// Encoded envelopes ignore the passphrase. Encrypted envelopes need one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PassphraseRequired`] for an encrypted envelope
    /// without a passphrase, [`Error::WrongPassphrase`] when authentication
    /// fails, and [`Error::CorruptEnvelope`] for malformed fields. `field`
    /// only labels the error.
    pub fn open(&self, field: &str, passphrase: Option<&str>) -> Result<String> {
        match self {
            SecretEnvelope::Encrypted(secret) => {
                let passphrase = passphrase
                    .filter(|p| !p.is_empty())
                    .ok_or(Error::PassphraseRequired)?;
                decrypt(secret, field, passphrase)
            }
            SecretEnvelope::Encoded(secret) => decode(secret, field),
        }
    }

    /// Reads an envelope out of a stored JSON value, if it is one.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let envelope = serde_json::from_value::<SecretEnvelope>(value.clone()).ok()?;
        let tagged = match &envelope {
            SecretEnvelope::Encrypted(secret) => secret.encrypted,
            SecretEnvelope::Encoded(secret) => secret.encoded,
        };
        tagged.then_some(envelope)
    }

    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        matches!(self, SecretEnvelope::Encrypted(_))
    }
}

fn derive_key(passphrase: &str, salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, PBKDF2_ROUNDS, key.as_mut());
    key
}

fn encrypt(plain: &str, passphrase: &str) -> Result<EncryptedSecret> {
    let mut salt = [0u8; SALT_LEN];
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut iv);

    let key = derive_key(passphrase, &salt);
    let cipher = Aes256Gcm::new_from_slice(key.as_ref())
        .map_err(|e| Error::Encryption(format!("Failed to create cipher: {e}")))?;

    // The AEAD output is ciphertext followed by the tag; they are stored apart.
    let mut sealed = cipher
        .encrypt(Nonce::from_slice(&iv), plain.as_bytes())
        .map_err(|e| Error::Encryption(e.to_string()))?;
    let tag = sealed.split_off(sealed.len() - TAG_LEN);

    Ok(EncryptedSecret {
        encrypted: true,
        algorithm: ALGORITHM.to_string(),
        iv: STANDARD.encode(iv),
        salt: STANDARD.encode(salt),
        auth_tag: STANDARD.encode(tag),
        ciphertext: STANDARD.encode(sealed),
    })
}

fn decode_field(field: &str, what: &str, value: &str, expected_len: Option<usize>) -> Result<Vec<u8>> {
    let bytes = STANDARD
        .decode(value)
        .map_err(|e| Error::CorruptEnvelope(field.to_string(), format!("{what}: {e}")))?;

    match expected_len {
        Some(len) if bytes.len() != len => Err(Error::CorruptEnvelope(
            field.to_string(),
            format!("{what} is {} bytes, expected {len}", bytes.len()),
        )),
        _ => Ok(bytes),
    }
}

fn decrypt(secret: &EncryptedSecret, field: &str, passphrase: &str) -> Result<String> {
    if secret.algorithm != ALGORITHM {
        return Err(Error::CorruptEnvelope(
            field.to_string(),
            format!("unsupported algorithm `{}`", secret.algorithm),
        ));
    }

    let salt = decode_field(field, "salt", &secret.salt, None)?;
    let iv = decode_field(field, "iv", &secret.iv, Some(IV_LEN))?;
    let tag = decode_field(field, "authTag", &secret.auth_tag, Some(TAG_LEN))?;
    let mut sealed = decode_field(field, "ciphertext", &secret.ciphertext, None)?;
    sealed.extend_from_slice(&tag);

    let key = derive_key(passphrase, &salt);
    let cipher = Aes256Gcm::new_from_slice(key.as_ref())
        .map_err(|e| Error::Encryption(format!("Failed to create cipher: {e}")))?;

    let plain = cipher
        .decrypt(Nonce::from_slice(&iv), sealed.as_slice())
        .map_err(|_| Error::WrongPassphrase(field.to_string()))?;

    String::from_utf8(plain)
        .map_err(|e| Error::CorruptEnvelope(field.to_string(), e.to_string()))
}

fn encode(plain: &str) -> EncodedSecret {
    EncodedSecret {
        encoded: true,
        value: STANDARD.encode(plain.as_bytes()),
    }
}

fn decode(secret: &EncodedSecret, field: &str) -> Result<String> {
    let bytes = decode_field(field, "value", &secret.value, None)?;
    String::from_utf8(bytes).map_err(|e| Error::CorruptEnvelope(field.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypted_round_trip() {
        let envelope = SecretEnvelope::seal("secret123", Some("pw1")).unwrap();
        assert!(envelope.is_encrypted());
        assert_eq!(envelope.open("api_key", Some("pw1")).unwrap(), "secret123");
    }

    #[test]
    fn test_wrong_passphrase_never_yields_plaintext() {
        let envelope = SecretEnvelope::seal("secret123", Some("pw1")).unwrap();
        let result = envelope.open("api_key", Some("pw2"));
        assert!(matches!(result, Err(Error::WrongPassphrase(ref f)) if f == "api_key"));
    }

    #[test]
    fn test_encrypted_needs_passphrase() {
        let envelope = SecretEnvelope::seal("secret123", Some("pw1")).unwrap();
        assert!(matches!(
            envelope.open("api_key", None),
            Err(Error::PassphraseRequired)
        ));
    }

    #[test]
    fn test_fresh_salt_and_iv_per_seal() {
        let SecretEnvelope::Encrypted(first) = SecretEnvelope::seal("same", Some("pw")).unwrap()
        else {
            panic!("Expected encrypted envelope");
        };
        let SecretEnvelope::Encrypted(second) = SecretEnvelope::seal("same", Some("pw")).unwrap()
        else {
            panic!("Expected encrypted envelope");
        };
        assert_ne!(first.salt, second.salt);
        assert_ne!(first.iv, second.iv);
        assert_ne!(first.ciphertext, second.ciphertext);
    }

    #[test]
    fn test_tampered_tag_is_rejected() {
        let SecretEnvelope::Encrypted(mut secret) =
            SecretEnvelope::seal("secret123", Some("pw1")).unwrap()
        else {
            panic!("Expected encrypted envelope");
        };
        let mut tag = STANDARD.decode(&secret.auth_tag).unwrap();
        tag[0] ^= 0xff;
        secret.auth_tag = STANDARD.encode(tag);

        let result = SecretEnvelope::Encrypted(secret).open("api_key", Some("pw1"));
        assert!(matches!(result, Err(Error::WrongPassphrase(_))));
    }

    #[test]
    fn test_truncated_iv_is_corrupt_not_panic() {
        let SecretEnvelope::Encrypted(mut secret) =
            SecretEnvelope::seal("secret123", Some("pw1")).unwrap()
        else {
            panic!("Expected encrypted envelope");
        };
        secret.iv = STANDARD.encode([1u8, 2, 3]);

        let result = SecretEnvelope::Encrypted(secret).open("api_key", Some("pw1"));
        assert!(matches!(result, Err(Error::CorruptEnvelope(_, _))));
    }

    #[test]
    fn test_encoded_without_passphrase() {
        for passphrase in [None, Some("")] {
            let envelope = SecretEnvelope::seal("secret123", passphrase).unwrap();
            assert_eq!(
                envelope,
                SecretEnvelope::Encoded(EncodedSecret {
                    encoded: true,
                    value: "c2VjcmV0MTIz".to_string(),
                })
            );
            assert_eq!(envelope.open("api_key", None).unwrap(), "secret123");
        }
    }

    #[test]
    fn test_json_shape() {
        let envelope = SecretEnvelope::seal("x", Some("pw")).unwrap();
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["encrypted"], true);
        assert_eq!(json["algorithm"], ALGORITHM);
        for field in ["iv", "salt", "authTag", "ciphertext"] {
            assert!(json[field].is_string(), "missing {field}");
        }
        assert_eq!(SecretEnvelope::from_json(&json), Some(envelope));
    }

    #[test]
    fn test_from_json_ignores_plain_values() {
        assert!(SecretEnvelope::from_json(&serde_json::json!("plain")).is_none());
        assert!(SecretEnvelope::from_json(&serde_json::json!({"value": "x"})).is_none());
        assert!(
            SecretEnvelope::from_json(&serde_json::json!({"encoded": false, "value": "x"}))
                .is_none()
        );
    }
}
