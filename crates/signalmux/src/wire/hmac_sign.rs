// SPDX-License-Identifier: Apache-2.0 OR MIT

//! HMAC signing/verification of record message bytes (§4.2, §7).
//!
//! Only built with the `hmac-signing` feature. Signer side computes an
//! HMAC over the message bytes and embeds it in the header; verifier side
//! recomputes and compares constant-time (via the `hmac`/`subtle`
//! constant-time comparison baked into `Mac::verify_slice`). A mismatch is
//! a non-fatal per-record [`WireError::SignatureInvalid`] — counted and
//! dropped by the caller, not fatal to the stream.

use super::error::WireError;
use super::frame::{Header, HmacHashFunction};
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;

type HmacMd5 = Hmac<Md5>;
type HmacSha1 = Hmac<Sha1>;

/// Signs outgoing message bytes with a fixed key, hash function, and
/// signer identity.
pub struct Signer {
    name: String,
    key_version: u32,
    hash: HmacHashFunction,
    key: Vec<u8>,
}

impl Signer {
    #[must_use]
    pub fn new(name: impl Into<String>, key: Vec<u8>, hash: HmacHashFunction, key_version: u32) -> Self {
        Self { name: name.into(), key_version, hash, key }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn hash_function(&self) -> HmacHashFunction {
        self.hash
    }

    #[must_use]
    pub fn key_version(&self) -> u32 {
        self.key_version
    }

    #[must_use]
    pub fn sign(&self, message_bytes: &[u8]) -> Vec<u8> {
        compute_hmac(self.hash, &self.key, message_bytes)
    }
}

/// Looks up signer keys by `(signer name, key version)` to verify incoming
/// records. Multiple signers/key versions may be registered at once, e.g.
/// during key rotation.
#[derive(Default)]
pub struct Verifier {
    keys: std::collections::HashMap<(String, u32), Vec<u8>>,
}

impl Verifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_key(&mut self, signer_name: impl Into<String>, key_version: u32, key: Vec<u8>) {
        self.keys.insert((signer_name.into(), key_version), key);
    }

    /// Recompute the HMAC over `message_bytes` using the key registered for
    /// `header`'s `(hmac_signer, hmac_key_version)` and compare
    /// constant-time against `header.hmac`.
    ///
    /// Returns `Ok(())` when the header carries no signature at all (no
    /// verification configured for this record).
    pub fn verify(&self, header: &Header, message_bytes: &[u8]) -> Result<(), WireError> {
        let Some(hash) = header.hmac_hash_function else {
            return Ok(());
        };
        let key = self
            .keys
            .get(&(header.hmac_signer.clone(), header.hmac_key_version))
            .ok_or(WireError::SignatureInvalid)?;
        if verify_hmac(hash, key, message_bytes, &header.hmac) {
            Ok(())
        } else {
            Err(WireError::SignatureInvalid)
        }
    }
}

fn compute_hmac(hash: HmacHashFunction, key: &[u8], message_bytes: &[u8]) -> Vec<u8> {
    match hash {
        HmacHashFunction::Md5 => {
            let mut mac = HmacMd5::new_from_slice(key).expect("HMAC accepts keys of any length");
            mac.update(message_bytes);
            mac.finalize().into_bytes().to_vec()
        }
        HmacHashFunction::Sha1 => {
            let mut mac = HmacSha1::new_from_slice(key).expect("HMAC accepts keys of any length");
            mac.update(message_bytes);
            mac.finalize().into_bytes().to_vec()
        }
    }
}

fn verify_hmac(hash: HmacHashFunction, key: &[u8], message_bytes: &[u8], expected: &[u8]) -> bool {
    match hash {
        HmacHashFunction::Md5 => HmacMd5::new_from_slice(key)
            .map(|mut mac| {
                mac.update(message_bytes);
                mac.verify_slice(expected).is_ok()
            })
            .unwrap_or(false),
        HmacHashFunction::Sha1 => HmacSha1::new_from_slice(key)
            .map(|mut mac| {
                mac.update(message_bytes);
                mac.verify_slice(expected).is_ok()
            })
            .unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifier_accepts_a_correctly_signed_message() {
        let signer = Signer::new("signer-a", b"secret-key".to_vec(), HmacHashFunction::Sha1, 1);
        let message_bytes = b"the message body";
        let header = Header {
            message_length: message_bytes.len() as u32,
            hmac_hash_function: Some(signer.hash_function()),
            hmac_signer: signer.name().to_string(),
            hmac_key_version: signer.key_version(),
            hmac: signer.sign(message_bytes),
        };

        let mut verifier = Verifier::new();
        verifier.add_key("signer-a", 1, b"secret-key".to_vec());
        assert!(verifier.verify(&header, message_bytes).is_ok());
    }

    #[test]
    fn verifier_rejects_a_tampered_message() {
        let signer = Signer::new("signer-a", b"secret-key".to_vec(), HmacHashFunction::Md5, 1);
        let message_bytes = b"the message body";
        let header = Header {
            message_length: message_bytes.len() as u32,
            hmac_hash_function: Some(signer.hash_function()),
            hmac_signer: signer.name().to_string(),
            hmac_key_version: signer.key_version(),
            hmac: signer.sign(message_bytes),
        };

        let mut verifier = Verifier::new();
        verifier.add_key("signer-a", 1, b"secret-key".to_vec());
        assert!(verifier.verify(&header, b"a tampered body").is_err());
    }

    #[test]
    fn header_without_signing_metadata_verifies_trivially() {
        let header = Header { message_length: 3, ..Header::default() };
        let verifier = Verifier::new();
        assert!(verifier.verify(&header, b"abc").is_ok());
    }
}
