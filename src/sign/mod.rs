/*
 * Copyright (c) 2022-2024 The NAMIB Project Developers.
 * Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
 * https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
 * <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
 * option. This file may not be copied, modified, or distributed
 * except according to those terms.
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Signature algorithms, key material and the crypto backend traits.
//!
//! The set of algorithms is a closed enum ([`SignatureAlgorithm`]) rather
//! than an open trait hierarchy: dispatch happens by the algorithm tag
//! carried on the message or association, and every match over the enum is
//! exhaustive, so adding an algorithm is a deliberate, compiler-checked act.
//!
//! The actual cryptography is provided by backends implementing
//! [`MacCryptoBackend`] (symmetric family) and [`SignCryptoBackend`]
//! (asymmetric family); implementations for OpenSSL and the RustCrypto crates
//! live in [`crate::crypto_impl`]. [`sign_base`] and [`verify_base`] perform
//! the family dispatch and enforce that the supplied key material actually
//! belongs to the requested algorithm family, which is what makes
//! cross-family confusion (an HMAC "signature" offered where an RSA signature
//! is expected, or vice versa) fail closed.

use core::fmt::Debug;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::BindingError;

mod key;

pub use key::{KeyMaterial, RsaKeypair, SharedSecret};

#[cfg(test)]
mod tests;

/// A signature algorithm of the wire protocol, identified on messages by the
/// names in the `oauth_signature_method` field.
///
/// # Example
/// ```
/// use core::str::FromStr;
/// use sigbind::SignatureAlgorithm;
///
/// let alg = SignatureAlgorithm::from_str("HMAC-SHA1").unwrap();
/// assert_eq!(alg, SignatureAlgorithm::HmacSha1);
/// assert_eq!(alg.to_string(), "HMAC-SHA1");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[non_exhaustive]
pub enum SignatureAlgorithm {
    /// HMAC with SHA-1 over the signature base, keyed by a shared secret
    /// (RFC 5849, section 3.4.2).
    #[strum(serialize = "HMAC-SHA1")]
    HmacSha1,

    /// HMAC with SHA-256 over the signature base, keyed by a shared secret.
    #[strum(serialize = "HMAC-SHA256")]
    HmacSha256,

    /// RSASSA-PKCS1-v1_5 with SHA-1 over the signature base
    /// (RFC 5849, section 3.4.3).
    #[strum(serialize = "RSA-SHA1")]
    RsaSha1,

    /// RSASSA-PKCS1-v1_5 with SHA-256 over the signature base.
    #[strum(serialize = "RSA-SHA256")]
    RsaSha256,
}

impl SignatureAlgorithm {
    /// The algorithm family this algorithm dispatches to.
    #[must_use]
    pub fn family(self) -> AlgorithmFamily {
        match self {
            SignatureAlgorithm::HmacSha1 | SignatureAlgorithm::HmacSha256 => AlgorithmFamily::Mac,
            SignatureAlgorithm::RsaSha1 | SignatureAlgorithm::RsaSha256 => AlgorithmFamily::Sign,
        }
    }
}

/// The two kinds of signature primitive an algorithm can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmFamily {
    /// Keyed-hash (symmetric) algorithms; both parties hold the same secret.
    Mac,
    /// Digital-signature (asymmetric) algorithms; the signer holds a private
    /// key, verifiers hold the public key.
    Sign,
}

/// Common trait for cryptographic backends.
///
/// Backends additionally implement [`MacCryptoBackend`] and/or
/// [`SignCryptoBackend`] for the algorithm families they support.
pub trait CryptoBackend {
    /// Error type of this backend.
    type Error: core::fmt::Display + Debug;

    /// Fills `buf` with cryptographically secure random bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if random bytes could not be generated.
    fn generate_rand(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;
}

/// Trait for cryptographic backends that can compute and verify the
/// symmetric (HMAC) family of signature algorithms.
pub trait MacCryptoBackend: CryptoBackend {
    /// Computes the HMAC of `payload` under `key` using the hash function of
    /// `alg`.
    ///
    /// `key` is the already-concatenated shared secret (see
    /// [`SharedSecret::key_bytes`]); the backend applies it as the HMAC key
    /// verbatim, without padding or hashing it first.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::UnsupportedAlgorithm`] if `alg` is not an HMAC
    /// algorithm this backend implements, or a backend-specific
    /// [`BindingError::Other`].
    fn compute_hmac(
        &mut self,
        alg: SignatureAlgorithm,
        key: &[u8],
        payload: &[u8],
    ) -> Result<Vec<u8>, BindingError<Self::Error>>;

    /// Verifies the HMAC `tag` of `payload` under `key` using the hash
    /// function of `alg`.
    ///
    /// The comparison must be performed in constant time. Implementations
    /// must return [`BindingError::InvalidSignature`] on mismatch, never
    /// panic or report the reason for the mismatch.
    ///
    /// # Errors
    ///
    /// [`BindingError::InvalidSignature`] if the tag does not match;
    /// otherwise as for [`compute_hmac`](Self::compute_hmac).
    fn verify_hmac(
        &mut self,
        alg: SignatureAlgorithm,
        key: &[u8],
        tag: &[u8],
        payload: &[u8],
    ) -> Result<(), BindingError<Self::Error>>;
}

/// Trait for cryptographic backends that can compute and verify the
/// asymmetric (RSA) family of signature algorithms.
pub trait SignCryptoBackend: CryptoBackend {
    /// Signs `target` with the private half of `key` using the hash function
    /// of `alg`.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::KeyUnavailable`] if `key` carries no private
    /// half (verifying parties cannot sign), [`BindingError::KeyFormat`] if
    /// the key material cannot be parsed, or a backend-specific
    /// [`BindingError::Other`].
    fn sign_rsa(
        &mut self,
        alg: SignatureAlgorithm,
        key: &RsaKeypair,
        target: &[u8],
    ) -> Result<Vec<u8>, BindingError<Self::Error>>;

    /// Verifies `signature` over `target` with the public half of `key`
    /// using the hash function of `alg`.
    ///
    /// Structural problems with the signature (wrong length, garbage bytes)
    /// must be treated as a verification failure, not as a distinct error:
    /// verification fails closed.
    ///
    /// # Errors
    ///
    /// [`BindingError::InvalidSignature`] if the signature does not verify,
    /// [`BindingError::KeyFormat`] if the public key cannot be parsed.
    fn verify_rsa(
        &mut self,
        alg: SignatureAlgorithm,
        key: &RsaKeypair,
        signature: &[u8],
        target: &[u8],
    ) -> Result<(), BindingError<Self::Error>>;
}

/// Signs the signature base `base` with `key` under `alg`, dispatching to the
/// backend primitive of the algorithm's family.
///
/// # Errors
///
/// Returns [`BindingError::KeyFormat`] if `key` does not belong to the family
/// of `alg` (shared secrets cannot produce RSA signatures and keypairs cannot
/// produce HMACs), otherwise whatever the backend primitive returns.
pub fn sign_base<B>(
    backend: &mut B,
    alg: SignatureAlgorithm,
    key: &KeyMaterial,
    base: &[u8],
) -> Result<Vec<u8>, BindingError<B::Error>>
where
    B: MacCryptoBackend + SignCryptoBackend,
{
    match (alg.family(), key) {
        (AlgorithmFamily::Mac, KeyMaterial::Symmetric(secret)) => {
            backend.compute_hmac(alg, &secret.key_bytes(), base)
        }
        (AlgorithmFamily::Sign, KeyMaterial::Rsa(keypair)) => {
            backend.sign_rsa(alg, keypair, base)
        }
        (AlgorithmFamily::Mac | AlgorithmFamily::Sign, _) => Err(BindingError::KeyFormat(
            format!("key material does not match the family of algorithm {alg}"),
        )),
    }
}

/// Verifies `signature` over the signature base `base` with `key` under
/// `alg`, dispatching to the backend primitive of the algorithm's family.
///
/// # Errors
///
/// As for [`sign_base`]; a family/key mismatch is a [`BindingError::KeyFormat`]
/// error, a failed check is [`BindingError::InvalidSignature`].
pub fn verify_base<B>(
    backend: &mut B,
    alg: SignatureAlgorithm,
    key: &KeyMaterial,
    signature: &[u8],
    base: &[u8],
) -> Result<(), BindingError<B::Error>>
where
    B: MacCryptoBackend + SignCryptoBackend,
{
    match (alg.family(), key) {
        (AlgorithmFamily::Mac, KeyMaterial::Symmetric(secret)) => {
            backend.verify_hmac(alg, &secret.key_bytes(), signature, base)
        }
        (AlgorithmFamily::Sign, KeyMaterial::Rsa(keypair)) => {
            backend.verify_rsa(alg, keypair, signature, base)
        }
        (AlgorithmFamily::Mac | AlgorithmFamily::Sign, _) => Err(BindingError::KeyFormat(
            format!("key material does not match the family of algorithm {alg}"),
        )),
    }
}
