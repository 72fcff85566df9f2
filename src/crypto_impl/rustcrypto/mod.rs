/*
 * Copyright (c) 2024 The NAMIB Project Developers.
 * Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
 * https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
 * <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
 * option. This file may not be copied, modified, or distributed
 * except according to those terms.
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Backend implementation based on the RustCrypto family of crates.

use rand::{CryptoRng, RngCore};
use strum_macros::Display;

use crate::error::BindingError;
use crate::sign::{CryptoBackend, RsaKeypair, SignatureAlgorithm, SignCryptoBackend};

#[cfg(feature = "rustcrypto-hmac")]
mod mac;

/// Errors that might be returned from the `RustCrypto` cryptographic backend.
#[derive(Debug, Display)]
#[non_exhaustive]
pub enum RustCryptoError {
    /// Provided parameter has invalid length.
    #[cfg(feature = "rustcrypto-hmac")]
    InvalidLength(digest::InvalidLength),
    /// Error returned by the random number generator.
    RngError(rand::Error),
}

#[cfg(feature = "rustcrypto-hmac")]
impl From<digest::InvalidLength> for RustCryptoError {
    fn from(value: digest::InvalidLength) -> Self {
        RustCryptoError::InvalidLength(value)
    }
}

#[cfg(feature = "rustcrypto-hmac")]
impl From<digest::MacError> for BindingError<RustCryptoError> {
    fn from(_value: digest::MacError) -> Self {
        BindingError::InvalidSignature
    }
}

/// Context for the RustCrypto cryptographic backend.
///
/// Can be used as a [`CryptoBackend`] for the signing operations of this
/// crate.
///
/// Algorithm support:
/// - Keyed-hash algorithms
///     - [x] HMAC-SHA1
///     - [x] HMAC-SHA256
/// - Digital-signature algorithms
///     - [ ] RSA-SHA1 [^1]
///     - [ ] RSA-SHA256 [^1]
///
/// [^1]: Messages declaring an RSA algorithm are rejected with
///       [`BindingError::UnsupportedAlgorithm`] by this backend; use the
///       OpenSSL backend for deployments that verify RSA signatures.
pub struct RustCryptoContext<RNG: RngCore + CryptoRng> {
    rng: RNG,
}

impl<RNG: RngCore + CryptoRng> RustCryptoContext<RNG> {
    /// Creates a new RustCrypto context using the given random number
    /// generator.
    pub fn new(rng: RNG) -> RustCryptoContext<RNG> {
        RustCryptoContext { rng }
    }
}

impl<RNG: RngCore + CryptoRng> CryptoBackend for RustCryptoContext<RNG> {
    type Error = RustCryptoError;

    fn generate_rand(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.rng.try_fill_bytes(buf).map_err(RustCryptoError::RngError)
    }
}

impl<RNG: RngCore + CryptoRng> SignCryptoBackend for RustCryptoContext<RNG> {
    fn sign_rsa(
        &mut self,
        alg: SignatureAlgorithm,
        _key: &RsaKeypair,
        _target: &[u8],
    ) -> Result<Vec<u8>, BindingError<Self::Error>> {
        Err(BindingError::UnsupportedAlgorithm(alg.to_string()))
    }

    fn verify_rsa(
        &mut self,
        alg: SignatureAlgorithm,
        _key: &RsaKeypair,
        _signature: &[u8],
        _target: &[u8],
    ) -> Result<(), BindingError<Self::Error>> {
        Err(BindingError::UnsupportedAlgorithm(alg.to_string()))
    }
}
