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

//! Backend implementation based on the [`openssl`] crate.

use openssl::error::ErrorStack;
use openssl::hash::MessageDigest;
use strum_macros::Display;

use crate::error::BindingError;
use crate::sign::{CryptoBackend, SignatureAlgorithm};

mod mac;
mod sign;

/// Represents an error caused by the OpenSSL backend.
#[derive(Debug, Display)]
#[non_exhaustive]
pub enum OpensslCipherError {
    /// Standard OpenSSL error (represented as an [`ErrorStack`] in the
    /// openssl library crate).
    OpensslError(ErrorStack),
}

impl From<ErrorStack> for OpensslCipherError {
    fn from(value: ErrorStack) -> Self {
        OpensslCipherError::OpensslError(value)
    }
}

impl From<ErrorStack> for BindingError<OpensslCipherError> {
    fn from(value: ErrorStack) -> Self {
        BindingError::Other(value.into())
    }
}

/// Context for the OpenSSL backend.
///
/// Can be used as a [`CryptoBackend`] for the signing operations of this
/// crate.
///
/// Algorithm support:
/// - Keyed-hash algorithms
///     - [x] HMAC-SHA1
///     - [x] HMAC-SHA256
/// - Digital-signature algorithms
///     - [x] RSA-SHA1
///     - [x] RSA-SHA256
#[derive(Debug, Clone, Copy, Default)]
pub struct OpensslContext {}

impl OpensslContext {
    /// Creates a new OpenSSL context for use with the signing functions of
    /// this crate.
    #[must_use]
    pub fn new() -> OpensslContext {
        OpensslContext {}
    }
}

impl CryptoBackend for OpensslContext {
    type Error = OpensslCipherError;

    fn generate_rand(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        openssl::rand::rand_bytes(buf).map_err(OpensslCipherError::from)
    }
}

/// The OpenSSL message digest used by `alg` for both families.
fn algorithm_digest(alg: SignatureAlgorithm) -> MessageDigest {
    match alg {
        SignatureAlgorithm::HmacSha1 | SignatureAlgorithm::RsaSha1 => MessageDigest::sha1(),
        SignatureAlgorithm::HmacSha256 | SignatureAlgorithm::RsaSha256 => MessageDigest::sha256(),
    }
}
