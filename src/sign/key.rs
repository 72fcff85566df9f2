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

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::base::percent_encode;

/// Key material usable for signing or verifying a message, one variant per
/// [`AlgorithmFamily`](crate::AlgorithmFamily).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyMaterial {
    /// Shared secret for the HMAC family.
    Symmetric(SharedSecret),
    /// RSA keypair for the signature family.
    Rsa(RsaKeypair),
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMaterial::Symmetric(secret) => f.debug_tuple("Symmetric").field(secret).finish(),
            KeyMaterial::Rsa(keypair) => f.debug_tuple("Rsa").field(keypair).finish(),
        }
    }
}

impl From<SharedSecret> for KeyMaterial {
    fn from(secret: SharedSecret) -> Self {
        KeyMaterial::Symmetric(secret)
    }
}

impl From<RsaKeypair> for KeyMaterial {
    fn from(keypair: RsaKeypair) -> Self {
        KeyMaterial::Rsa(keypair)
    }
}

/// Shared secret of a consumer (and optionally of a delegation token) used to
/// key the HMAC family of algorithms.
///
/// The `Debug` implementation redacts the secret values.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedSecret {
    consumer_secret: String,
    token_secret: Option<String>,
}

impl SharedSecret {
    /// Creates a shared secret from a consumer secret and an optional token
    /// secret.
    pub fn new<C: Into<String>>(consumer_secret: C, token_secret: Option<String>) -> SharedSecret {
        SharedSecret {
            consumer_secret: consumer_secret.into(),
            token_secret,
        }
    }

    /// The HMAC key derived from this secret, the percent-encoded consumer
    /// secret and percent-encoded token secret joined by a single `&`
    /// (RFC 5849, section 3.4.2).
    ///
    /// An absent token secret still contributes its `&` separator, so a
    /// consumer-only key ends in `&`. The encoding makes the concatenation
    /// injective: distinct secret pairs always yield distinct keys.
    #[must_use]
    pub fn key_bytes(&self) -> Vec<u8> {
        let mut key = percent_encode(&self.consumer_secret);
        key.push('&');
        if let Some(token_secret) = &self.token_secret {
            key.push_str(&percent_encode(token_secret));
        }
        key.into_bytes()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret")
            .field("consumer_secret", &"[redacted]")
            .field(
                "token_secret",
                &self.token_secret.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// RSA key material, always carrying the public key and optionally the
/// private key of the signing party.
///
/// Both halves are kept as PKCS#1 DER, the format the backends consume
/// directly; parsing and validation happen in the backend when the key is
/// first used.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaKeypair {
    public_der: Vec<u8>,
    private_der: Option<Vec<u8>>,
}

impl RsaKeypair {
    /// Creates verification-only key material from a PKCS#1 DER encoded
    /// public key.
    #[must_use]
    pub fn public_only(public_der: Vec<u8>) -> RsaKeypair {
        RsaKeypair {
            public_der,
            private_der: None,
        }
    }

    /// Creates signing-capable key material from PKCS#1 DER encoded public
    /// and private keys.
    #[must_use]
    pub fn with_private(public_der: Vec<u8>, private_der: Vec<u8>) -> RsaKeypair {
        RsaKeypair {
            public_der,
            private_der: Some(private_der),
        }
    }

    /// The PKCS#1 DER encoded public key.
    #[must_use]
    pub fn public_der(&self) -> &[u8] {
        &self.public_der
    }

    /// The PKCS#1 DER encoded private key, if this party can sign.
    #[must_use]
    pub fn private_der(&self) -> Option<&[u8]> {
        self.private_der.as_deref()
    }

    /// Whether this key material carries the private half.
    #[must_use]
    pub fn has_private(&self) -> bool {
        self.private_der.is_some()
    }
}

impl fmt::Debug for RsaKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKeypair")
            .field("public_der", &format_args!("[{} bytes]", self.public_der.len()))
            .field(
                "private_der",
                &self.private_der.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
