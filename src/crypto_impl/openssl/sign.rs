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

use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private, Public};
use openssl::rsa::Rsa;
use openssl::sign::{Signer, Verifier};

use crate::crypto_impl::openssl::{algorithm_digest, OpensslCipherError, OpensslContext};
use crate::error::BindingError;
use crate::sign::{RsaKeypair, SignatureAlgorithm, SignCryptoBackend};

impl SignCryptoBackend for OpensslContext {
    fn sign_rsa(
        &mut self,
        alg: SignatureAlgorithm,
        key: &RsaKeypair,
        target: &[u8],
    ) -> Result<Vec<u8>, BindingError<Self::Error>> {
        let hash = algorithm_digest(alg);
        sign_rsa(hash, key, target)
    }

    fn verify_rsa(
        &mut self,
        alg: SignatureAlgorithm,
        key: &RsaKeypair,
        signature: &[u8],
        target: &[u8],
    ) -> Result<(), BindingError<Self::Error>> {
        let hash = algorithm_digest(alg);
        verify_rsa(hash, key, signature, target)
    }
}

/// Performs an RSASSA-PKCS1-v1_5 signature operation with the given parameters.
fn sign_rsa(
    hash: MessageDigest,
    key: &RsaKeypair,
    target: &[u8],
) -> Result<Vec<u8>, BindingError<OpensslCipherError>> {
    let private_key = keypair_to_rsa_private_key(key)?;
    let pkey = PKey::from_rsa(private_key)?;

    let mut signer = Signer::new(hash, &pkey)?;
    signer.sign_oneshot_to_vec(target).map_err(BindingError::from)
}

/// Performs an RSASSA-PKCS1-v1_5 verification operation with the given
/// parameters.
fn verify_rsa(
    hash: MessageDigest,
    key: &RsaKeypair,
    signature: &[u8],
    signed_data: &[u8],
) -> Result<(), BindingError<OpensslCipherError>> {
    let public_key = keypair_to_rsa_public_key(key)?;
    let pkey = PKey::from_rsa(public_key)?;

    let mut verifier = Verifier::new(hash, &pkey)?;
    // A structurally invalid signature makes verify_oneshot return Err rather
    // than Ok(false). Both outcomes are reported identically so that callers
    // cannot distinguish malformed from merely wrong signatures.
    match verifier.verify_oneshot(signature, signed_data) {
        Ok(true) => Ok(()),
        Ok(false) | Err(_) => Err(BindingError::InvalidSignature),
    }
}

/// Parses the private half of `key` into its corresponding representation as
/// an [`Rsa`] key in `openssl`.
fn keypair_to_rsa_private_key(
    key: &RsaKeypair,
) -> Result<Rsa<Private>, BindingError<OpensslCipherError>> {
    let der = key.private_der().ok_or(BindingError::KeyUnavailable)?;
    Rsa::private_key_from_der(der)
        .map_err(|e| BindingError::KeyFormat(format!("invalid PKCS#1 private key: {e}")))
}

/// Parses the public half of `key` into its corresponding representation as
/// an [`Rsa`] key in `openssl`.
fn keypair_to_rsa_public_key(
    key: &RsaKeypair,
) -> Result<Rsa<Public>, BindingError<OpensslCipherError>> {
    Rsa::public_key_from_der_pkcs1(key.public_der())
        .map_err(|e| BindingError::KeyFormat(format!("invalid PKCS#1 public key: {e}")))
}
