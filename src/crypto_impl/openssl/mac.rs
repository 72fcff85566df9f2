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

use openssl::pkey::PKey;
use openssl::sign::Signer;

use crate::crypto_impl::openssl::{algorithm_digest, OpensslCipherError, OpensslContext};
use crate::error::BindingError;
use crate::sign::{MacCryptoBackend, SignatureAlgorithm};

/// Computes an HMAC for `input` using the given `algorithm` and `key`.
fn compute_hmac(
    algorithm: SignatureAlgorithm,
    key: &[u8],
    input: &[u8],
) -> Result<Vec<u8>, BindingError<OpensslCipherError>> {
    let hash = algorithm_digest(algorithm);
    let hmac_key = PKey::hmac(key)?;
    let mut signer = Signer::new(hash, &hmac_key)?;
    signer.sign_oneshot_to_vec(input).map_err(BindingError::from)
}

impl MacCryptoBackend for OpensslContext {
    fn compute_hmac(
        &mut self,
        alg: SignatureAlgorithm,
        key: &[u8],
        payload: &[u8],
    ) -> Result<Vec<u8>, BindingError<Self::Error>> {
        compute_hmac(alg, key, payload)
    }

    fn verify_hmac(
        &mut self,
        alg: SignatureAlgorithm,
        key: &[u8],
        tag: &[u8],
        payload: &[u8],
    ) -> Result<(), BindingError<Self::Error>> {
        let hmac = compute_hmac(alg, key, payload)?;
        // Use openssl::memcmp::eq to prevent timing attacks. It aborts on
        // slices of unequal length, hence the explicit length check first.
        if hmac.len() == tag.len() && openssl::memcmp::eq(hmac.as_slice(), tag) {
            Ok(())
        } else {
            Err(BindingError::InvalidSignature)
        }
    }
}
