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

use digest::{FixedOutput, KeyInit, Mac, MacMarker, Update};
use hmac::Hmac;
use rand::{CryptoRng, RngCore};
use sha1::Sha1;
use sha2::Sha256;

use crate::crypto_impl::rustcrypto::RustCryptoContext;
use crate::error::BindingError;
use crate::sign::{CryptoBackend, MacCryptoBackend, SignatureAlgorithm};

impl<RNG: RngCore + CryptoRng> RustCryptoContext<RNG> {
    /// Compute the HMAC of `payload` using the given `key` with the HMAC
    /// function `MAC`.
    ///
    /// Keys of any length are accepted, longer-than-block-size keys are
    /// hashed first as RFC 2104 prescribes.
    fn compute_hmac_using_mac<MAC: KeyInit + Update + FixedOutput + MacMarker>(
        key: &[u8],
        payload: &[u8],
    ) -> Result<Vec<u8>, BindingError<<Self as CryptoBackend>::Error>> {
        let mut hmac = <MAC as Mac>::new_from_slice(key)
            .map_err(|e| BindingError::Other(e.into()))?;
        hmac.update(payload);
        Ok(hmac.finalize().into_bytes().to_vec())
    }

    /// Verify the HMAC of `payload` using the given `key` with the HMAC
    /// function `MAC`.
    fn verify_hmac_using_mac<MAC: KeyInit + Update + FixedOutput + MacMarker>(
        key: &[u8],
        payload: &[u8],
        tag: &[u8],
    ) -> Result<(), BindingError<<Self as CryptoBackend>::Error>> {
        let mut hmac = <MAC as Mac>::new_from_slice(key)
            .map_err(|e| BindingError::Other(e.into()))?;
        hmac.update(payload);
        // verify_slice performs a constant-time comparison.
        hmac.verify_slice(tag).map_err(BindingError::from)
    }
}

impl<RNG: RngCore + CryptoRng> MacCryptoBackend for RustCryptoContext<RNG> {
    fn compute_hmac(
        &mut self,
        alg: SignatureAlgorithm,
        key: &[u8],
        payload: &[u8],
    ) -> Result<Vec<u8>, BindingError<Self::Error>> {
        match alg {
            SignatureAlgorithm::HmacSha1 => {
                Self::compute_hmac_using_mac::<Hmac<Sha1>>(key, payload)
            }
            SignatureAlgorithm::HmacSha256 => {
                Self::compute_hmac_using_mac::<Hmac<Sha256>>(key, payload)
            }
            a => Err(BindingError::UnsupportedAlgorithm(a.to_string())),
        }
    }

    fn verify_hmac(
        &mut self,
        alg: SignatureAlgorithm,
        key: &[u8],
        tag: &[u8],
        payload: &[u8],
    ) -> Result<(), BindingError<Self::Error>> {
        match alg {
            SignatureAlgorithm::HmacSha1 => {
                Self::verify_hmac_using_mac::<Hmac<Sha1>>(key, payload, tag)
            }
            SignatureAlgorithm::HmacSha256 => {
                Self::verify_hmac_using_mac::<Hmac<Sha256>>(key, payload, tag)
            }
            a => Err(BindingError::UnsupportedAlgorithm(a.to_string())),
        }
    }
}
