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

//! Helpers shared between the unit and integration test suites.

use url::Url;

#[cfg(feature = "openssl")]
use crate::crypto_impl::openssl::OpensslContext;
#[cfg(feature = "rustcrypto")]
use crate::crypto_impl::rustcrypto::RustCryptoContext;
use crate::{HttpMethod, MessageContext};

/// Constructs the OpenSSL backend for test cases.
#[cfg(feature = "openssl")]
pub(crate) fn openssl_ctx() -> OpensslContext {
    OpensslContext::new()
}

/// Constructs the RustCrypto backend for test cases, seeded deterministically
/// so handle generation is reproducible.
#[cfg(feature = "rustcrypto")]
pub(crate) fn rustcrypto_ctx() -> RustCryptoContext<rand::rngs::StdRng> {
    use rand::SeedableRng;
    RustCryptoContext::new(rand::rngs::StdRng::seed_from_u64(0x1357_9bdf))
}

/// A message context for a POST to the association endpoint of an example
/// authorization server.
pub(crate) fn example_context() -> MessageContext {
    MessageContext::new(
        HttpMethod::Post,
        Url::parse("https://op.example/assoc").expect("static URL must parse"),
    )
}
