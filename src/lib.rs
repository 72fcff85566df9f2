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

//! Message-level security for key/value protocol messages exchanged over HTTP.
//!
//! This crate implements the signing and verification pipeline shared by
//! redirect-based federation protocols (delegated authorization in the style of
//! RFC 5849, and identity-provider association/assertion verification): every
//! outgoing message is rendered into a canonical byte string and signed, and
//! every incoming message is independently re-canonicalized and has its
//! signature verified before any of its claims are trusted.
//!
//! The transport itself (HTTP requests and redirects, user-agent rendering,
//! message-type dispatch) is *out of scope*; this crate consumes the HTTP
//! method and recipient URL that the transport layer resolved for a message
//! and hands back either a signed message or a typed rejection.
//!
//! # Overview
//!
//! The crate is organized around four pieces:
//!
//! - [`ProtocolMessage`]: an ordered multimap of field names to values,
//!   independent of any concrete message type.
//! - The signature base builder in [`base`]: a pure function turning
//!   (HTTP method, recipient URL, message fields) into one deterministic byte
//!   string, using the normalization rules of RFC 5849, section 3.4.1.
//! - The signers in [`sign`] and their backends in [`crypto_impl`]: a closed
//!   set of algorithms ([`SignatureAlgorithm`]) split into a symmetric (HMAC)
//!   and an asymmetric (RSA) family, with the actual cryptography provided by
//!   pluggable [`CryptoBackend`] implementations.
//! - The association lifecycle in [`association`] and the binding-element
//!   pipeline in [`binding`], which tie the above together: associations are
//!   negotiated, time-bounded key material looked up by handle, and the
//!   [`SigningBindingElement`] is the pipeline stage that attaches signatures
//!   on the way out and enforces them on the way in.
//!
//! # Example
//!
//! Signing an outgoing request with a shared-secret association and verifying
//! it on the receiving side:
//!
//! ```
//! # #[cfg(feature = "openssl")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use std::time::Duration;
//! use sigbind::crypto_impl::openssl::OpensslContext;
//! use sigbind::{
//!     AssociationConfig, AssociationStore, BindingElement, HttpMethod, KeyMaterial,
//!     MessageContext, ProtocolMessage, SharedSecret, SignatureAlgorithm,
//!     SigningBindingElement,
//! };
//!
//! let mut backend = OpensslContext::new();
//! let store = Arc::new(AssociationStore::new());
//! let association = store.create(
//!     &mut backend,
//!     AssociationConfig::builder()
//!         .key(KeyMaterial::Symmetric(SharedSecret::new("consumerSecret", None)))
//!         .algorithm(SignatureAlgorithm::HmacSha1)
//!         .lifetime(Duration::from_secs(3600))
//!         .build()?,
//! )?;
//!
//! let mut message = ProtocolMessage::new();
//! message.set("oauth_token", association.handle());
//! message.set("scope", "read");
//!
//! let signing = SigningBindingElement::new(Arc::clone(&store));
//! let context = MessageContext::new(HttpMethod::Post, "https://op.example/token".parse()?);
//! let signed = signing.apply_outgoing(&mut backend, message, &context)?;
//! assert!(signed.is_signed());
//!
//! let verified = signing.verify_incoming(&mut backend, signed, &context)?;
//! assert_eq!(verified.get("scope"), Some("read"));
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "openssl"))]
//! # fn main() {}
//! ```
//!
//! # Crypto backends
//!
//! Cryptographic primitives are behind the [`CryptoBackend`] family of traits,
//! so that the signing pipeline itself stays free of any particular crypto
//! library. Two backends ship with the crate:
//!
//! - [`crypto_impl::openssl`] (default feature `openssl`): HMAC and RSA
//!   signatures via OpenSSL.
//! - [`crypto_impl::rustcrypto`] (feature `rustcrypto`): HMAC via the
//!   RustCrypto crates. RSA signatures are not provided by this backend and
//!   are rejected as unsupported.

#![deny(rustdoc::broken_intra_doc_links, clippy::pedantic)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]
// These ones are a little too eager
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::wildcard_imports
)]

#[macro_use]
extern crate derive_builder;

#[doc(inline)]
pub use association::{Association, AssociationConfig, AssociationStore};
#[doc(inline)]
pub use binding::{BindingElement, Pipeline, SigningBindingElement};
#[doc(inline)]
pub use common::constants;
#[doc(inline)]
pub use common::message::{HttpMethod, MessageContext, ProtocolMessage};
#[doc(inline)]
pub use sign::{
    AlgorithmFamily, CryptoBackend, KeyMaterial, MacCryptoBackend, RsaKeypair, SharedSecret,
    SignCryptoBackend, SignatureAlgorithm,
};

pub mod association;
pub mod base;
pub mod binding;
pub mod common;
pub mod crypto_impl;
pub mod error;
pub mod sign;
