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

//! Constants for the well-known protocol field names used by the signing
//! pipeline, as defined in RFC 5849.
//!
//! A [`ProtocolMessage`](crate::ProtocolMessage) may carry any fields a
//! concrete message type declares; the signing pipeline itself only interprets
//! the handful of names collected here.

/// Field holding the signature value of a signed message.
///
/// Never part of the signature base; attached by the signing binding element
/// on the way out and checked on the way in.
pub const SIGNATURE: &str = "oauth_signature";

/// Field declaring which [`SignatureAlgorithm`](crate::SignatureAlgorithm)
/// a message is (or is to be) signed with.
pub const SIGNATURE_METHOD: &str = "oauth_signature_method";

/// Field referencing the association whose key material signs the message.
pub const TOKEN: &str = "oauth_token";

/// Field identifying the consumer making a request.
pub const CONSUMER_KEY: &str = "oauth_consumer_key";

/// Transport-only field naming the protection realm (RFC 5849, section 3.5.1).
///
/// Carried in the `Authorization` header on the wire but never part of the
/// signature base.
pub const REALM: &str = "realm";

/// Fields that exist for transport purposes only and are excluded from the
/// signature base, in addition to [`SIGNATURE`] itself (RFC 5849,
/// section 3.4.1.3.1).
pub const TRANSPORT_ONLY_FIELDS: &[&str] = &[REALM];
