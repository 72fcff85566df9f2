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

//! The signature base builder.
//!
//! [`build_signature_base`] turns (HTTP method, recipient URL, message fields)
//! into the single canonical byte string both parties sign, implementing the
//! normalization rules of RFC 5849, section 3.4.1. These rules are the
//! compatibility-critical, bit-exact contract of the whole crate: two
//! implementations must agree on every byte of the base or no signature will
//! ever verify across them.
//!
//! The central correctness invariant is determinism: two messages carrying
//! the same multiset of (field, value) pairs produce byte-identical bases
//! regardless of insertion order, because pairs are sorted by their encoded
//! form before joining.

use core::fmt::Write;

use url::Url;

use crate::common::constants;
use crate::common::message::{HttpMethod, ProtocolMessage};
use crate::error::MalformedUriError;


/// Percent-encodes `input` using the reserved character set of RFC 5849,
/// section 3.6.
///
/// This is stricter than generic URL encoding: only the RFC 3986 unreserved
/// characters (ALPHA, DIGIT, `-`, `.`, `_`, `~`) pass through, everything
/// else (including characters generic encoders leave alone) becomes an
/// uppercase `%XX` triplet of its UTF-8 bytes.
#[must_use]
pub fn percent_encode(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    for byte in input.as_bytes() {
        if is_unreserved(*byte) {
            encoded.push(char::from(*byte));
        } else {
            // Infallible for String targets.
            let _ = write!(encoded, "%{byte:02X}");
        }
    }
    encoded
}

/// Whether `byte` is an RFC 3986 unreserved character (note that `~` is
/// unreserved).
const fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

/// Normalizes the message's fields into the parameter string of the signature
/// base (RFC 5849, section 3.4.1.3.2).
///
/// The signature field itself and all transport-only fields are excluded;
/// remaining pairs are individually percent-encoded, sorted lexicographically
/// by encoded name and then by encoded value (duplicates stay as separate
/// entries), and joined as `name=value` pairs with `&`. Fields with empty
/// values participate as `name=`.
#[must_use]
pub fn normalize_parameters(message: &ProtocolMessage) -> String {
    let mut pairs: Vec<(String, String)> = message
        .fields()
        .iter()
        .filter(|(name, _)| {
            name != constants::SIGNATURE && !constants::TRANSPORT_ONLY_FIELDS.contains(&name.as_str())
        })
        .map(|(name, value)| (percent_encode(name), percent_encode(value)))
        .collect();
    // Tuple ordering is exactly the required sort: encoded name first,
    // encoded value as tie-breaker for duplicate names.
    pairs.sort();

    let mut normalized = String::new();
    for (i, (name, value)) in pairs.iter().enumerate() {
        if i > 0 {
            normalized.push('&');
        }
        normalized.push_str(name);
        normalized.push('=');
        normalized.push_str(value);
    }
    normalized
}

/// Normalizes the `recipient` URL for the signature base (RFC 5849,
/// section 3.4.1.2): lowercase scheme and host, no default port, no query
/// string or fragment, path retained (an absent path becomes `/`).
///
/// # Errors
///
/// Returns a [`MalformedUriError`] if the URL has no host component (e.g. a
/// `mailto:` URL) and therefore cannot name a message recipient.
pub fn normalize_recipient(recipient: &Url) -> Result<String, MalformedUriError> {
    // Url already lowercases scheme and host and drops default ports for the
    // schemes we care about; what's left is assembling the reduced form.
    let host = match recipient.host_str() {
        Some(host) if !recipient.cannot_be_a_base() => host,
        _ => {
            return Err(MalformedUriError::new(
                recipient.as_str(),
                "URL has no host and cannot name a recipient",
            ))
        }
    };

    let mut normalized = String::with_capacity(recipient.as_str().len());
    normalized.push_str(recipient.scheme());
    normalized.push_str("://");
    normalized.push_str(host);
    if let Some(port) = recipient.port() {
        // Infallible for String targets.
        let _ = write!(normalized, ":{port}");
    }
    normalized.push_str(recipient.path());
    Ok(normalized)
}

/// Builds the signature base for `message` as it travels to (or arrived at)
/// `recipient` via `method`.
///
/// The base is the `&`-join of three individually percent-encoded segments:
/// the uppercase HTTP method, the normalized recipient URL, and the
/// normalized parameter string. The result is a deterministic function of its
/// logical inputs; map iteration order cannot influence it.
///
/// # Errors
///
/// Returns a [`MalformedUriError`] if `recipient` cannot be normalized. There
/// is no other failure case for well-formed inputs.
pub fn build_signature_base(
    method: HttpMethod,
    recipient: &Url,
    message: &ProtocolMessage,
) -> Result<Vec<u8>, MalformedUriError> {
    let url = normalize_recipient(recipient)?;
    let parameters = normalize_parameters(message);
    let base = format!(
        "{}&{}&{}",
        method,
        percent_encode(&url),
        percent_encode(&parameters)
    );
    Ok(base.into_bytes())
}
