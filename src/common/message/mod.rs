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

//! The canonical view of a protocol message and its routing context.
//!
//! [`ProtocolMessage`] is the read/write projection every concrete message
//! type reduces to for signing purposes: an ordered multimap of string field
//! names to string values. [`MessageContext`] carries the routing facts (HTTP
//! method and recipient URL) that the transport layer resolved for a message;
//! when verifying, these must come from the transport's own view of the
//! request, never from message content, so that an attacker cannot relabel the
//! recipient.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use url::Url;

use crate::common::constants;


/// HTTP method of the request a message travels in.
///
/// Renders in the uppercase form required by the signature base
/// (RFC 5849, section 3.4.1.1); parsing is case-insensitive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum HttpMethod {
    /// The HTTP `GET` method.
    #[strum(serialize = "GET", ascii_case_insensitive)]
    Get,
    /// The HTTP `POST` method.
    #[strum(serialize = "POST", ascii_case_insensitive)]
    Post,
    /// The HTTP `PUT` method.
    #[strum(serialize = "PUT", ascii_case_insensitive)]
    Put,
    /// The HTTP `DELETE` method.
    #[strum(serialize = "DELETE", ascii_case_insensitive)]
    Delete,
    /// The HTTP `HEAD` method.
    #[strum(serialize = "HEAD", ascii_case_insensitive)]
    Head,
}

/// Routing context for a single message, resolved by the transport layer.
///
/// For outgoing messages this is where the message will be sent; for incoming
/// messages it is the method and URL the receiver *observed* the message
/// arriving at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContext {
    /// HTTP method of the request carrying the message.
    pub method: HttpMethod,
    /// URL the message is addressed to (outgoing) or was received at
    /// (incoming).
    pub recipient: Url,
}

impl MessageContext {
    /// Creates a new context from the given `method` and `recipient` URL.
    #[must_use]
    pub fn new(method: HttpMethod, recipient: Url) -> MessageContext {
        MessageContext { method, recipient }
    }
}

/// An ordered multimap of protocol fields, the canonical view of any concrete
/// protocol message.
///
/// Field order is insertion order and duplicate field names are allowed; the
/// signature base builder sorts fields itself, so insertion order never
/// affects signatures.
///
/// # Signature staleness
///
/// Once a signature has been attached (by the signing binding element), it is
/// part of the message's serialized state. Mutating any *other* signed field
/// through [`set`](Self::set), [`append`](Self::append) or
/// [`remove`](Self::remove) strips the now-stale signature, forcing a re-sign
/// before the message can be sent; a stale signature is never silently
/// retained. Transport-only fields (such as `realm`) are outside the
/// signature base, so changing them leaves an attached signature intact.
///
/// # Example
/// ```
/// use sigbind::ProtocolMessage;
///
/// let mut message = ProtocolMessage::new();
/// message.set("oauth_token", "hdl-1");
/// message.set("scope", "read");
/// assert_eq!(message.get("scope"), Some("read"));
/// assert!(!message.is_signed());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolMessage {
    fields: Vec<(String, String)>,
}

impl ProtocolMessage {
    /// Creates a new message without any fields.
    #[must_use]
    pub fn new() -> ProtocolMessage {
        ProtocolMessage { fields: Vec::new() }
    }

    /// Creates a message from previously serialized `fields`, preserving their
    /// order and any signature they carry.
    ///
    /// This is the entry point for the receiving side: fields parsed off the
    /// wire (including `oauth_signature`) are adopted as-is, to be verified by
    /// the binding pipeline.
    #[must_use]
    pub fn from_fields(fields: Vec<(String, String)>) -> ProtocolMessage {
        ProtocolMessage { fields }
    }

    /// Returns the value of the first field named `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the values of all fields named `name`, in message order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.fields
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets the field `name` to `value`, replacing the first existing field of
    /// that name or appending a new one.
    ///
    /// Strips a previously attached signature (see the type-level
    /// documentation).
    pub fn set<N, V>(&mut self, name: N, value: V)
    where
        N: Into<String>,
        V: Into<String>,
    {
        let name = name.into();
        self.invalidate_signature(&name);
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Appends a field named `name` with `value`, keeping any existing fields
    /// of the same name.
    ///
    /// Strips a previously attached signature (see the type-level
    /// documentation).
    pub fn append<N, V>(&mut self, name: N, value: V)
    where
        N: Into<String>,
        V: Into<String>,
    {
        let name = name.into();
        self.invalidate_signature(&name);
        self.fields.push((name, value.into()));
    }

    /// Removes all fields named `name`, returning how many were removed.
    ///
    /// Strips a previously attached signature (see the type-level
    /// documentation).
    pub fn remove(&mut self, name: &str) -> usize {
        self.invalidate_signature(name);
        let before = self.fields.len();
        self.fields.retain(|(k, _)| k != name);
        before - self.fields.len()
    }

    /// Returns the fields of this message in order.
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Number of fields in this message.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether this message has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The attached signature value, if this message has been signed.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.get(constants::SIGNATURE)
    }

    /// The declared signature method, if any.
    #[must_use]
    pub fn signature_method(&self) -> Option<&str> {
        self.get(constants::SIGNATURE_METHOD)
    }

    /// The association handle this message references, if any.
    #[must_use]
    pub fn association_handle(&self) -> Option<&str> {
        self.get(constants::TOKEN)
    }

    /// The transport-only realm field, if present.
    #[must_use]
    pub fn realm(&self) -> Option<&str> {
        self.get(constants::REALM)
    }

    /// Whether a signature is attached to this message.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.signature().is_some()
    }

    /// Parses the declared signature method into a [`SignatureAlgorithm`],
    /// returning the raw declared name alongside a parse failure.
    ///
    /// [`SignatureAlgorithm`]: crate::SignatureAlgorithm
    pub(crate) fn declared_algorithm(
        &self,
    ) -> Option<Result<crate::sign::SignatureAlgorithm, String>> {
        self.signature_method().map(|declared| {
            crate::sign::SignatureAlgorithm::from_str(declared)
                .map_err(|_| declared.to_owned())
        })
    }

    /// Attaches the signature produced by the signing binding element.
    ///
    /// Writes both the signature method and the signature value without
    /// triggering staleness stripping.
    pub(crate) fn attach_signature(&mut self, method: &str, signature: &str) {
        self.set_raw(constants::SIGNATURE_METHOD, method);
        self.set_raw(constants::SIGNATURE, signature);
    }

    /// Removes an attached signature when a signed field changes.
    ///
    /// Transport-only fields are not part of the signature base, so mutating
    /// them cannot make an attached signature stale.
    fn invalidate_signature(&mut self, changed_field: &str) {
        if changed_field != constants::SIGNATURE
            && !constants::TRANSPORT_ONLY_FIELDS.contains(&changed_field)
        {
            self.fields.retain(|(k, _)| k != constants::SIGNATURE);
        }
    }

    fn set_raw(&mut self, name: &str, value: &str) {
        match self.fields.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_owned(),
            None => self.fields.push((name.to_owned(), value.to_owned())),
        }
    }
}

impl FromIterator<(String, String)> for ProtocolMessage {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        ProtocolMessage {
            fields: iter.into_iter().collect(),
        }
    }
}
