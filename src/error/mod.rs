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

//! This module contains common error types used across this crate.
//!
//! All failures of the boundary operations (signing, verification, association
//! management) are returned as values of these types; nothing security
//! relevant is ever reported through panics, and a failed verification is
//! never downgraded to a warning.

use core::fmt::{Display, Formatter};
use std::time::SystemTime;

use crate::sign::SignatureAlgorithm;

/// Error type used when a recipient URL cannot be normalized for the
/// signature base (e.g. it has no host).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedUriError {
    /// The URI that could not be normalized.
    uri: String,

    /// Why normalization failed.
    reason: &'static str,
}

impl MalformedUriError {
    /// Creates a new instance of the error for the given `uri`, with `reason`
    /// describing why it could not be normalized.
    pub fn new<T>(uri: T, reason: &'static str) -> MalformedUriError
    where
        T: Into<String>,
    {
        MalformedUriError {
            uri: uri.into(),
            reason,
        }
    }
}

impl Display for MalformedUriError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "recipient URL '{}' is malformed: {}", self.uri, self.reason)
    }
}

/// Error type used when an association cannot be resolved or stored.
///
/// [`NotFound`](AssociationError::NotFound) and
/// [`Expired`](AssociationError::Expired) are deliberately distinct *in
/// detail only*: both make a message untrustworthy and both surface as
/// [`BindingError::UnknownAssociation`] at the binding boundary, so callers
/// cannot accidentally branch on the difference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationError {
    /// No association with the given handle exists in the store.
    NotFound(String),
    /// The association exists but its lifetime has elapsed.
    ///
    /// Expired associations must not sign new messages and must not be
    /// trusted for verification; this variant exists so diagnostics can tell
    /// "never existed" from "no longer valid".
    Expired {
        /// Handle of the expired association.
        handle: String,
        /// The instant the association expired.
        expired_at: SystemTime,
    },
    /// An association with the given handle already exists.
    ///
    /// The store is insert-only: rotation creates a new association under a
    /// new handle, it never replaces key material in place.
    DuplicateHandle(String),
}

impl Display for AssociationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            AssociationError::NotFound(handle) => {
                write!(f, "no association with handle '{handle}'")
            }
            AssociationError::Expired { handle, expired_at } => {
                write!(f, "association '{handle}' expired at {expired_at:?}")
            }
            AssociationError::DuplicateHandle(handle) => {
                write!(f, "an association with handle '{handle}' already exists")
            }
        }
    }
}

/// Error type used when a binding element fails to process a message, generic
/// over the error type `OE` of the crypto backend in use.
///
/// A message that produced any of these errors must be discarded by the
/// caller; in particular it must never be handed to business logic as if it
/// were unsigned-but-trusted, and must never be retried with a different
/// algorithm.
#[derive(Debug)]
#[non_exhaustive]
pub enum BindingError<OE: Display> {
    /// The recipient URL could not be normalized.
    MalformedUri(MalformedUriError),
    /// The message is structurally unfit for the attempted operation
    /// (e.g. a required well-known field is missing).
    MalformedMessage(String),
    /// The association referenced by the message is absent or expired.
    UnknownAssociation(AssociationError),
    /// The message declares a signature method this crate (or the active
    /// backend) does not implement. The message is rejected; there is no
    /// fallback to a different algorithm.
    UnsupportedAlgorithm(String),
    /// The message declares a signature method that contradicts the
    /// algorithm tag of the association it references.
    AlgorithmMismatch {
        /// The method declared on the message.
        declared: SignatureAlgorithm,
        /// The algorithm the association was negotiated with.
        expected: SignatureAlgorithm,
    },
    /// Local key material is corrupt or does not fit the requested
    /// algorithm family. Typically a startup-time configuration problem.
    KeyFormat(String),
    /// Signing was attempted without the private half of an asymmetric
    /// keypair. Verifying parties hold the public half only and must use the
    /// verification operation instead.
    KeyUnavailable,
    /// The signature did not verify.
    ///
    /// This is the normal "attack or corruption" outcome. Its [`Display`]
    /// output is deliberately generic: an external observer must not be able
    /// to learn *why* verification failed.
    InvalidSignature,
    /// A backend-specific error occurred.
    ///
    /// Details are contained in this field using the error type of the
    /// backend.
    Other(OE),
}

impl<OE: Display> Display for BindingError<OE> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            BindingError::MalformedUri(e) => write!(f, "{e}"),
            BindingError::MalformedMessage(e) => write!(f, "malformed message: {e}"),
            BindingError::UnknownAssociation(e) => {
                write!(f, "cannot resolve association: {e}")
            }
            BindingError::UnsupportedAlgorithm(alg) => {
                write!(f, "unsupported signature method '{alg}'")
            }
            BindingError::AlgorithmMismatch { declared, expected } => write!(
                f,
                "declared signature method {declared} does not match association algorithm {expected}"
            ),
            BindingError::KeyFormat(e) => write!(f, "invalid key material: {e}"),
            BindingError::KeyUnavailable => {
                write!(f, "no private key available for signing")
            }
            BindingError::InvalidSignature => write!(f, "signature verification failed"),
            BindingError::Other(e) => write!(f, "{e}"),
        }
    }
}

impl<OE: Display> From<MalformedUriError> for BindingError<OE> {
    fn from(value: MalformedUriError) -> Self {
        BindingError::MalformedUri(value)
    }
}

impl<OE: Display> From<AssociationError> for BindingError<OE> {
    fn from(value: AssociationError) -> Self {
        BindingError::UnknownAssociation(value)
    }
}

mod std_error {
    use core::fmt::Debug;
    use std::error::Error;

    use super::*;

    impl Error for MalformedUriError {}

    impl Error for AssociationError {}

    impl<OE: Display + Debug> Error for BindingError<OE> {}
}
