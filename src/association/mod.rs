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

//! Associations, the shared state established between two protocol parties,
//! and the in-memory store that keeps them by handle.
//!
//! An [`Association`] binds an opaque handle to key material, an algorithm
//! tag and an expiry time. The issuing party creates one through
//! [`AssociationStore::create`] and transmits the handle (never the key) to
//! its peer over the protocol's establishment exchange; the receiving party
//! stores the same association under the same handle via
//! [`AssociationStore::insert`]. From then on either side resolves handles
//! carried on messages back to signing keys through the store.
//!
//! Associations are immutable once created. Renewal is a new establishment
//! exchange producing a fresh handle, never a mutation of an existing entry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime};

use base64::prelude::{Engine, BASE64_URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::error::{AssociationError, BindingError};
use crate::sign::{CryptoBackend, KeyMaterial, SignatureAlgorithm};

#[cfg(test)]
mod tests;

/// Number of random bytes in a generated association handle. Encoded, this
/// yields a 22 character handle, comfortably unguessable.
const HANDLE_RANDOM_BYTES: usize = 16;

/// Shared state between two protocol parties: an opaque handle bound to key
/// material, a signature algorithm and an expiry time.
///
/// Instances are created through [`AssociationStore::create`] (issuing side)
/// or [`Association::new`] followed by [`AssociationStore::insert`]
/// (receiving side) and are immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    handle: String,
    key: KeyMaterial,
    algorithm: SignatureAlgorithm,
    issued_at: SystemTime,
    expires_at: SystemTime,
}

impl Association {
    /// Creates an association from parts received over an establishment
    /// exchange.
    #[must_use]
    pub fn new(
        handle: String,
        key: KeyMaterial,
        algorithm: SignatureAlgorithm,
        issued_at: SystemTime,
        expires_at: SystemTime,
    ) -> Association {
        Association {
            handle,
            key,
            algorithm,
            issued_at,
            expires_at,
        }
    }

    /// The opaque handle identifying this association on the wire.
    #[must_use]
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// The key material both parties sign and verify with.
    #[must_use]
    pub fn key(&self) -> &KeyMaterial {
        &self.key
    }

    /// The signature algorithm fixed at establishment time.
    #[must_use]
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// The instant this association was established.
    #[must_use]
    pub fn issued_at(&self) -> SystemTime {
        self.issued_at
    }

    /// The instant this association stops being usable.
    #[must_use]
    pub fn expires_at(&self) -> SystemTime {
        self.expires_at
    }

    /// Whether this association has expired at instant `now`.
    ///
    /// Expiry is inclusive: an association is already expired at exactly
    /// its expiry instant.
    #[must_use]
    pub fn is_expired(&self, now: SystemTime) -> bool {
        now >= self.expires_at
    }
}

/// Parameters for establishing a new association through
/// [`AssociationStore::create`].
///
/// Use [`AssociationConfig::builder`] to construct:
///
/// ```
/// use std::time::Duration;
/// use sigbind::{AssociationConfig, SharedSecret, SignatureAlgorithm};
///
/// let config = AssociationConfig::builder()
///     .key(SharedSecret::new("consumerSecret", None))
///     .algorithm(SignatureAlgorithm::HmacSha256)
///     .lifetime(Duration::from_secs(3600))
///     .build()?;
/// # Ok::<(), sigbind::association::AssociationConfigBuilderError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    setter(into),
    derive(Debug, PartialEq),
    build_fn(validate = "Self::validate")
)]
pub struct AssociationConfig {
    /// Key material the association will sign and verify with.
    pub key: KeyMaterial,

    /// Signature algorithm of the association, fixed for its whole lifetime.
    pub algorithm: SignatureAlgorithm,

    /// How long the association stays valid after establishment.
    #[builder(default = "Duration::from_secs(3600)")]
    pub lifetime: Duration,
}

mod builder {
    use super::*;

    impl AssociationConfig {
        /// Returns a new builder for this struct.
        #[must_use]
        pub fn builder() -> AssociationConfigBuilder {
            AssociationConfigBuilder::default()
        }
    }

    impl AssociationConfigBuilder {
        /// Validates this builder's fields for correctness.
        pub(crate) fn validate(&self) -> Result<(), AssociationConfigBuilderError> {
            if let Some(lifetime) = &self.lifetime {
                if lifetime.is_zero() {
                    return Err(AssociationConfigBuilderError::ValidationError(
                        "association lifetime must not be zero".to_string(),
                    ));
                }
            }
            Ok(())
        }
    }
}

/// Thread-safe in-memory store of [`Association`]s, keyed by handle.
///
/// The store is shared between binding elements via [`Arc`]; all methods
/// take `&self`.
#[derive(Debug, Default)]
pub struct AssociationStore {
    associations: RwLock<HashMap<String, Arc<Association>>>,
}

impl AssociationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> AssociationStore {
        AssociationStore::default()
    }

    /// Establishes a new association from `config`, generating a fresh
    /// unique handle with `backend` and stamping issue and expiry times
    /// relative to the current system clock.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::Other`] if the backend fails to produce
    /// random bytes for the handle.
    pub fn create<B: CryptoBackend>(
        &self,
        backend: &mut B,
        config: AssociationConfig,
    ) -> Result<Arc<Association>, BindingError<B::Error>> {
        let now = SystemTime::now();
        let mut associations = self
            .associations
            .write()
            .expect("association store lock poisoned");
        let handle = loop {
            let mut raw = [0u8; HANDLE_RANDOM_BYTES];
            backend
                .generate_rand(&mut raw)
                .map_err(BindingError::Other)?;
            let handle = BASE64_URL_SAFE_NO_PAD.encode(raw);
            if !associations.contains_key(&handle) {
                break handle;
            }
        };
        let association = Arc::new(Association {
            handle: handle.clone(),
            key: config.key,
            algorithm: config.algorithm,
            issued_at: now,
            expires_at: now + config.lifetime,
        });
        associations.insert(handle, Arc::clone(&association));
        Ok(association)
    }

    /// Stores an association received from a peer under its existing handle.
    ///
    /// # Errors
    ///
    /// Returns [`AssociationError::DuplicateHandle`] if an association with
    /// the same handle is already present. Entries are never silently
    /// replaced; a handle collision with different key material would let
    /// one association's signatures verify against another's key.
    pub fn insert(&self, association: Association) -> Result<Arc<Association>, AssociationError> {
        let mut associations = self
            .associations
            .write()
            .expect("association store lock poisoned");
        if associations.contains_key(&association.handle) {
            return Err(AssociationError::DuplicateHandle(association.handle));
        }
        let association = Arc::new(association);
        associations.insert(association.handle.clone(), Arc::clone(&association));
        Ok(association)
    }

    /// Looks up an association by handle, regardless of expiry.
    #[must_use]
    pub fn lookup(&self, handle: &str) -> Option<Arc<Association>> {
        self.associations
            .read()
            .expect("association store lock poisoned")
            .get(handle)
            .cloned()
    }

    /// Looks up an association by handle and checks it is still valid at
    /// instant `now`.
    ///
    /// # Errors
    ///
    /// [`AssociationError::NotFound`] for unknown handles,
    /// [`AssociationError::Expired`] for known but expired ones. The two
    /// cases are kept distinct so that callers can trigger re-establishment
    /// only where it can help.
    pub fn lookup_valid(
        &self,
        handle: &str,
        now: SystemTime,
    ) -> Result<Arc<Association>, AssociationError> {
        let association = self
            .lookup(handle)
            .ok_or_else(|| AssociationError::NotFound(handle.to_string()))?;
        if association.is_expired(now) {
            return Err(AssociationError::Expired {
                handle: handle.to_string(),
                expired_at: association.expires_at,
            });
        }
        Ok(association)
    }

    /// Removes all associations expired at instant `now`, returning how
    /// many were dropped.
    pub fn remove_expired(&self, now: SystemTime) -> usize {
        let mut associations = self
            .associations
            .write()
            .expect("association store lock poisoned");
        let before = associations.len();
        associations.retain(|_, association| !association.is_expired(now));
        before - associations.len()
    }

    /// Number of associations currently stored, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.associations
            .read()
            .expect("association store lock poisoned")
            .len()
    }

    /// Whether the store holds no associations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
