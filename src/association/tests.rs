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

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::association::{Association, AssociationConfig, AssociationStore};
use crate::error::AssociationError;
use crate::sign::{CryptoBackend, KeyMaterial, SharedSecret, SignatureAlgorithm};

#[cfg(feature = "rustcrypto")]
use crate::common::test_helper::rustcrypto_ctx;
#[cfg(feature = "openssl")]
use crate::common::test_helper::openssl_ctx;

use rstest::rstest;

fn hmac_config(lifetime: Duration) -> AssociationConfig {
    AssociationConfig::builder()
        .key(SharedSecret::new("consumerSecret", None))
        .algorithm(SignatureAlgorithm::HmacSha1)
        .lifetime(lifetime)
        .build()
        .unwrap()
}

fn sample_association(handle: &str, expires_at: SystemTime) -> Association {
    Association::new(
        handle.to_string(),
        KeyMaterial::Symmetric(SharedSecret::new("cs", None)),
        SignatureAlgorithm::HmacSha256,
        SystemTime::UNIX_EPOCH,
        expires_at,
    )
}

#[test]
fn builder_requires_key_and_algorithm() {
    assert!(AssociationConfig::builder().build().is_err());
    assert!(AssociationConfig::builder()
        .key(SharedSecret::new("cs", None))
        .build()
        .is_err());
}

#[test]
fn builder_rejects_zero_lifetime() {
    assert!(AssociationConfig::builder()
        .key(SharedSecret::new("cs", None))
        .algorithm(SignatureAlgorithm::HmacSha1)
        .lifetime(Duration::ZERO)
        .build()
        .is_err());
}

#[test]
fn builder_defaults_the_lifetime() {
    let config = AssociationConfig::builder()
        .key(SharedSecret::new("cs", None))
        .algorithm(SignatureAlgorithm::HmacSha1)
        .build()
        .unwrap();
    assert_eq!(config.lifetime, Duration::from_secs(3600));
}

#[rstest]
#[cfg_attr(feature = "openssl", case::openssl(openssl_ctx()))]
#[cfg_attr(feature = "rustcrypto", case::rustcrypto(rustcrypto_ctx()))]
fn created_associations_get_distinct_handles<B: CryptoBackend>(#[case] mut backend: B) {
    let store = AssociationStore::new();
    let first = store
        .create(&mut backend, hmac_config(Duration::from_secs(60)))
        .unwrap();
    let second = store
        .create(&mut backend, hmac_config(Duration::from_secs(60)))
        .unwrap();
    assert_ne!(first.handle(), second.handle());
    // 16 random bytes, base64url without padding.
    assert_eq!(first.handle().len(), 22);
    assert_eq!(store.len(), 2);
    assert_eq!(
        store.lookup(first.handle()).unwrap().as_ref(),
        first.as_ref()
    );
}

#[rstest]
#[cfg_attr(feature = "openssl", case::openssl(openssl_ctx()))]
#[cfg_attr(feature = "rustcrypto", case::rustcrypto(rustcrypto_ctx()))]
fn created_association_expires_after_lifetime<B: CryptoBackend>(#[case] mut backend: B) {
    let store = AssociationStore::new();
    let association = store
        .create(&mut backend, hmac_config(Duration::from_secs(60)))
        .unwrap();
    assert_eq!(
        association.expires_at(),
        association.issued_at() + Duration::from_secs(60)
    );
    assert!(store.lookup_valid(association.handle(), SystemTime::now()).is_ok());
}

#[test]
fn expiry_is_inclusive_at_the_boundary() {
    let expires_at = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
    let association = sample_association("h", expires_at);
    assert!(!association.is_expired(expires_at - Duration::from_secs(1)));
    assert!(association.is_expired(expires_at));
    assert!(association.is_expired(expires_at + Duration::from_secs(1)));
}

#[test]
fn lookup_of_unknown_handle_fails() {
    let store = AssociationStore::new();
    assert_eq!(store.lookup("nope"), None);
    assert_eq!(
        store.lookup_valid("nope", SystemTime::now()),
        Err(AssociationError::NotFound("nope".to_string()))
    );
}

#[test]
fn expired_associations_are_distinguishable_from_unknown_ones() {
    let store = AssociationStore::new();
    let expires_at = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
    store.insert(sample_association("stale", expires_at)).unwrap();

    // Still resolvable without validity check.
    assert!(store.lookup("stale").is_some());
    assert_eq!(
        store.lookup_valid("stale", expires_at + Duration::from_secs(1)),
        Err(AssociationError::Expired {
            handle: "stale".to_string(),
            expired_at: expires_at,
        })
    );
}

#[test]
fn inserting_a_duplicate_handle_fails() {
    let store = AssociationStore::new();
    let expires_at = SystemTime::now() + Duration::from_secs(60);
    store.insert(sample_association("dup", expires_at)).unwrap();
    assert_eq!(
        store.insert(sample_association("dup", expires_at)),
        Err(AssociationError::DuplicateHandle("dup".to_string()))
    );
    assert_eq!(store.len(), 1);
}

#[test]
fn remove_expired_drops_only_stale_entries() {
    let store = AssociationStore::new();
    let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1000);
    store
        .insert(sample_association("stale", now - Duration::from_secs(1)))
        .unwrap();
    store
        .insert(sample_association("fresh", now + Duration::from_secs(1)))
        .unwrap();

    assert_eq!(store.remove_expired(now), 1);
    assert_eq!(store.len(), 1);
    assert!(store.lookup("stale").is_none());
    assert!(store.lookup("fresh").is_some());
    assert_eq!(store.remove_expired(now), 0);
}

#[test]
fn association_serde_round_trip() {
    let expires_at = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
    let association = sample_association("handle", expires_at);
    let json = serde_json::to_string(&association).unwrap();
    assert_eq!(
        serde_json::from_str::<Association>(&json).unwrap(),
        association
    );
}

#[test]
fn store_is_shareable_across_threads() {
    let store = Arc::new(AssociationStore::new());
    let expires_at = SystemTime::now() + Duration::from_secs(60);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                store
                    .insert(sample_association(&format!("handle-{i}"), expires_at))
                    .unwrap();
                store.lookup(&format!("handle-{i}")).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(store.len(), 8);
}
