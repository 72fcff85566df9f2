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

//! Two-party scenario: a relying party and a provider establish an
//! association out of band, then exchange signed messages over a pseudo
//! transport.

#![cfg(feature = "openssl")]

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use sigbind::crypto_impl::openssl::OpensslContext;
use sigbind::error::BindingError;
use sigbind::{
    Association, AssociationConfig, AssociationStore, HttpMethod, MessageContext, Pipeline,
    ProtocolMessage, SharedSecret, SignatureAlgorithm, SigningBindingElement,
};

/// Serializes and deserializes `input`, mimicking an actual transmission
/// across the wire.
fn pseudo_send_receive(input: &ProtocolMessage) -> ProtocolMessage {
    let serialized = serde_json::to_vec(input).expect("couldn't serialize message");
    serde_json::from_slice(&serialized).expect("couldn't deserialize message")
}

/// One protocol party: its own association store and signing pipeline over a
/// shared backend.
struct Party {
    backend: OpensslContext,
    store: Arc<AssociationStore>,
    pipeline: Pipeline<OpensslContext>,
}

impl Party {
    fn new() -> Party {
        let store = Arc::new(AssociationStore::new());
        let pipeline = Pipeline::with_signing(
            Vec::new(),
            SigningBindingElement::new(Arc::clone(&store)),
        );
        Party {
            backend: OpensslContext::new(),
            store,
            pipeline,
        }
    }
}

#[test]
fn test_scenario() {
    let mut provider = Party::new();
    let mut relying_party = Party::new();

    // The provider establishes an association and hands the relying party a
    // copy (handle, key, algorithm, expiry) via the establishment exchange.
    let association = provider
        .store
        .create(
            &mut provider.backend,
            AssociationConfig::builder()
                .key(SharedSecret::new("consumerSecret", Some("tokenSecret".to_string())))
                .algorithm(SignatureAlgorithm::HmacSha256)
                .lifetime(Duration::from_secs(3600))
                .build()
                .expect("invalid association config"),
        )
        .expect("association creation failed");
    relying_party
        .store
        .insert(Association::clone(&association))
        .expect("duplicate handle on fresh store");

    // The relying party signs a checkid-style request and sends it.
    let endpoint = MessageContext::new(
        HttpMethod::Post,
        "https://op.example/endpoint".parse().unwrap(),
    );
    let mut request = ProtocolMessage::new();
    request.set("oauth_token", association.handle());
    request.set("mode", "checkid_setup");
    request.set("return_to", "https://rp.example/finish");

    let signed = relying_party
        .pipeline
        .process_outgoing(&mut relying_party.backend, request, &endpoint)
        .expect("signing failed");
    assert!(signed.is_signed());

    // The provider receives and verifies it against its own store.
    let received = pseudo_send_receive(&signed);
    let verified = provider
        .pipeline
        .process_incoming(&mut provider.backend, received, &endpoint)
        .expect("verification failed");
    assert_eq!(verified.get("mode"), Some("checkid_setup"));
    assert_eq!(verified.get("return_to"), Some("https://rp.example/finish"));

    // The provider answers with a signed assertion, verified by the relying
    // party in turn.
    let mut response = ProtocolMessage::new();
    response.set("oauth_token", association.handle());
    response.set("mode", "id_res");
    response.set("identity", "https://op.example/user/alice");
    let callback = MessageContext::new(
        HttpMethod::Get,
        "https://rp.example/finish".parse().unwrap(),
    );
    let signed_response = provider
        .pipeline
        .process_outgoing(&mut provider.backend, response, &callback)
        .expect("signing failed");
    let verified_response = relying_party
        .pipeline
        .process_incoming(
            &mut relying_party.backend,
            pseudo_send_receive(&signed_response),
            &callback,
        )
        .expect("verification failed");
    assert_eq!(
        verified_response.get("identity"),
        Some("https://op.example/user/alice")
    );

    // A tampered copy of the request must not verify.
    let mut fields = signed.fields().to_vec();
    for (name, value) in &mut fields {
        if name == "return_to" {
            *value = "https://attacker.example/finish".to_string();
        }
    }
    let tampered = pseudo_send_receive(&ProtocolMessage::from_fields(fields));
    assert!(matches!(
        provider
            .pipeline
            .process_incoming(&mut provider.backend, tampered, &endpoint),
        Err(BindingError::InvalidSignature)
    ));
}

#[test]
fn expired_association_stops_the_exchange() {
    let party = Party::new();
    let mut backend = OpensslContext::new();
    party
        .store
        .insert(Association::new(
            "stale".to_string(),
            SharedSecret::new("consumerSecret", None).into(),
            SignatureAlgorithm::HmacSha1,
            SystemTime::UNIX_EPOCH,
            SystemTime::now() - Duration::from_secs(60),
        ))
        .expect("duplicate handle on fresh store");

    let mut message = ProtocolMessage::new();
    message.set("oauth_token", "stale");
    let context = MessageContext::new(
        HttpMethod::Post,
        "https://op.example/endpoint".parse().unwrap(),
    );
    assert!(matches!(
        party
            .pipeline
            .process_outgoing(&mut backend, message, &context),
        Err(BindingError::UnknownAssociation(_))
    ));

    // Housekeeping drops the stale entry.
    assert_eq!(party.store.remove_expired(SystemTime::now()), 1);
    assert!(party.store.is_empty());
}
