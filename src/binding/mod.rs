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

//! Binding elements and the processing pipeline tying them together.
//!
//! A [`BindingElement`] is one message-processing stage: it sees every
//! outgoing message before transmission and every incoming message before the
//! application does. Stages consume and return the message, so a stage can
//! never hold an alias into a message another stage is rewriting.
//!
//! [`SigningBindingElement`] is the stage this crate is about: it attaches a
//! signature on the way out and enforces one on the way in. A [`Pipeline`]
//! composes stages so that the signing element runs last on send (its
//! signature covers whatever earlier stages contributed) and first on
//! receive (nothing downstream sees an unverified message).

use std::sync::Arc;
use std::time::SystemTime;

use base64::prelude::{Engine, BASE64_STANDARD};

use crate::association::AssociationStore;
use crate::base::build_signature_base;
use crate::common::constants;
use crate::common::message::{MessageContext, ProtocolMessage};
use crate::error::BindingError;
use crate::sign::{
    sign_base, verify_base, CryptoBackend, KeyMaterial, MacCryptoBackend, RsaKeypair,
    SignCryptoBackend, SignatureAlgorithm,
};


/// One stage of message processing, invoked for every outgoing and every
/// incoming message.
pub trait BindingElement<B: CryptoBackend> {
    /// Processes `message` before it is sent to `context`'s recipient.
    ///
    /// # Errors
    ///
    /// Returns a [`BindingError`] if the message cannot be prepared for
    /// sending; the message must then not be transmitted.
    fn apply_outgoing(
        &self,
        backend: &mut B,
        message: ProtocolMessage,
        context: &MessageContext,
    ) -> Result<ProtocolMessage, BindingError<B::Error>>;

    /// Checks `message`, which arrived via `context`, before the application
    /// gets to see it.
    ///
    /// # Errors
    ///
    /// Returns a [`BindingError`] if the message fails the check; the caller
    /// must discard the message.
    fn verify_incoming(
        &self,
        backend: &mut B,
        message: ProtocolMessage,
        context: &MessageContext,
    ) -> Result<ProtocolMessage, BindingError<B::Error>>;
}

/// The binding element that signs outgoing messages and verifies the
/// signatures of incoming ones.
///
/// Key material is resolved per message: if the message references an
/// association (through its handle field), the element looks it up in the
/// shared [`AssociationStore`] and uses the association's key and algorithm;
/// otherwise the element falls back to its directly configured RSA key, if
/// any. A message that resolves to neither is rejected.
///
/// Use [`SigningBindingElement::new`] for the common store-only setup or
/// [`SigningBindingElement::builder`] to configure a direct key or a
/// different default algorithm:
///
/// ```
/// use std::sync::Arc;
/// use sigbind::{AssociationStore, SignatureAlgorithm, SigningBindingElement};
///
/// let store = Arc::new(AssociationStore::new());
/// let signing = SigningBindingElement::builder()
///     .store(Arc::clone(&store))
///     .default_algorithm(SignatureAlgorithm::HmacSha256)
///     .build()?;
/// # Ok::<(), sigbind::binding::SigningBindingElementBuilderError>(())
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), derive(Debug))]
pub struct SigningBindingElement {
    /// Store resolving association handles to key material.
    store: Arc<AssociationStore>,

    /// Algorithm used when a message neither declares a signature method nor
    /// references an association carrying one.
    #[builder(default = "SignatureAlgorithm::HmacSha1")]
    default_algorithm: SignatureAlgorithm,

    /// RSA key used for messages that reference no association. `None` means
    /// such messages are rejected.
    #[builder(setter(strip_option), default)]
    direct_key: Option<RsaKeypair>,
}

mod builder {
    use super::*;

    impl SigningBindingElement {
        /// Creates a signing element resolving all key material through
        /// `store`, with no direct key.
        #[must_use]
        pub fn new(store: Arc<AssociationStore>) -> SigningBindingElement {
            SigningBindingElement {
                store,
                default_algorithm: SignatureAlgorithm::HmacSha1,
                direct_key: None,
            }
        }

        /// Returns a new builder for this struct.
        #[must_use]
        pub fn builder() -> SigningBindingElementBuilder {
            SigningBindingElementBuilder::default()
        }
    }
}

/// Key material and algorithm resolved for one particular message.
struct ResolvedSigner {
    key: KeyMaterial,
    algorithm: SignatureAlgorithm,
}

impl SigningBindingElement {
    /// Parses the message's declared signature method, mapping unknown names
    /// to [`BindingError::UnsupportedAlgorithm`].
    fn declared_algorithm<OE: core::fmt::Display>(
        message: &ProtocolMessage,
    ) -> Result<Option<SignatureAlgorithm>, BindingError<OE>> {
        match message.declared_algorithm() {
            None => Ok(None),
            Some(Ok(algorithm)) => Ok(Some(algorithm)),
            Some(Err(declared)) => Err(BindingError::UnsupportedAlgorithm(declared)),
        }
    }

    /// Resolves the key material and algorithm to use for `message`.
    ///
    /// `declared` is the message's already-parsed signature method field. A
    /// declared method that contradicts the association's negotiated
    /// algorithm is an [`BindingError::AlgorithmMismatch`]; there is no
    /// silent fallback from one algorithm to another.
    fn resolve_signer<OE: core::fmt::Display>(
        &self,
        message: &ProtocolMessage,
        declared: Option<SignatureAlgorithm>,
        now: SystemTime,
    ) -> Result<ResolvedSigner, BindingError<OE>> {
        if let Some(handle) = message.association_handle() {
            let association = self.store.lookup_valid(handle, now)?;
            let algorithm = association.algorithm();
            if let Some(declared) = declared {
                if declared != algorithm {
                    return Err(BindingError::AlgorithmMismatch {
                        declared,
                        expected: algorithm,
                    });
                }
            }
            return Ok(ResolvedSigner {
                key: association.key().clone(),
                algorithm,
            });
        }
        if let Some(key) = &self.direct_key {
            return Ok(ResolvedSigner {
                key: KeyMaterial::Rsa(key.clone()),
                algorithm: declared.unwrap_or(self.default_algorithm),
            });
        }
        Err(BindingError::MalformedMessage(
            "message references no association and no direct key is configured".to_string(),
        ))
    }
}

impl<B> BindingElement<B> for SigningBindingElement
where
    B: MacCryptoBackend + SignCryptoBackend,
{
    fn apply_outgoing(
        &self,
        backend: &mut B,
        mut message: ProtocolMessage,
        context: &MessageContext,
    ) -> Result<ProtocolMessage, BindingError<B::Error>> {
        let declared = Self::declared_algorithm::<B::Error>(&message)?;
        let signer = self.resolve_signer::<B::Error>(&message, declared, SystemTime::now())?;

        // The method declaration is itself a signed field, so it has to be in
        // place before the base is built.
        let method = signer.algorithm.to_string();
        message.set(constants::SIGNATURE_METHOD, method.as_str());

        let base = build_signature_base(context.method, &context.recipient, &message)?;
        let signature = sign_base(backend, signer.algorithm, &signer.key, &base)?;
        message.attach_signature(&method, &BASE64_STANDARD.encode(signature));
        Ok(message)
    }

    fn verify_incoming(
        &self,
        backend: &mut B,
        message: ProtocolMessage,
        context: &MessageContext,
    ) -> Result<ProtocolMessage, BindingError<B::Error>> {
        let Some(signature) = message.signature() else {
            return Err(BindingError::MalformedMessage(
                "message carries no signature".to_string(),
            ));
        };
        let declared = Self::declared_algorithm::<B::Error>(&message)?.ok_or_else(|| {
            BindingError::MalformedMessage(
                "signed message declares no signature method".to_string(),
            )
        })?;
        let signer = self.resolve_signer::<B::Error>(&message, Some(declared), SystemTime::now())?;

        // Undecodable signatures get the same answer as wrong ones.
        let signature = BASE64_STANDARD
            .decode(signature)
            .map_err(|_| BindingError::InvalidSignature)?;

        // Method and recipient come from the transport's view of the request
        // in `context`, never from message content.
        let base = build_signature_base(context.method, &context.recipient, &message)?;
        verify_base(backend, signer.algorithm, &signer.key, &signature, &base)?;
        Ok(message)
    }
}

/// An ordered sequence of binding elements applied to every message.
///
/// Outgoing messages pass the elements in declared order, incoming messages
/// in reverse, so that each element sees incoming messages in the same state
/// in which it left outgoing ones.
pub struct Pipeline<B: CryptoBackend> {
    elements: Vec<Box<dyn BindingElement<B>>>,
}

impl<B: CryptoBackend> Pipeline<B> {
    /// Creates a pipeline from `elements`, applied in the given order to
    /// outgoing messages.
    #[must_use]
    pub fn new(elements: Vec<Box<dyn BindingElement<B>>>) -> Pipeline<B> {
        Pipeline { elements }
    }

    /// Creates a pipeline of `content_elements` with `signing` appended as
    /// the final stage, making the signature cover every field the content
    /// elements contributed and run before any of them on receive.
    #[must_use]
    pub fn with_signing(
        mut content_elements: Vec<Box<dyn BindingElement<B>>>,
        signing: SigningBindingElement,
    ) -> Pipeline<B>
    where
        B: MacCryptoBackend + SignCryptoBackend + 'static,
    {
        content_elements.push(Box::new(signing));
        Pipeline {
            elements: content_elements,
        }
    }

    /// Passes `message` through all elements in declared order, as done
    /// before sending.
    ///
    /// # Errors
    ///
    /// Propagates the first element failure; the message must then not be
    /// sent.
    pub fn process_outgoing(
        &self,
        backend: &mut B,
        mut message: ProtocolMessage,
        context: &MessageContext,
    ) -> Result<ProtocolMessage, BindingError<B::Error>> {
        for element in &self.elements {
            message = element.apply_outgoing(backend, message, context)?;
        }
        Ok(message)
    }

    /// Passes `message` through all elements in reverse order, as done after
    /// receiving.
    ///
    /// # Errors
    ///
    /// Propagates the first element failure; the caller must discard the
    /// message.
    pub fn process_incoming(
        &self,
        backend: &mut B,
        message: ProtocolMessage,
        context: &MessageContext,
    ) -> Result<ProtocolMessage, BindingError<B::Error>> {
        self.process_incoming_with(backend, message, context, |_| {})
    }

    /// Like [`process_incoming`](Self::process_incoming), but first runs
    /// `hook` on the raw message.
    ///
    /// The hook exists for initializing fields that are not part of the
    /// serialized message, such as transport-only fields the receiving
    /// endpoint derives from the request itself. Verification stays a pure
    /// function of the (possibly hooked) message and the context.
    ///
    /// # Errors
    ///
    /// As for [`process_incoming`](Self::process_incoming).
    pub fn process_incoming_with<F>(
        &self,
        backend: &mut B,
        mut message: ProtocolMessage,
        context: &MessageContext,
        hook: F,
    ) -> Result<ProtocolMessage, BindingError<B::Error>>
    where
        F: FnOnce(&mut ProtocolMessage),
    {
        hook(&mut message);
        for element in self.elements.iter().rev() {
            message = element.verify_incoming(backend, message, context)?;
        }
        Ok(message)
    }
}
