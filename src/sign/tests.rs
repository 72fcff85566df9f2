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

use core::str::FromStr;

use rstest::rstest;

use crate::error::BindingError;
use crate::sign::{
    sign_base, verify_base, AlgorithmFamily, KeyMaterial, MacCryptoBackend, RsaKeypair,
    SharedSecret, SignatureAlgorithm,
};

#[cfg(feature = "rustcrypto")]
use crate::common::test_helper::rustcrypto_ctx;
#[cfg(feature = "openssl")]
use crate::common::test_helper::openssl_ctx;

#[rstest]
#[case(SignatureAlgorithm::HmacSha1, "HMAC-SHA1")]
#[case(SignatureAlgorithm::HmacSha256, "HMAC-SHA256")]
#[case(SignatureAlgorithm::RsaSha1, "RSA-SHA1")]
#[case(SignatureAlgorithm::RsaSha256, "RSA-SHA256")]
fn algorithm_wire_names_round_trip(#[case] alg: SignatureAlgorithm, #[case] name: &str) {
    assert_eq!(alg.to_string(), name);
    assert_eq!(SignatureAlgorithm::from_str(name).unwrap(), alg);
}

#[test]
fn unknown_wire_name_is_rejected() {
    assert!(SignatureAlgorithm::from_str("PLAINTEXT").is_err());
    assert!(SignatureAlgorithm::from_str("hmac-sha1").is_err());
}

#[rstest]
#[case(SignatureAlgorithm::HmacSha1, AlgorithmFamily::Mac)]
#[case(SignatureAlgorithm::HmacSha256, AlgorithmFamily::Mac)]
#[case(SignatureAlgorithm::RsaSha1, AlgorithmFamily::Sign)]
#[case(SignatureAlgorithm::RsaSha256, AlgorithmFamily::Sign)]
fn algorithm_family_mapping(#[case] alg: SignatureAlgorithm, #[case] family: AlgorithmFamily) {
    assert_eq!(alg.family(), family);
}

#[rstest]
#[case("consumerSecret", None, b"consumerSecret&")]
#[case("ab&c", Some("x y"), b"ab%26c&x%20y")]
#[case("", None, b"&")]
fn shared_secret_key_bytes(
    #[case] consumer: &str,
    #[case] token: Option<&str>,
    #[case] expected: &[u8],
) {
    let secret = SharedSecret::new(consumer, token.map(String::from));
    assert_eq!(secret.key_bytes(), expected);
}

#[test]
fn secrets_are_redacted_in_debug_output() {
    let secret = SharedSecret::new("hunter2", Some("hunter3".to_string()));
    let output = format!("{secret:?}");
    assert!(!output.contains("hunter2"));
    assert!(!output.contains("hunter3"));

    let keypair = RsaKeypair::with_private(vec![0x30, 0x82], vec![0x30, 0x82, 0x04]);
    let output = format!("{keypair:?}");
    assert!(!output.contains("48"), "DER bytes leaked: {output}");
}

#[test]
fn key_material_serde_round_trip() {
    let key = KeyMaterial::Symmetric(SharedSecret::new("cs", Some("ts".to_string())));
    let json = serde_json::to_string(&key).unwrap();
    assert_eq!(serde_json::from_str::<KeyMaterial>(&json).unwrap(), key);

    let key = KeyMaterial::Rsa(RsaKeypair::public_only(vec![0x30, 0x0a]));
    let json = serde_json::to_string(&key).unwrap();
    assert_eq!(serde_json::from_str::<KeyMaterial>(&json).unwrap(), key);
}

/// HMAC vector over the signature base of the crate documentation example,
/// keyed by `consumerSecret&`.
#[rstest]
#[cfg_attr(feature = "openssl", case::openssl(openssl_ctx()))]
#[cfg_attr(feature = "rustcrypto", case::rustcrypto(rustcrypto_ctx()))]
fn hmac_sha1_matches_fixed_vector<B: MacCryptoBackend>(#[case] mut backend: B) {
    let base: &[u8] =
        b"POST&https%3A%2F%2Fop.example%2Fassoc&oauth_signature_method%3DHMAC-SHA1%26oauth_token%3Dabc";
    let key = SharedSecret::new("consumerSecret", None).key_bytes();
    let tag = backend
        .compute_hmac(SignatureAlgorithm::HmacSha1, &key, base)
        .unwrap();
    assert_eq!(
        hex::encode(&tag),
        "78c84c7e8e87b18bd4dc5908b35c5f171ee45111"
    );
    backend
        .verify_hmac(SignatureAlgorithm::HmacSha1, &key, &tag, base)
        .unwrap();

    // Dropping the trailing separator of the absent token secret yields a
    // different key, so verification must fail.
    assert!(matches!(
        backend.verify_hmac(SignatureAlgorithm::HmacSha1, b"consumerSecret", &tag, base),
        Err(BindingError::InvalidSignature)
    ));
}

#[rstest]
#[cfg_attr(feature = "openssl", case::openssl(openssl_ctx()))]
#[cfg_attr(feature = "rustcrypto", case::rustcrypto(rustcrypto_ctx()))]
fn hmac_sha256_matches_fixed_vector<B: MacCryptoBackend>(#[case] mut backend: B) {
    let base: &[u8] =
        b"POST&https%3A%2F%2Fop.example%2Fassoc&oauth_signature_method%3DHMAC-SHA1%26oauth_token%3Dabc";
    let key = SharedSecret::new("consumerSecret", None).key_bytes();
    let tag = backend
        .compute_hmac(SignatureAlgorithm::HmacSha256, &key, base)
        .unwrap();
    assert_eq!(
        hex::encode(&tag),
        "2b06f1c282b846202b4bdb6ec4923976c1ece26855d8f4b4048390126015f3f4"
    );
}

#[rstest]
#[cfg_attr(feature = "openssl", case::openssl(openssl_ctx()))]
#[cfg_attr(feature = "rustcrypto", case::rustcrypto(rustcrypto_ctx()))]
fn tampered_hmac_is_rejected<B: MacCryptoBackend>(#[case] mut backend: B) {
    let key = SharedSecret::new("consumerSecret", None).key_bytes();
    let mut tag = backend
        .compute_hmac(SignatureAlgorithm::HmacSha1, &key, b"payload")
        .unwrap();
    tag[0] ^= 0x01;
    assert!(matches!(
        backend.verify_hmac(SignatureAlgorithm::HmacSha1, &key, &tag, b"payload"),
        Err(BindingError::InvalidSignature)
    ));
    // Truncated tags must also fail, not panic.
    let tag = &tag[..tag.len() - 1];
    assert!(matches!(
        backend.verify_hmac(SignatureAlgorithm::HmacSha1, &key, tag, b"payload"),
        Err(BindingError::InvalidSignature)
    ));
}

#[rstest]
#[cfg_attr(feature = "openssl", case::openssl(openssl_ctx()))]
#[cfg_attr(feature = "rustcrypto", case::rustcrypto(rustcrypto_ctx()))]
fn family_mismatch_is_a_key_format_error<B>(#[case] mut backend: B)
where
    B: MacCryptoBackend + crate::sign::SignCryptoBackend,
{
    let key = KeyMaterial::Symmetric(SharedSecret::new("cs", None));
    assert!(matches!(
        sign_base(&mut backend, SignatureAlgorithm::RsaSha1, &key, b"base"),
        Err(BindingError::KeyFormat(_))
    ));
    let key = KeyMaterial::Rsa(RsaKeypair::public_only(vec![0x30]));
    assert!(matches!(
        verify_base(
            &mut backend,
            SignatureAlgorithm::HmacSha1,
            &key,
            b"sig",
            b"base"
        ),
        Err(BindingError::KeyFormat(_))
    ));
}

#[cfg(feature = "openssl")]
mod rsa {
    use super::*;
    use crate::sign::SignCryptoBackend;

    fn generated_keypair() -> RsaKeypair {
        let rsa = openssl::rsa::Rsa::generate(2048).expect("RSA key generation failed");
        RsaKeypair::with_private(
            rsa.public_key_to_der_pkcs1().unwrap(),
            rsa.private_key_to_der().unwrap(),
        )
    }

    #[rstest]
    #[case(SignatureAlgorithm::RsaSha1)]
    #[case(SignatureAlgorithm::RsaSha256)]
    fn rsa_sign_verify_round_trip(#[case] alg: SignatureAlgorithm) {
        let mut backend = openssl_ctx();
        let keypair = generated_keypair();
        let signature = backend.sign_rsa(alg, &keypair, b"the signature base").unwrap();
        backend
            .verify_rsa(alg, &keypair, &signature, b"the signature base")
            .unwrap();

        // Verification only needs the public half.
        let public = RsaKeypair::public_only(keypair.public_der().to_vec());
        backend
            .verify_rsa(alg, &public, &signature, b"the signature base")
            .unwrap();
    }

    #[test]
    fn rsa_tampered_signature_is_rejected() {
        let mut backend = openssl_ctx();
        let keypair = generated_keypair();
        let mut signature = backend
            .sign_rsa(SignatureAlgorithm::RsaSha1, &keypair, b"payload")
            .unwrap();
        signature[4] ^= 0xff;
        assert!(matches!(
            backend.verify_rsa(SignatureAlgorithm::RsaSha1, &keypair, &signature, b"payload"),
            Err(BindingError::InvalidSignature)
        ));
        // Garbage of the wrong length fails closed too.
        assert!(matches!(
            backend.verify_rsa(SignatureAlgorithm::RsaSha1, &keypair, b"nonsense", b"payload"),
            Err(BindingError::InvalidSignature)
        ));
    }

    #[test]
    fn signing_without_private_key_is_rejected() {
        let mut backend = openssl_ctx();
        let keypair = generated_keypair();
        let public = RsaKeypair::public_only(keypair.public_der().to_vec());
        assert!(matches!(
            backend.sign_rsa(SignatureAlgorithm::RsaSha1, &public, b"payload"),
            Err(BindingError::KeyUnavailable)
        ));
    }

    #[test]
    fn garbage_der_is_a_key_format_error() {
        let mut backend = openssl_ctx();
        let keypair = RsaKeypair::with_private(vec![0x00, 0x01], vec![0x00, 0x01]);
        assert!(matches!(
            backend.sign_rsa(SignatureAlgorithm::RsaSha1, &keypair, b"payload"),
            Err(BindingError::KeyFormat(_))
        ));
    }
}

#[cfg(feature = "rustcrypto")]
mod rustcrypto_sign_support {
    use super::*;
    use crate::sign::SignCryptoBackend;

    #[test]
    fn rsa_is_unsupported() {
        let mut backend = rustcrypto_ctx();
        let keypair = RsaKeypair::public_only(vec![0x30]);
        assert!(matches!(
            backend.sign_rsa(SignatureAlgorithm::RsaSha1, &keypair, b"payload"),
            Err(BindingError::UnsupportedAlgorithm(_))
        ));
        assert!(matches!(
            backend.verify_rsa(SignatureAlgorithm::RsaSha256, &keypair, b"sig", b"payload"),
            Err(BindingError::UnsupportedAlgorithm(_))
        ));
    }
}
