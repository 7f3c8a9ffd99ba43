// Header container suite: generic get/set/remove, typed getters, validation
// rules, extension parameters and the two-container operations.

#[cfg(test)]
mod tests {
    use jwe_core::buffer::Buffer;
    use jwe_core::headers::{
        HeaderError, HeaderFields, HeaderValue, Headers, StdHeaders, ValidationError,
        ALGORITHM_KEY, CONTENT_ENCRYPTION_KEY,
    };
    use jwe_core::jwa::{CompressionAlgorithm, ContentEncryptionAlgorithm, KeyEncryptionAlgorithm};
    use jwe_core::jwk::{EcdsaPublicKey, Key};
    use serde_json::json;

    fn sample_key() -> Key {
        Key::from_json(json!({"kty": "oct", "k": "c2VjcmV0", "kid": "k1"})).unwrap()
    }

    // ## 1. Fresh container

    #[test]
    fn fresh_container_reads_zero_values() {
        let h = Headers::new();
        assert_eq!(h.algorithm(), KeyEncryptionAlgorithm::default());
        assert!(h.algorithm().is_empty());
        assert_eq!(h.content_encryption(), ContentEncryptionAlgorithm::default());
        assert_eq!(h.compression(), CompressionAlgorithm::NO_COMPRESS);
        assert_eq!(h.key_id(), "");
        assert!(h.agreement_party_u_info().is_empty());
        assert_eq!(h.critical(), None);
        assert_eq!(h.jwk(), None);
        assert_eq!(h.ephemeral_public_key(), None);
        assert!(h.as_map().is_empty());
        assert_eq!(h.get("alg"), None);
    }

    // ## 2. The `alg` example

    #[test]
    fn set_alg_then_get() {
        let h = Headers::new();
        h.set("alg", "A256KW").unwrap();

        let v = h.get("alg").unwrap();
        assert_eq!(v, HeaderValue::KeyEncryption(KeyEncryptionAlgorithm::A256KW));
        assert_eq!(v.as_str(), Some("A256KW"));
        assert_eq!(h.algorithm(), KeyEncryptionAlgorithm::A256KW);

        let encoded = String::from_utf8(h.encode().unwrap()).unwrap();
        assert!(encoded.contains(r#""alg":"A256KW""#));
    }

    #[test]
    fn typed_values_are_accepted_directly() {
        let h = Headers::new();
        h.set(ALGORITHM_KEY, KeyEncryptionAlgorithm::ECDH_ES_A128KW).unwrap();
        h.set(CONTENT_ENCRYPTION_KEY, ContentEncryptionAlgorithm::A128GCM).unwrap();
        h.set("zip", CompressionAlgorithm::DEFLATE).unwrap();
        h.set("apu", Buffer::from(vec![1u8, 2, 3])).unwrap();
        h.set("crit", vec!["exp"]).unwrap();
        h.set("jwk", sample_key()).unwrap();

        assert_eq!(h.algorithm(), KeyEncryptionAlgorithm::ECDH_ES_A128KW);
        assert_eq!(h.content_encryption(), ContentEncryptionAlgorithm::A128GCM);
        assert_eq!(h.compression(), CompressionAlgorithm::DEFLATE);
        assert_eq!(h.agreement_party_u_info().as_bytes(), &[1, 2, 3]);
        assert_eq!(h.critical(), Some(vec!["exp".to_owned()]));
        assert_eq!(h.jwk().unwrap().key_id(), Some("k1"));
    }

    #[test]
    fn bytes_acceptor_takes_raw_text() {
        let h = Headers::new();
        h.set("apv", "Bob").unwrap();
        assert_eq!(h.agreement_party_v_info().as_bytes(), b"Bob");
    }

    #[test]
    fn string_fields_accept_json_strings() {
        let h = Headers::new();
        h.set("kid", json!("key-1")).unwrap();
        h.set("x5c", json!(["MIIB", "MIIC"])).unwrap();
        assert_eq!(h.key_id(), "key-1");
        assert_eq!(h.x509_cert_chain(), Some(vec!["MIIB".to_owned(), "MIIC".to_owned()]));
    }

    // ## 3. Validation

    #[test]
    fn wrong_type_on_enum_field_is_rejected() {
        let h = Headers::new();
        h.set("kid", "k1").unwrap();

        let err = h.set("enc", 123).unwrap_err();
        assert!(matches!(
            err,
            HeaderError::Validation(ValidationError::Rejected { ref key, .. }) if key == "enc"
        ));
        assert_eq!(err.key(), Some("enc"));
        assert_eq!(h.get("enc"), None);
        assert_eq!(h.key_id(), "k1");
    }

    #[test]
    fn wrong_type_on_strict_field_names_both_types() {
        let h = Headers::new();
        let err = h.set("kid", true).unwrap_err();
        match err {
            HeaderError::Validation(ValidationError::WrongType { key, expected, received }) => {
                assert_eq!(key, "kid");
                assert_eq!(expected, "string");
                assert_eq!(received, "bool");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = h.set("jwk", "not a key").unwrap_err();
        assert!(matches!(
            err,
            HeaderError::Validation(ValidationError::WrongType { expected: "jwk", received: "string", .. })
        ));

        let err = h.set("crit", json!(["a", 1])).unwrap_err();
        assert!(matches!(
            err,
            HeaderError::Validation(ValidationError::WrongType { received: "array", .. })
        ));
        assert!(h.as_map().is_empty());
    }

    #[test]
    fn empty_enc_is_rejected() {
        let h = Headers::new();
        h.set("enc", "A256GCM").unwrap();

        let err = h.set("enc", "").unwrap_err();
        assert!(matches!(
            err,
            HeaderError::Validation(ValidationError::Empty { ref key }) if key == "enc"
        ));
        assert_eq!(err.to_string(), r#""enc" field cannot be an empty string"#);
        assert_eq!(h.content_encryption(), ContentEncryptionAlgorithm::A256GCM);

        // typed empty value takes the same path
        assert!(h.set("enc", ContentEncryptionAlgorithm::default()).is_err());
    }

    #[test]
    fn empty_strings_are_fine_elsewhere() {
        let h = Headers::new();
        h.set("kid", "").unwrap();
        h.set("zip", "").unwrap();
        assert_eq!(h.get("kid"), Some(HeaderValue::String(String::new())));
        assert_eq!(h.compression(), CompressionAlgorithm::NO_COMPRESS);
    }

    #[test]
    fn unregistered_algorithms_are_carried() {
        let h = Headers::new();
        h.set("alg", "X-EXPERIMENTAL").unwrap();
        assert_eq!(h.algorithm().as_str(), "X-EXPERIMENTAL");
        assert!(!h.algorithm().is_registered());
    }

    // ## 4. Extension parameters

    #[test]
    fn unknown_keys_become_private_params() {
        let h = Headers::new();
        h.set("x-trace", "abc").unwrap();
        h.set("x-count", 7u64).unwrap();
        h.set("x-nested", json!({"a": [1, 2]})).unwrap();

        assert_eq!(h.get("x-trace"), Some(HeaderValue::Json(json!("abc"))));
        assert_eq!(h.get("x-count"), Some(HeaderValue::Json(json!(7))));

        let params = h.private_params();
        assert_eq!(params.len(), 3);
        assert_eq!(params["x-nested"], json!({"a": [1, 2]}));
        assert!(!StdHeaders::is_known_key("x-trace"));
    }

    #[test]
    fn non_json_values_are_stored_canonically() {
        let h = Headers::new();
        h.set("x-bytes", Buffer::from(b"hi".as_slice())).unwrap();
        h.set("x-alg", KeyEncryptionAlgorithm::DIRECT).unwrap();
        assert_eq!(h.get("x-bytes"), Some(HeaderValue::Json(json!("aGk"))));
        assert_eq!(h.get("x-alg"), Some(HeaderValue::Json(json!("dir"))));
    }

    #[test]
    fn known_keys_never_reach_private_params() {
        let h = Headers::new();
        h.set("alg", "dir").unwrap();
        h.set("kid", "k").unwrap();
        assert!(h.private_params().is_empty());
        assert!(StdHeaders::is_known_key("x5t#S256"));
        assert_eq!(StdHeaders::KNOWN_KEYS.len(), 16);
    }

    // ## 5. Remove

    #[test]
    fn remove_clears_fields_and_params() {
        let h = Headers::new();
        h.set("alg", "dir").unwrap();
        h.set("crit", vec!["x"]).unwrap();
        h.set("x-a", 1).unwrap();

        h.remove("alg");
        h.remove("crit");
        h.remove("x-a");
        h.remove("never-set");

        assert_eq!(h.get("alg"), None);
        assert!(h.algorithm().is_empty());
        assert_eq!(h.critical(), None);
        assert!(h.as_map().is_empty());
    }

    // ## 6. Snapshots

    #[test]
    fn as_map_holds_everything_present() {
        let h = Headers::new();
        h.set("alg", "RSA-OAEP").unwrap();
        h.set("enc", "A128CBC-HS256").unwrap();
        h.set("x-z", "z").unwrap();

        let map = h.as_map();
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["alg", "enc", "x-z"]);
        assert_eq!(map["enc"].as_str(), Some("A128CBC-HS256"));
    }

    #[test]
    fn with_fields_releases_the_lock_on_return() {
        let h = Headers::new();
        h.set("kid", "k1").unwrap();

        let kid = h.with_fields(|f| f.get_field("kid"));
        assert_eq!(kid.and_then(|v| v.as_str().map(str::to_owned)), Some("k1".to_owned()));

        // a writer on the same thread must not block after the closure returns
        h.set("kid", "k2").unwrap();
        h.decode(br#"{"kid":"k3"}"#).unwrap();
        assert_eq!(h.with_fields(|f| f.make_pairs().len()), 1);
        assert_eq!(h.key_id(), "k3");
    }

    #[test]
    fn clone_is_deep() {
        let h = Headers::new();
        h.set("jwk", sample_key()).unwrap();
        h.set("x-a", json!({"deep": true})).unwrap();

        let copy = h.clone();
        assert_eq!(copy, h);

        h.set("x-a", 1).unwrap();
        h.remove("jwk");
        assert_eq!(copy.get("x-a"), Some(HeaderValue::Json(json!({"deep": true}))));
        assert!(copy.jwk().is_some());
        assert_ne!(copy, h);
    }

    // ## 7. Copy and merge

    #[test]
    fn copy_to_sets_every_present_pair() {
        let src = Headers::new();
        src.set("alg", "A128KW").unwrap();
        src.set("x-a", "a").unwrap();

        let dst = Headers::new();
        dst.set("kid", "keep").unwrap();
        dst.set("alg", "dir").unwrap();

        src.copy_to(&dst).unwrap();
        assert_eq!(dst.algorithm(), KeyEncryptionAlgorithm::A128KW);
        assert_eq!(dst.key_id(), "keep");
        assert_eq!(dst.get("x-a"), Some(HeaderValue::Json(json!("a"))));

        // copying onto itself is a no-op
        src.copy_to(&src).unwrap();
        assert_eq!(src.as_map().len(), 2);
    }

    #[test]
    fn merge_prefers_other() {
        let a = Headers::new();
        a.set("alg", "dir").unwrap();
        a.set("kid", "from-a").unwrap();
        a.set("x-only-a", 1).unwrap();

        let b = Headers::new();
        b.set("kid", "from-b").unwrap();
        b.set("enc", "A256GCM").unwrap();
        b.set(
            "epk",
            EcdsaPublicKey::new("P-256", vec![1u8; 32], vec![2u8; 32]).unwrap(),
        )
        .unwrap();

        let merged = a.merge(&b).unwrap();
        assert_eq!(merged.algorithm(), KeyEncryptionAlgorithm::DIRECT);
        assert_eq!(merged.key_id(), "from-b");
        assert_eq!(merged.content_encryption(), ContentEncryptionAlgorithm::A256GCM);
        assert_eq!(merged.ephemeral_public_key().unwrap().curve(), "P-256");
        assert_eq!(merged.get("x-only-a"), Some(HeaderValue::Json(json!(1))));

        // inputs untouched
        assert_eq!(a.key_id(), "from-a");
        assert_eq!(b.get("alg"), None);
    }

    #[test]
    fn merge_with_self() {
        let a = Headers::new();
        a.set("alg", "dir").unwrap();
        let merged = a.merge(&a).unwrap();
        assert_eq!(merged, a);
    }
}
