// JSON codec suite: deterministic encoding, single-pass decoding, failure
// isolation and round-trip properties.

#[cfg(test)]
mod tests {
    use jwe_core::buffer::Buffer;
    use jwe_core::headers::{HeaderError, HeaderValue, Headers};
    use jwe_core::jwa::{ContentEncryptionAlgorithm, KeyEncryptionAlgorithm};
    use jwe_core::jwk::{EcdsaPublicKey, Key};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde::Deserialize;
    use serde_json::json;

    fn encode_str(h: &Headers) -> String {
        String::from_utf8(h.encode().unwrap()).unwrap()
    }

    // ## 1. Encode

    #[test]
    fn empty_container_encodes_to_empty_object() {
        assert_eq!(encode_str(&Headers::new()), "{}");
    }

    #[test]
    fn keys_are_sorted_and_bytes_are_base64url() {
        let h = Headers::new();
        h.set("x-custom", 5).unwrap();
        h.set("kid", "k1").unwrap();
        h.set("enc", "A128GCM").unwrap();
        h.set("apu", Buffer::from(vec![0xff, 0xfe])).unwrap();
        h.set("alg", "dir").unwrap();

        assert_eq!(
            encode_str(&h),
            r#"{"alg":"dir","apu":"__4","enc":"A128GCM","kid":"k1","x-custom":5}"#
        );
    }

    #[test]
    fn nested_values_encode_as_objects() {
        let h = Headers::new();
        h.set("crit", vec!["b64", "exp"]).unwrap();
        h.set("epk", EcdsaPublicKey::new("P-256", vec![1u8], vec![2u8]).unwrap())
            .unwrap();
        h.set("x-obj", json!({"b": 1, "a": [true, null]})).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&h.encode().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "crit": ["b64", "exp"],
                "epk": {"kty": "EC", "crv": "P-256", "x": "AQ", "y": "Ag"},
                "x-obj": {"a": [true, null], "b": 1},
            })
        );
    }

    #[test]
    fn serde_serialize_matches_encode() {
        let h = Headers::new();
        h.set("alg", "A256KW").unwrap();
        h.set("apv", "Bob").unwrap();
        h.set("x-n", -3).unwrap();
        assert_eq!(serde_json::to_string(&h).unwrap(), encode_str(&h));
    }

    #[test]
    fn encode_is_deterministic_across_insertion_order() {
        let a = Headers::new();
        a.set("x-b", 2).unwrap();
        a.set("x-a", 1).unwrap();
        a.set("typ", "JWE").unwrap();

        let b = Headers::new();
        b.set("typ", "JWE").unwrap();
        b.set("x-a", 1).unwrap();
        b.set("x-b", 2).unwrap();

        assert_eq!(a.encode().unwrap(), b.encode().unwrap());
    }

    // ## 2. Decode

    #[test]
    fn decode_routes_known_and_unknown_keys() {
        let h = Headers::from_slice(
            br#"{"alg":"ECDH-ES","enc":"A256GCM","apu":"QWxpY2U","x5t#S256":"abc","x-app":{"v":2}}"#,
        )
        .unwrap();

        assert_eq!(h.algorithm(), KeyEncryptionAlgorithm::ECDH_ES);
        assert_eq!(h.content_encryption(), ContentEncryptionAlgorithm::A256GCM);
        assert_eq!(h.agreement_party_u_info().as_bytes(), b"Alice");
        assert_eq!(h.x509_cert_thumbprint_s256(), "abc");

        let params = h.private_params();
        assert_eq!(params.len(), 1);
        assert_eq!(params["x-app"], json!({"v": 2}));
    }

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let input = r#"{"alg":"dir","x-list":[1,"two",{"three":3}],"x-null":null}"#;
        let h = Headers::from_slice(input.as_bytes()).unwrap();
        assert_eq!(encode_str(&h), input);
    }

    #[test]
    fn byte_fields_decode_tolerantly() {
        for text in ["__4", "__4=", "//4", "//4="] {
            let input = format!(r#"{{"apu":"{text}"}}"#);
            let h = Headers::from_slice(input.as_bytes()).unwrap();
            assert_eq!(h.agreement_party_u_info().as_bytes(), &[0xff, 0xfe], "{text}");
        }
    }

    #[test]
    fn jwk_is_parsed_as_a_key() {
        let h = Headers::from_slice(
            br#"{"jwk":{"kty":"RSA","n":"sXch","e":"AQAB","kid":"rsa-1"}}"#,
        )
        .unwrap();
        let key = h.jwk().unwrap();
        assert_eq!(key.key_type(), "RSA");
        assert_eq!(key.key_id(), Some("rsa-1"));
        assert_eq!(key.param("e"), Some(&json!("AQAB")));
    }

    #[test]
    fn null_leaves_nullable_fields_absent() {
        let h = Headers::from_slice(br#"{"crit":null,"epk":null,"jwk":null,"kid":"k1"}"#).unwrap();
        assert_eq!(h.critical(), None);
        assert_eq!(h.ephemeral_public_key(), None);
        assert_eq!(h.jwk(), None);
        assert_eq!(h.key_id(), "k1");
        assert!(h.private_params().is_empty());
        assert_eq!(encode_str(&h), r#"{"kid":"k1"}"#);
    }

    #[test]
    fn null_is_still_refused_for_scalar_fields() {
        for key in ["alg", "kid", "apu"] {
            let input = format!(r#"{{"{key}":null}}"#);
            let err = Headers::from_slice(input.as_bytes()).unwrap_err();
            assert_eq!(err.key(), Some(key));
        }
    }

    #[test]
    fn decode_is_a_full_replace() {
        let h = Headers::new();
        h.set("kid", "old").unwrap();
        h.set("x-old", 1).unwrap();

        h.decode(br#"{"alg":"dir"}"#).unwrap();
        assert_eq!(h.key_id(), "");
        assert!(h.private_params().is_empty());
        assert_eq!(h.algorithm(), KeyEncryptionAlgorithm::DIRECT);
    }

    #[test]
    fn non_objects_are_rejected() {
        for input in [&b"[1,2]"[..], b"\"alg\"", b"null", b"42", b""] {
            let err = Headers::from_slice(input).unwrap_err();
            assert!(
                matches!(err, HeaderError::Decode { key: None, .. }),
                "{:?} gave {err:?}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn truncated_value_names_its_key() {
        let err = Headers::from_slice(br#"{"kid":"k","alg":"#).unwrap_err();
        assert_eq!(err.key(), Some("alg"));
    }

    #[test]
    fn trailing_data_is_rejected() {
        let err = Headers::from_slice(br#"{"alg":"dir"} {}"#).unwrap_err();
        assert!(matches!(err, HeaderError::Decode { .. }));
    }

    #[test]
    fn failure_names_the_key_and_keeps_prior_state() {
        let h = Headers::new();
        h.set("kid", "k1").unwrap();
        h.set("x-keep", true).unwrap();
        let before = h.clone();

        let cases: [(&[u8], &str); 6] = [
            (br#"{"kid":"k2","enc":""}"#, "enc"),
            (br#"{"alg":5}"#, "alg"),
            (br#"{"crit":"exp"}"#, "crit"),
            (br#"{"apu":"!!"}"#, "apu"),
            (br#"{"jwk":{"k":"x"}}"#, "jwk"),
            (br#"{"epk":{"kty":"EC","crv":"P-192","x":"AQ","y":"Ag"}}"#, "epk"),
        ];
        for (input, key) in cases {
            let err = h.decode(input).unwrap_err();
            assert_eq!(err.key(), Some(key), "{err}");
            assert!(err.to_string().starts_with(&format!("failed to decode value for key {key}")));
            assert_eq!(h, before);
        }
    }

    #[test]
    fn serde_deserialize_embeds_in_other_types() {
        #[derive(Deserialize)]
        struct Envelope {
            protected: Headers,
            ciphertext: String,
        }

        let env: Envelope = serde_json::from_value(json!({
            "protected": {"alg": "RSA-OAEP-256", "enc": "A128CBC-HS256", "x-a": 1},
            "ciphertext": "abc",
        }))
        .unwrap();
        assert_eq!(env.ciphertext, "abc");
        assert_eq!(env.protected.algorithm(), KeyEncryptionAlgorithm::RSA_OAEP_256);
        assert_eq!(env.protected.get("x-a"), Some(HeaderValue::Json(json!(1))));

        let err = serde_json::from_value::<Envelope>(json!({
            "protected": {"enc": ""},
            "ciphertext": "abc",
        }));
        assert!(err.is_err());
    }

    #[test]
    fn key_round_trips_through_json() {
        let key = Key::parse(br#"{"kty":"OKP","crv":"X25519","x":"abc"}"#).unwrap();
        let h = Headers::new();
        h.set("jwk", key.clone()).unwrap();
        let back = Headers::from_slice(&h.encode().unwrap()).unwrap();
        assert_eq!(back.jwk(), Some(key));
    }

    // ## 3. Properties

    fn arb_headers() -> impl Strategy<Value = Headers> {
        (
            proptest::option::of(prop::sample::select(vec!["A128KW", "dir", "RSA-OAEP", "ECDH-ES"])),
            proptest::option::of(prop::sample::select(vec!["A128GCM", "A256GCM", "A256CBC-HS512"])),
            proptest::option::of("[a-zA-Z0-9_-]{0,16}"),
            proptest::option::of(proptest::collection::vec(any::<u8>(), 0..48)),
            proptest::option::of(proptest::collection::vec("[a-z0-9]{1,8}", 0..4)),
            proptest::collection::btree_map("x-[a-z]{1,8}", any::<i64>(), 0..4),
            proptest::collection::btree_map("p-[a-z]{1,8}", "\\PC{0,12}", 0..3),
        )
            .prop_map(|(alg, enc, kid, apu, crit, numbers, strings)| {
                let h = Headers::new();
                if let Some(alg) = alg {
                    h.set("alg", alg).unwrap();
                }
                if let Some(enc) = enc {
                    h.set("enc", enc).unwrap();
                }
                if let Some(kid) = kid {
                    h.set("kid", kid).unwrap();
                }
                if let Some(apu) = apu {
                    h.set("apu", Buffer::from(apu)).unwrap();
                }
                if let Some(crit) = crit {
                    h.set("crit", crit).unwrap();
                }
                for (k, v) in numbers {
                    h.set(&k, v).unwrap();
                }
                for (k, v) in strings {
                    h.set(&k, v).unwrap();
                }
                h
            })
    }

    proptest! {
        #[test]
        fn prop_decode_encode_round_trip(h in arb_headers()) {
            let encoded = h.encode().unwrap();
            let decoded = Headers::from_slice(&encoded).unwrap();
            prop_assert_eq!(decoded.as_map(), h.as_map());
            prop_assert_eq!(decoded.private_params(), h.private_params());
            prop_assert_eq!(decoded.encode().unwrap(), encoded);
        }

        #[test]
        fn prop_encode_is_deterministic(h in arb_headers()) {
            prop_assert_eq!(h.encode().unwrap(), h.clone().encode().unwrap());
        }
    }
}
