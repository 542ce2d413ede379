mod common;

use common::TestResult;
use jwe::{
    format::SerializerManager,
    jwe::{algorithm::AlgorithmManager, Error, JweBuilder, JweDecrypter, KeyManagementError},
    jwk::{JsonWebKey, JsonWebKeySet},
    Base64UrlString, HeaderBag, JsonWebEncryption,
};
use serde_json::Value;

const KEY_MANAGEMENT: [(&str, usize); 6] = [
    ("A128KW", 16),
    ("A192KW", 24),
    ("A256KW", 32),
    ("A128GCMKW", 16),
    ("A192GCMKW", 24),
    ("A256GCMKW", 32),
];

const CONTENT_ENCRYPTION: [(&str, usize); 6] = [
    ("A128CBC-HS256", 32),
    ("A192CBC-HS384", 48),
    ("A256CBC-HS512", 64),
    ("A128GCM", 16),
    ("A192GCM", 24),
    ("A256GCM", 32),
];

const FORMATS: [&str; 3] = ["jwe_compact", "jwe_json_flattened", "jwe_json_general"];

fn everything() -> TestResult<AlgorithmManager> {
    let alg = KEY_MANAGEMENT.iter().map(|(alg, _)| *alg).chain(["dir"]);
    let enc = CONTENT_ENCRYPTION.iter().map(|(enc, _)| *enc);
    Ok(AlgorithmManager::with_allowed(alg, enc, ["DEF"])?)
}

fn key(len: usize, fill: u8) -> JsonWebKey {
    JsonWebKey::from_octets(vec![fill; len])
}

fn protected(alg: &str, enc: &str) -> HeaderBag {
    HeaderBag::new().with("alg", alg).with("enc", enc)
}

fn roundtrip(manager: &AlgorithmManager, message: &JsonWebEncryption, key: &JsonWebKey, payload: &[u8]) -> TestResult {
    let serializers = SerializerManager::standard();
    for format in FORMATS {
        let serialized = serializers.serialize(format, message)?;
        let (parsed, detected) = serializers.unserialize(&serialized)?;
        assert_eq!(detected, format);

        let decrypted = JweDecrypter::new(manager).decrypt_using_key(parsed, key)?;
        assert_eq!(decrypted.payload(), payload, "{format}");
    }
    Ok(())
}

#[test]
fn all_key_wrapping_combinations() -> TestResult {
    let manager = everything()?;
    let payload = b"The true sign of intelligence is not knowledge but imagination.".repeat(4);

    for (alg, key_len) in KEY_MANAGEMENT {
        for (enc, _) in CONTENT_ENCRYPTION {
            for zip in [false, true] {
                let key = key(key_len, 0x11);
                let mut header = protected(alg, enc);
                if zip {
                    header.insert("zip", "DEF");
                }

                let message = JweBuilder::new(&manager)
                    .create()
                    .with_payload(payload.clone())
                    .with_shared_protected_headers(header)
                    .add_recipient(&key, None)
                    .build()?;

                if zip {
                    assert!(message.ciphertext().len() < payload.len());
                }
                roundtrip(&manager, &message, &key, &payload)?;
            }
        }
    }

    Ok(())
}

#[test]
fn direct_encryption() -> TestResult {
    let manager = everything()?;

    for (enc, key_len) in CONTENT_ENCRYPTION {
        let key = key(key_len, 0x22);
        let message = JweBuilder::new(&manager)
            .create()
            .with_payload("direct")
            .with_shared_protected_headers(protected("dir", enc))
            .add_recipient(&key, None)
            .build()?;

        assert!(message.recipients()[0].encrypted_key().is_empty());
        roundtrip(&manager, &message, &key, b"direct")?;
    }

    // the key has to match the content encryption key length
    let result = JweBuilder::new(&manager)
        .create()
        .with_payload("direct")
        .with_shared_protected_headers(protected("dir", "A128GCM"))
        .add_recipient(&key(32, 0x22), None)
        .build();
    assert!(matches!(result, Err(Error::KeyManagementFailure(_))));

    Ok(())
}

#[test]
fn empty_payload() -> TestResult {
    let manager = everything()?;
    let key = key(16, 0x33);

    for enc in ["A128GCM", "A128CBC-HS256"] {
        let message = JweBuilder::new(&manager)
            .create()
            .with_payload(Vec::new())
            .with_shared_protected_headers(protected("A128KW", enc))
            .add_recipient(&key, None)
            .build()?;

        let decrypted = JweDecrypter::new(&manager).decrypt_using_key(message, &key)?;
        assert_eq!(decrypted.message().payload(), Some(&[][..]));
    }

    Ok(())
}

/// Rewrites one Base64Url member of a general serialization.
fn tamper(serialized: &str, member: &str, change: impl FnOnce(&mut Vec<u8>)) -> TestResult<String> {
    let mut value: Value = serde_json::from_str(serialized)?;
    let encoded: Base64UrlString = value[member].as_str().unwrap_or_default().parse()?;
    let mut bytes = encoded.decode();
    change(&mut bytes);
    value[member] = Value::String(Base64UrlString::encode(bytes).into_inner());
    Ok(value.to_string())
}

#[test]
fn tampering_is_detected() -> TestResult {
    let manager = everything()?;
    let serializers = SerializerManager::standard();
    let key = key(32, 0x44);

    for enc in ["A256GCM", "A256CBC-HS512"] {
        let message = JweBuilder::new(&manager)
            .create()
            .with_payload("attack at dawn")
            .with_shared_protected_headers(protected("A256KW", enc))
            .with_aad("routing information")
            .add_recipient(&key, None)
            .build()?;
        let serialized = serializers.serialize("jwe_json_general", &message)?;

        let flip = |bytes: &mut Vec<u8>| bytes[0] ^= 1;
        let tampered = [
            tamper(&serialized, "ciphertext", flip)?,
            tamper(&serialized, "tag", flip)?,
            tamper(&serialized, "iv", flip)?,
            tamper(&serialized, "aad", flip)?,
            // same header, different bytes
            tamper(&serialized, "protected", |bytes| bytes.insert(1, b' '))?,
        ];

        for input in tampered {
            let (parsed, _) = serializers.unserialize(&input)?;
            let result = JweDecrypter::new(&manager).decrypt_using_key(parsed, &key);
            assert!(matches!(result, Err(Error::DecryptionFailed)), "{input}");
        }

        // untouched input still works
        let (parsed, _) = serializers.unserialize(&serialized)?;
        JweDecrypter::new(&manager).decrypt_using_key(parsed, &key)?;
    }

    Ok(())
}

fn tamper_part(serialized: &str, index: usize, change: impl FnOnce(&mut Vec<u8>)) -> TestResult<String> {
    let mut parts = serialized.split('.').map(String::from).collect::<Vec<_>>();
    let encoded: Base64UrlString = parts[index].parse()?;
    let mut bytes = encoded.decode();
    change(&mut bytes);
    parts[index] = Base64UrlString::encode(bytes).into_inner();
    Ok(parts.join("."))
}

#[test]
fn tampering_is_detected_in_every_serialization() -> TestResult {
    let manager = everything()?;
    let serializers = SerializerManager::standard();
    let key = key(32, 0x45);

    for enc in ["A128GCM", "A128CBC-HS256"] {
        let message = JweBuilder::new(&manager)
            .create()
            .with_payload("retreat at dusk")
            .with_shared_protected_headers(protected("A256KW", enc))
            .add_recipient(&key, None)
            .build()?;

        let flip = |bytes: &mut Vec<u8>| bytes[0] ^= 1;
        let reformat = |bytes: &mut Vec<u8>| bytes.insert(1, b' ');

        let compact = serializers.serialize("jwe_compact", &message)?;
        let flattened = serializers.serialize("jwe_json_flattened", &message)?;
        let tampered = [
            tamper_part(&compact, 0, reformat)?,
            tamper_part(&compact, 1, flip)?,
            tamper_part(&compact, 2, flip)?,
            tamper_part(&compact, 3, flip)?,
            tamper_part(&compact, 4, flip)?,
            tamper(&flattened, "protected", reformat)?,
            tamper(&flattened, "encrypted_key", flip)?,
            tamper(&flattened, "iv", flip)?,
            tamper(&flattened, "ciphertext", flip)?,
            tamper(&flattened, "tag", flip)?,
        ];

        for input in tampered {
            let (parsed, _) = serializers.unserialize(&input)?;
            let result = JweDecrypter::new(&manager).decrypt_using_key(parsed, &key);
            assert!(matches!(result, Err(Error::DecryptionFailed)), "{input}");
        }

        for input in [compact, flattened] {
            let (parsed, _) = serializers.unserialize(&input)?;
            let decrypted = JweDecrypter::new(&manager).decrypt_using_key(parsed, &key)?;
            assert_eq!(decrypted.payload(), b"retreat at dusk");
        }
    }

    Ok(())
}

#[test]
fn additional_authenticated_data() -> TestResult {
    let manager = everything()?;
    let serializers = SerializerManager::standard();
    let key = key(16, 0x55);

    let message = JweBuilder::new(&manager)
        .create()
        .with_payload("payload")
        .with_shared_protected_headers(protected("A128KW", "A128GCM"))
        .with_aad([1u8, 2, 3])
        .add_recipient(&key, None)
        .build()?;

    assert!(matches!(
        serializers.serialize("jwe_compact", &message),
        Err(Error::IncompatibleSerialization(_))
    ));

    for format in ["jwe_json_flattened", "jwe_json_general"] {
        let (parsed, _) = serializers.unserialize(&serializers.serialize(format, &message)?)?;
        assert_eq!(parsed.aad(), Some(&[1, 2, 3][..]));
        let decrypted = JweDecrypter::new(&manager).decrypt_using_key(parsed, &key)?;
        assert_eq!(decrypted.payload(), b"payload");
    }

    Ok(())
}

#[test]
fn multiple_recipients() -> TestResult {
    let manager = everything()?;
    let serializers = SerializerManager::standard();

    let first = key(16, 1).with_key_id("first");
    let second = key(32, 2).with_key_id("second");
    let third = key(24, 3).with_key_id("third");

    let message = JweBuilder::new(&manager)
        .create()
        .with_payload("for your eyes only")
        .with_shared_protected_headers(HeaderBag::new().with("enc", "A128CBC-HS256"))
        .with_shared_unprotected_headers(HeaderBag::new().with("cty", "text/plain"))
        .add_recipient(&first, Some(HeaderBag::new().with("alg", "A128KW").with("kid", "first")))
        .add_recipient(&second, Some(HeaderBag::new().with("alg", "A256GCMKW").with("kid", "second")))
        .add_recipient(&third, Some(HeaderBag::new().with("alg", "A192GCMKW").with("kid", "third")))
        .build()?;

    assert_eq!(message.count_recipients(), 3);
    // every GCM key wrap recipient has its own iv and tag
    assert!(!message.shared_protected_header().contains("iv"));
    for index in 1..3 {
        let header = message.recipients()[index].header().ok_or("no header")?;
        assert!(header.contains("iv") && header.contains("tag"));
    }

    for format in ["jwe_compact", "jwe_json_flattened"] {
        assert!(matches!(
            serializers.serialize(format, &message),
            Err(Error::IncompatibleSerialization(_))
        ));
    }

    let serialized = serializers.serialize("jwe_json_general", &message)?;

    // keys are tried in order against every recipient
    let unrelated = key(16, 9);
    let set = JsonWebKeySet::from(vec![unrelated, third.clone()]);
    let (parsed, _) = serializers.unserialize(&serialized)?;
    let decrypted = JweDecrypter::new(&manager).decrypt_using_key_set(parsed, &set)?;
    assert_eq!(decrypted.recipient(), 2);
    assert_eq!(decrypted.payload(), b"for your eyes only");
    assert_eq!(decrypted.header().get_str("kid"), Some("third"));
    assert_eq!(decrypted.header().get_str("cty"), Some("text/plain"));

    let (parsed, _) = serializers.unserialize(&serialized)?;
    let decrypted = JweDecrypter::new(&manager).decrypt(parsed, [&second, &first])?;
    assert_eq!(decrypted.recipient(), 0);

    let found = set.find_by_key_id("third").ok_or("missing key")?;
    assert_eq!(found, &third);

    Ok(())
}

#[test]
fn single_recipient_header_receives_key_wrap_parameters() -> TestResult {
    let manager = everything()?;
    let key = key(16, 6);

    let message = JweBuilder::new(&manager)
        .create()
        .with_payload("x")
        .with_shared_protected_headers(HeaderBag::new().with("enc", "A128GCM"))
        .add_recipient(&key, Some(HeaderBag::new().with("alg", "A128GCMKW")))
        .build()?;

    let header = message.recipients()[0].header().ok_or("no header")?;
    assert!(header.contains("iv"));
    assert!(header.contains("tag"));
    assert!(!message.shared_protected_header().contains("iv"));

    Ok(())
}

#[test]
fn header_rules() -> TestResult {
    let manager = everything()?;
    let key = key(16, 7);
    let build = |protected: HeaderBag, unprotected: Option<HeaderBag>, recipient: Option<HeaderBag>| {
        let mut draft = JweBuilder::new(&manager)
            .create()
            .with_payload("x")
            .with_shared_protected_headers(protected);
        if let Some(unprotected) = unprotected {
            draft = draft.with_shared_unprotected_headers(unprotected);
        }
        draft.add_recipient(&key, recipient).build()
    };

    let conflict = build(
        protected("A128KW", "A128GCM").with("kid", "a"),
        None,
        Some(HeaderBag::new().with("kid", "a")),
    );
    assert!(matches!(conflict, Err(Error::HeaderConflict(name)) if name == "kid"));

    let conflict = build(
        protected("A128KW", "A128GCM"),
        Some(HeaderBag::new().with("enc", "A256GCM")),
        None,
    );
    assert!(matches!(conflict, Err(Error::HeaderConflict(_))));

    let unprotected_zip = build(
        protected("A128KW", "A128GCM"),
        Some(HeaderBag::new().with("zip", "DEF")),
        None,
    );
    assert!(matches!(unprotected_zip, Err(Error::UnprotectedParameter("zip"))));

    let missing = build(HeaderBag::new().with("alg", "A128KW"), None, None);
    assert!(matches!(missing, Err(Error::MissingHeader("enc"))));

    let unknown = build(protected("A128KW", "A128CBC"), None, None);
    assert!(matches!(unknown, Err(Error::UnsupportedAlgorithm(_))));

    Ok(())
}

#[test]
fn builder_preconditions() -> TestResult {
    let manager = everything()?;
    let key = key(16, 8);

    let no_recipients = JweBuilder::new(&manager)
        .create()
        .with_payload("x")
        .with_shared_protected_headers(protected("A128KW", "A128GCM"))
        .build();
    assert!(matches!(no_recipients, Err(Error::NoRecipients)));

    let no_payload = JweBuilder::new(&manager)
        .create()
        .with_shared_protected_headers(protected("A128KW", "A128GCM"))
        .add_recipient(&key, None)
        .build();
    assert!(matches!(no_payload, Err(Error::MissingPayload)));

    let direct_twice = JweBuilder::new(&manager)
        .create()
        .with_payload("x")
        .with_shared_protected_headers(protected("dir", "A128GCM"))
        .add_recipient(&key, None)
        .add_recipient(&key, None)
        .build();
    assert!(matches!(direct_twice, Err(Error::IncompatibleDirectMode)));

    let restricted = key.clone().with_algorithm("A256KW");
    let not_allowed = JweBuilder::new(&manager)
        .create()
        .with_payload("x")
        .with_shared_protected_headers(protected("A128KW", "A128GCM"))
        .add_recipient(&restricted, None)
        .build();
    assert!(matches!(
        not_allowed,
        Err(Error::KeyManagementFailure(KeyManagementError::NotAllowed))
    ));

    let wrong_size = JweBuilder::new(&manager)
        .create()
        .with_payload("x")
        .with_shared_protected_headers(protected("A256KW", "A128GCM"))
        .add_recipient(&key, None)
        .build();
    assert!(matches!(wrong_size, Err(Error::KeyManagementFailure(_))));

    Ok(())
}

#[test]
fn allow_lists() -> TestResult {
    assert!(matches!(
        AlgorithmManager::with_allowed(["RSA-OAEP"], ["A128GCM"], None::<&str>),
        Err(Error::UnsupportedAlgorithm(alg)) if alg == "RSA-OAEP"
    ));

    let everything = everything()?;
    let key = key(16, 10);
    let message = JweBuilder::new(&everything)
        .create()
        .with_payload("x")
        .with_shared_protected_headers(protected("A128KW", "A128GCM"))
        .add_recipient(&key, None)
        .build()?;

    // the decrypter does not accept what it is not configured for
    let restricted = AlgorithmManager::with_allowed(["A256KW"], ["A128GCM"], None::<&str>)?;
    let result = JweDecrypter::new(&restricted).decrypt_using_key(message.clone(), &key);
    assert!(matches!(result, Err(Error::DecryptionFailed)));

    // neither does the builder
    let result = JweBuilder::new(&restricted)
        .create()
        .with_payload("x")
        .with_shared_protected_headers(protected("A128KW", "A128GCM"))
        .add_recipient(&key, None)
        .build();
    assert!(matches!(result, Err(Error::UnsupportedAlgorithm(_))));

    // a key meant for signatures is skipped
    let signing: JsonWebKey = serde_json::from_value(serde_json::json!({
        "kty": "oct",
        "use": "sig",
        "k": Base64UrlString::encode([10; 16]).into_inner(),
    }))?;
    let result = JweDecrypter::new(&everything).decrypt_using_key(message, &signing);
    assert!(matches!(result, Err(Error::DecryptionFailed)));

    Ok(())
}
