use folio_ids::{CodecSettings, IdCodecs, IdError, IdNamespace, OpaqueIdCodec};
use proptest::prelude::*;

fn codecs() -> IdCodecs {
    IdCodecs::published_defaults().expect("default codecs")
}

#[test]
fn namespaces_encode_the_same_key_differently() {
    let codecs = codecs();
    assert_ne!(
        codecs.encode(IdNamespace::Author, 7),
        codecs.encode(IdNamespace::Article, 7)
    );
}

#[test]
fn encoding_is_deterministic_across_instances() {
    let a = codecs();
    let b = codecs();
    for value in [0, 1, 31, 50, 9_999_999] {
        assert_eq!(
            a.encode(IdNamespace::Article, value),
            b.encode(IdNamespace::Article, value)
        );
    }
}

#[test]
fn garbage_is_an_invalid_identifier() {
    let codecs = codecs();
    for namespace in IdNamespace::ALL {
        assert!(matches!(
            codecs.decode(namespace, "not-a-real-id"),
            Err(IdError::InvalidIdentifier { .. })
        ));
    }
}

#[test]
fn salt_changes_every_small_id() {
    let left = OpaqueIdCodec::new("author", &CodecSettings::new("author", 10)).unwrap();
    let right = OpaqueIdCodec::new("author", &CodecSettings::new("author-v2", 10)).unwrap();
    let collisions = (0..200u64)
        .filter(|&n| left.encode(n) == right.encode(n))
        .count();
    assert_eq!(collisions, 0);
}

#[test]
fn dense_prefix_round_trips() {
    let codecs = codecs();
    for value in 0..5_000u64 {
        let id = codecs.encode(IdNamespace::Author, value);
        assert_eq!(codecs.decode(IdNamespace::Author, &id).unwrap(), value);
    }
}

proptest! {
    #[test]
    fn round_trips_below_ten_million(value in 0u64..10_000_000) {
        let codecs = codecs();
        for namespace in IdNamespace::ALL {
            let id = codecs.encode(namespace, value);
            prop_assert!(id.len() >= 10);
            prop_assert_eq!(codecs.decode(namespace, &id).unwrap(), value);
        }
    }

    #[test]
    fn round_trips_full_range(value in any::<u64>()) {
        let codecs = codecs();
        let id = codecs.encode(IdNamespace::Article, value);
        prop_assert_eq!(codecs.decode(IdNamespace::Article, &id).unwrap(), value);
    }

    #[test]
    fn author_ids_do_not_resolve_as_the_same_article(value in 0u64..10_000_000) {
        let codecs = codecs();
        let id = codecs.encode(IdNamespace::Author, value);
        prop_assert_ne!(codecs.decode(IdNamespace::Article, &id).ok(), Some(value));
    }

    #[test]
    fn arbitrary_strings_never_panic(input in "[a-zA-Z0-9]{0,24}") {
        let codecs = codecs();
        if let Ok(value) = codecs.decode(IdNamespace::Author, &input) {
            prop_assert_eq!(codecs.encode(IdNamespace::Author, value), input);
        }
    }
}
