//! Property tests: signing is a pure push, and every token records the hash
//! of exactly the document beneath it.

use proptest::prelude::*;
use serde_json::{Map, Value};
use sigstack::{hash_document, pop_signature, sign, HashOptions, SignOptions, SignaturePayload};
use sigstack_crypto::{decode_compact, KeyMaterial};

fn flat_object() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(
        "[a-z_]{1,8}".prop_filter("not the stack key", |k| k != "signatures"),
        prop_oneof![
            any::<i64>().prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
            "[ -~]{0,16}".prop_map(Value::from),
        ],
        0..8,
    )
    .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>()))
}

fn top_payload(doc: &Value) -> SignaturePayload {
    let token = sigstack_core::latest_signature(doc)
        .and_then(Value::as_str)
        .expect("signed document has a token");
    serde_json::from_value(decode_compact(token).unwrap().payload).unwrap()
}

proptest! {
    #[test]
    fn pop_undoes_sign(doc in flat_object(), seed in any::<[u8; 32]>()) {
        let key = KeyMaterial::Seed(seed);
        let signed = sign(&doc, Some(&key), &SignOptions::default()).unwrap();
        prop_assert_eq!(pop_signature(&signed), doc);
    }

    #[test]
    fn each_token_hashes_the_document_beneath_it(
        doc in flat_object(),
        seeds in prop::collection::vec(any::<[u8; 32]>(), 1..4),
    ) {
        let mut current = doc;
        for seed in seeds {
            let signed = sign(&current, Some(&KeyMaterial::Seed(seed)), &SignOptions::default()).unwrap();
            let recorded = top_payload(&signed).hashinfo.unwrap();
            prop_assert_eq!(recorded, hash_document(&current, &HashOptions::default()));
            prop_assert_eq!(pop_signature(&signed), current);
            current = signed;
        }
    }
}
