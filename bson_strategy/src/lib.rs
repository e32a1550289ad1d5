use bson_io::prelude::*;
use proptest::prelude::*;

/// First millisecond of year 1.
const MIN_MILLIS: i64 = -62_135_596_800_000;
/// Last millisecond of year 9999.
const MAX_MILLIS: i64 = 253_402_300_799_999;

/// arbitrary element name for use with proptest
pub fn arb_name() -> impl Strategy<Value = String> { "[a-zA-Z_$][a-zA-Z0-9_.]{0,11}" }

/// arbitrary string without null bytes, usable as a regex part
pub fn arb_cstring() -> impl Strategy<Value = String> { "[a-zA-Z0-9 .*+?^$()|\\[\\]\\\\-]{0,16}" }

/// arbitrary finite double, so values compare equal after a round trip
pub fn arb_double() -> impl Strategy<Value = f64> {
    prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO
}

/// arbitrary UTC date with millisecond precision
pub fn arb_date_time() -> impl Strategy<Value = DateTime<Utc>> {
    (MIN_MILLIS..=MAX_MILLIS).prop_map(|ms| Utc.timestamp_millis_opt(ms).unwrap())
}

/// arbitrary binary value of any sub type but the legacy one, which writers rewrite
pub fn arb_binary() -> impl Strategy<Value = Binary> {
    (
        any::<u8>().prop_filter("old binary", |t| *t != 0x02),
        prop::collection::vec(any::<u8>(), 0..32),
    )
        .prop_map(|(t, bytes)| Binary {
            subtype: BinarySubType::from(t),
            bytes,
        })
}

pub fn arb_object_id() -> impl Strategy<Value = ObjectId> {
    prop::array::uniform12(any::<u8>()).prop_map(ObjectId::from_bytes)
}

fn arb_leaf() -> impl Strategy<Value = Bson> {
    prop_oneof![
        Just(Bson::Null),
        Just(Bson::MinKey),
        Just(Bson::MaxKey),
        any::<bool>().prop_map(Bson::Boolean),
        // numbers
        arb_double().prop_map(Bson::Double),
        any::<i32>().prop_map(Bson::Int32),
        any::<i64>().prop_map(Bson::Int64),
        any::<i64>().prop_map(Bson::Timestamp),
        // strings
        any::<String>().prop_map(Bson::String),
        any::<String>().prop_map(Bson::JavaScript),
        any::<String>().prop_map(Bson::Symbol),
        (arb_cstring(), "[gimsux]{0,3}").prop_map(|(p, o)| Bson::RegularExpression(Regex::new(&p, &o))),
        // misc
        arb_binary().prop_map(Bson::Binary),
        arb_object_id().prop_map(Bson::ObjectId),
        arb_date_time().prop_map(Bson::DateTime),
    ]
}

fn doc_of(inner: BoxedStrategy<Bson>) -> impl Strategy<Value = Document> {
    prop::collection::btree_map(arb_name(), inner, 0..8).prop_map(Document::from)
}

/// arbitrary BSON value for use with proptest
pub fn arb_bson() -> impl Strategy<Value = Bson> {
    arb_leaf().prop_recursive(
        6,  // max depth
        64, // max nodes
        8,  // max items per collection
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Bson::Array),
                doc_of(inner.clone()).prop_map(Bson::Document),
                (any::<String>(), doc_of(inner))
                    .prop_map(|(code, scope)| Bson::JavaScriptWithScope(JavaScriptWithScope { code, scope })),
            ]
        },
    )
}

/// arbitrary top level document for use with proptest
pub fn arb_document() -> impl Strategy<Value = Document> { doc_of(arb_bson().boxed()) }
