use bson_io::prelude::*;
use bson_strategy::*;
use proptest::prelude::*;

fn declared_len(bytes: &[u8]) -> usize {
    i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 1_000, ..ProptestConfig::default() })]

    #[test]
    fn encode_decode(doc in arb_document()) {
        let enc = encode_full(&doc).unwrap();
        prop_assert_eq!(declared_len(&enc), enc.len());

        let dec = decode_full(&enc).unwrap();
        prop_assert_eq!(dec, doc);
    }

    #[test]
    fn skipping_visits_every_element(doc in arb_document()) {
        let enc = encode_full(&doc).unwrap();
        let mut r = BinaryReader::new(&enc, BinaryReaderSettings::default());
        r.read_start_document().unwrap();

        let mut skipped = 0;
        while r.skip_element().unwrap() {
            skipped += 1;
        }
        prop_assert_eq!(skipped, doc.len());

        r.read_end_document().unwrap();
        prop_assert!(r.is_at_end_of_file());
        prop_assert_eq!(r.state(), State::Done);
    }

    #[test]
    fn streamed_documents_decode_in_order(docs in prop::collection::vec(arb_document(), 1..4)) {
        let mut w = BinaryWriter::with_output(Vec::new(), BinaryWriterSettings::default());
        for doc in &docs {
            encode(doc, &mut w).unwrap();
            w.flush().unwrap();
        }
        w.close();

        let bytes = w.get_ref().unwrap().clone();
        let mut r = BinaryReader::new(&bytes, BinaryReaderSettings::default());
        for doc in &docs {
            prop_assert_eq!(&decode(&mut r).unwrap(), doc);
        }
        prop_assert!(r.is_at_end_of_file());
    }

    #[test]
    fn truncation_is_always_malformed(doc in arb_document(), cut in any::<prop::sample::Index>()) {
        let enc = encode_full(&doc).unwrap();
        let cut = cut.index(enc.len());
        let err = decode_full(&enc[..cut]).unwrap_err();
        prop_assert!(err.is_malformed(), "cut at {} gave {:?}", cut, err);
    }
}
