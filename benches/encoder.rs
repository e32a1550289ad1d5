#[macro_use]
extern crate criterion;

use bson_io::prelude::*;
use criterion::{black_box, Criterion};

const N_BIG_ARR: usize = 2000;

fn big_arr() -> Document {
    let v: Vec<Bson> = (0..N_BIG_ARR).map(|i| Bson::from(i as i64)).collect();
    let mut doc = Document::new();
    doc.insert("values", v);
    doc
}

const N_ARR: usize = 10;
const N_DOC: usize = 10;

fn big_doc() -> Document {
    let v0: Vec<Bson> = (0..N_ARR).map(|i| Bson::from(i as i64)).collect();
    let d: Document = (0..N_DOC)
        .map(|i| (format!("field{}", i), Bson::from(v0.clone())))
        .collect();
    let mut doc = Document::new();
    doc.insert("_id", ObjectId::from_bytes([1; 12]));
    doc.insert("name", "a reasonably long string value");
    doc.insert("nested", vec![Bson::from(d); N_ARR]);
    doc
}

fn encoded_len(doc: &Document) -> usize { encode_full(doc).map(|v| v.len()).unwrap_or(0) }

fn bench_construction(c: &mut Criterion) {
    c.bench_function(
        &format!("Creating a document of size {}", encoded_len(&big_doc())),
        |b| b.iter(|| black_box(big_doc())),
    );
}

fn bench_enc(c: &mut Criterion) {
    let doc = big_doc();
    let enc_len = encoded_len(&doc);
    c.bench_function(
        &format!("Encoding a document, output size of {} bytes", enc_len),
        move |b| b.iter(|| encode_full(black_box(&doc)).unwrap()),
    );
}

fn bench_enc_reused_writer(c: &mut Criterion) {
    let doc = big_doc();
    let enc_len = encoded_len(&doc);
    c.bench_function(
        &format!(
            "Encoding a document, output size of {} bytes, writer reused",
            enc_len
        ),
        move |b| {
            let mut w = BinaryWriter::with_output(std::io::sink(), BinaryWriterSettings::default());
            b.iter(|| {
                encode(black_box(&doc), &mut w).unwrap();
                w.flush().unwrap();
            })
        },
    );
}

fn bench_dec(c: &mut Criterion) {
    let doc = big_doc();
    let enc = encode_full(&doc).unwrap();
    c.bench_function(
        &format!("Decoding a document, input size of {} bytes", enc.len()),
        move |b| b.iter(|| decode_full(black_box(&enc)).unwrap()),
    );
}

fn bench_skip(c: &mut Criterion) {
    let doc = big_doc();
    let enc = encode_full(&doc).unwrap();
    c.bench_function(
        &format!("Skipping a document, input size of {} bytes", enc.len()),
        move |b| {
            b.iter(|| {
                let mut r = BinaryReader::new(black_box(&enc), BinaryReaderSettings::default());
                r.read_start_document().unwrap();
                while r.skip_element().unwrap() {}
                r.read_end_document().unwrap();
            })
        },
    );
}

fn bench_enc_flat(c: &mut Criterion) {
    let doc = big_arr();
    let enc_len = encoded_len(&doc);
    c.bench_function(
        &format!("Encoding an array, output size of {} bytes", enc_len),
        move |b| b.iter(|| encode_full(black_box(&doc)).unwrap()),
    );
}

fn bench_dec_flat(c: &mut Criterion) {
    let doc = big_arr();
    let enc = encode_full(&doc).unwrap();
    c.bench_function(
        &format!("Decoding an array of length {}", N_BIG_ARR),
        move |b| b.iter(|| decode_full(black_box(&enc)).unwrap()),
    );
}

criterion_group!(
    benches,
    bench_construction,
    bench_enc,
    bench_enc_reused_writer,
    bench_dec,
    bench_skip,
    bench_enc_flat,
    bench_dec_flat
);
criterion_main!(benches);
