//! Frame codec benchmarks: raw frames by payload size and a full chat
//! envelope encode/decode.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use governance_agent::chat::{ChatMessage, Envelope, ProtocolMessage};
use governance_agent::transport::codec::{
    decode_json, read_frame, write_frame, write_json, MSG_ENVELOPE, MSG_REPLY,
};
use governance_agent::types::AgentAddress;
use std::io::Cursor;

const MAX_FRAME: u32 = 1024 * 1024;

fn bench_frames(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("frame");

    for size in [0usize, 256, 4096, 65536] {
        let payload = vec![b'x'; size];
        let wire = rt.block_on(async {
            let mut buf = Vec::with_capacity(size + 5);
            write_frame(&mut buf, MSG_REPLY, &payload).await.unwrap();
            buf
        });

        group.bench_with_input(BenchmarkId::new("write", size), &payload, |b, p| {
            b.iter(|| {
                rt.block_on(async {
                    let mut buf = Vec::with_capacity(p.len() + 5);
                    write_frame(&mut buf, MSG_REPLY, black_box(p)).await.unwrap();
                    buf
                })
            });
        });
        group.bench_with_input(BenchmarkId::new("read", size), &wire, |b, w| {
            b.iter(|| {
                rt.block_on(async {
                    let mut cursor = Cursor::new(black_box(w.as_slice()));
                    read_frame(&mut cursor, MAX_FRAME).await.unwrap()
                })
            });
        });
    }
    group.finish();
}

fn bench_envelope(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let envelope = Envelope::new(
        AgentAddress::from_string("agent1qbench".to_string()).unwrap(),
        ProtocolMessage::ChatMessage(ChatMessage::text(
            "Show me the latest open governance proposals and the current ICP price",
        )),
    );

    c.bench_function("envelope_encode_decode", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut buf = Vec::new();
                write_json(&mut buf, MSG_ENVELOPE, black_box(&envelope))
                    .await
                    .unwrap();
                let mut cursor = Cursor::new(buf);
                let (_, payload) = read_frame(&mut cursor, MAX_FRAME).await.unwrap().unwrap();
                decode_json::<Envelope>(&payload).unwrap()
            })
        });
    });
}

criterion_group!(benches, bench_frames, bench_envelope);
criterion_main!(benches);
