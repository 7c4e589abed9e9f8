use criterion::{criterion_group, criterion_main};


criterion_group!(
    benches,
    network::mqtt::bench_encode_publish,
    network::mqtt::bench_decode_frames,
    network::mqtt::bench_publish_round_trip
);
criterion_main!(benches);
