use criterion::{criterion_group, criterion_main};

mod at;

criterion_group!(
    benches,
    at::frame::bench_decode,
    at::frame::bench_request_line,
    at::matcher::bench_await_ok,
    at::matcher::bench_listen
);
criterion_main!(benches);
