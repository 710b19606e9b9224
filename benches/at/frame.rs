use criterion::{Criterion, Throughput, black_box};
use esplink::network::at::frame;

const LINES: &[&[u8]] = &[
    b"+IPD,0,18:GET /temp HTTP/1.1\r\n",
    b"+IPD,3,14:GET / HTTP/1.1\r\n",
    b"+IPD,1,22,192.168.4.2,51234:GET /status HTTP/1.1\r\n",
    b"+IPD,0,40:GET /a-very-long-resource-name HTTP/1.1\r\n",
    b"+IPD,x,5:GET /\r\n",
];

pub fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_decode");
    let bytes: usize = LINES.iter().map(|line| line.len()).sum();
    group.throughput(Throughput::Bytes(bytes as u64));
    group.bench_function("decode", |b| {
        b.iter(|| {
            for line in LINES {
                black_box(frame::decode(black_box(line)));
            }
        })
    });
    group.finish();
}

pub fn bench_request_line(c: &mut Criterion) {
    c.bench_function("parse_request_line", |b| {
        b.iter(|| frame::parse_request_line(black_box(b"GET /temperature HTTP/1.1\r\n")))
    });
}
