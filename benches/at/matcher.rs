use criterion::{BatchSize, Criterion, Throughput, black_box};
use esplink::network::ByteSource;
use esplink::network::Write;
use esplink::network::at::{Mode, Modem, ModemConfig, ResponseBuffer, await_terminator};
use esplink::system::clock::Clock;
use std::cell::Cell;
use std::collections::VecDeque;

struct Replay(VecDeque<u8>);

impl ByteSource for Replay {
    fn available(&mut self) -> bool {
        !self.0.is_empty()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.0.pop_front()
    }
}

impl Write for Replay {
    type Error = ();

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Default)]
struct Ticks(Cell<u64>);

impl Clock for Ticks {
    fn now_ms(&self) -> u64 {
        let now = self.0.get();
        self.0.set(now + 1);
        now
    }
}

fn replay(bytes: &[u8]) -> Replay {
    Replay(bytes.iter().copied().collect())
}

pub fn bench_await_ok(c: &mut Criterion) {
    let mut input = b"AT+CIFSR\r\r\n+CIFSR:STAIP,\"192.168.1.7\"\r\n".repeat(8);
    input.extend_from_slice(b"\r\nOK\r\n");

    let mut group = c.benchmark_group("await_terminator");
    group.throughput(Throughput::Bytes(input.len() as u64));
    group.bench_function("ok_after_noise", |b| {
        b.iter_batched_ref(
            || (ResponseBuffer::<2048>::new(), replay(&input)),
            |(buffer, source)| {
                let clock = Ticks::default();
                black_box(await_terminator(buffer, source, &clock, 100_000, b"OK\r\n", None))
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

pub fn bench_listen(c: &mut Criterion) {
    let input = b"0,CONNECT\r\n\r\n+IPD,0,18:GET /temp HTTP/1.1\r\nOK\r\n";
    let config = ModemConfig::new(Mode::AccessPointServer, "bench", "bench").unwrap();

    c.bench_function("listen_one_frame", |b| {
        b.iter_batched_ref(
            || -> Modem<_, _> { Modem::new(replay(input), Ticks::default(), config.clone()) },
            |modem| black_box(modem.listen(10_000)),
            BatchSize::SmallInput,
        )
    });
}
