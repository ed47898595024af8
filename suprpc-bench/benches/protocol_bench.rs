//! XML-RPC encoding/decoding benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use suprpc_protocol::{Decoder, Encoder, MethodCall, Response, Value};

fn create_test_request(payload_size: usize) -> MethodCall {
    MethodCall::new("supervisor.sendProcessStdin")
        .arg("group:web")
        .arg("x".repeat(payload_size))
}

fn process_info(index: usize) -> Value {
    Value::structure([
        ("name", Value::from(format!("worker-{}", index))),
        ("group", Value::from("workers")),
        ("description", Value::from("pid 4242, uptime 1 day, 2:03:04")),
        ("start", Value::Int(1_700_000_000)),
        ("stop", Value::Int(0)),
        ("now", Value::Int(1_700_093_784)),
        ("state", Value::Int(20)),
        ("statename", Value::from("RUNNING")),
        ("spawnerr", Value::from("")),
        ("exitstatus", Value::Int(0)),
        ("logfile", Value::from("/var/log/supervisor/worker.log")),
        ("stdout_logfile", Value::from("/var/log/supervisor/worker.log")),
        ("stderr_logfile", Value::from("")),
        ("pid", Value::Int(4242 + index as i32)),
    ])
}

/// A `getAllProcessInfo` reply with `count` processes.
fn create_test_response(count: usize) -> Response {
    Response::ok(Value::Array((0..count).map(process_info).collect()))
}

fn bench_request_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_encode");

    for size in [100, 1000, 10000] {
        let request = create_test_request(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &request, |b, request| {
            b.iter(|| black_box(Encoder::encode_request(request).unwrap()));
        });
    }

    group.finish();
}

fn bench_request_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_decode");

    for size in [100, 1000, 10000] {
        let encoded = Encoder::encode_request(&create_test_request(size)).unwrap();

        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &encoded, |b, encoded| {
            b.iter(|| black_box(Decoder::decode_request(encoded).unwrap()));
        });
    }

    group.finish();
}

fn bench_response_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("response_encode");

    for count in [1, 10, 100] {
        let response = create_test_response(count);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(count),
            &response,
            |b, response| {
                b.iter(|| black_box(Encoder::encode_response(response).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_response_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("response_decode");

    for count in [1, 10, 100] {
        let encoded = Encoder::encode_response(&create_test_response(count)).unwrap();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &encoded, |b, encoded| {
            b.iter(|| black_box(Decoder::decode_response(encoded).unwrap()));
        });
    }

    group.finish();
}

fn bench_fault_decode(c: &mut Criterion) {
    let encoded = Encoder::encode_response(&Response::fault(70, "NOT_RUNNING: web")).unwrap();

    c.bench_function("fault_decode", |b| {
        b.iter(|| black_box(Decoder::decode_response(&encoded).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_request_encode,
    bench_request_decode,
    bench_response_encode,
    bench_response_decode,
    bench_fault_decode,
);

criterion_main!(benches);
