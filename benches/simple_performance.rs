use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use sms_core::ProviderError;
use sms_twilio::{parse_error, parse_message};
use twilio_notify::SmsResult;

fn message_payload(body_len: usize) -> serde_json::Value {
    json!({
        "sid": "SM0123456789abcdef0123456789abcdef",
        "price": "-0.00750",
        "price_unit": "USD",
        "status": "queued",
        "num_segments": "1",
        "body": "x".repeat(body_len),
        "date_created": "Thu, 30 Jul 2015 20:12:31 +0000",
        "date_sent": "Thu, 30 Jul 2015 20:12:33 +0000"
    })
}

fn benchmark_response_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("response_mapping");

    for size in [10, 160, 1600] {
        let payload = message_payload(size);
        group.bench_with_input(BenchmarkId::new("parse_and_flatten", size), &size, |b, _| {
            b.iter(|| {
                let sent = parse_message(black_box(payload.clone())).unwrap();
                black_box(SmsResult::from(sent))
            })
        });
    }

    group.finish();
}

fn benchmark_error_mapping(c: &mut Criterion) {
    let body = r#"{"code": 21211, "message": "The 'To' number is not a valid phone number.", "more_info": "https://www.twilio.com/docs/errors/21211", "status": 400}"#;

    let mut group = c.benchmark_group("error_mapping");

    group.bench_function("json_envelope", |b| {
        b.iter(|| black_box(SmsResult::from(parse_error(400, black_box(body)))))
    });

    group.bench_function("plain_body", |b| {
        b.iter(|| {
            black_box(SmsResult::from(ProviderError {
                code: None,
                message: black_box("Service Unavailable").to_string(),
                status: 503,
            }))
        })
    });

    group.finish();
}

fn benchmark_configuration_loading(c: &mut Criterion) {
    use twilio_notify::config::AppConfig;

    let mut group = c.benchmark_group("configuration");

    group.bench_function("create_default", |b| {
        b.iter(|| black_box(AppConfig::default()))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_response_mapping,
    benchmark_error_mapping,
    benchmark_configuration_loading
);

criterion_main!(benches);
