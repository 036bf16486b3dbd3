use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use mboxsplit::classify::classify;
use mboxsplit::model::Record;
use mboxsplit::sanitize::{sanitize, DEFAULT_MAX_NAME_LEN};
use mboxsplit::split::{MemorySink, OutputLayout, Router};

const LABELS: &[&str] = &[
    "Inbox,Important,Opened",
    "Sent",
    "Archived,Category Updates,Opened",
    "Important,Unread,Clients/ACME Corp: 2024",
    "Spam",
    "",
];

fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify_labels", |b| {
        b.iter(|| {
            for labels in LABELS {
                black_box(classify(black_box(Some(*labels)), DEFAULT_MAX_NAME_LEN));
            }
        })
    });
}

fn bench_sanitize(c: &mut Criterion) {
    let long = "Projects/Clients: <Very> \"Long\" Label | ".repeat(10);
    c.bench_function("sanitize_long_label", |b| {
        b.iter(|| sanitize(black_box(&long), DEFAULT_MAX_NAME_LEN))
    });
}

fn bench_route_in_memory(c: &mut Criterion) {
    let messages: Vec<Vec<u8>> = (0..1000)
        .map(|i| {
            format!(
                "From {i}@x Thu Jan 04 10:00:00 2024\nX-Gmail-Labels: {}\nSubject: {i}\n\nbody\n\n",
                LABELS[i % LABELS.len()]
            )
            .into_bytes()
        })
        .collect();

    c.bench_function("route_1000_messages", |b| {
        b.iter(|| {
            let mut router = Router::new(OutputLayout::default(), MemorySink::new());
            for raw in &messages {
                router.route(&Record::parse(raw)).unwrap();
            }
            router.finish().unwrap().0
        })
    });
}

criterion_group!(benches, bench_classify, bench_sanitize, bench_route_in_memory);
criterion_main!(benches);
