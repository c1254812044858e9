//! # Adapter Benchmarks
//!
//! Overhead the adapter adds on top of the session call itself:
//!
//! | Path | Measures |
//! |------|----------|
//! | `arun` | queue, worker hand-off, completion channel |
//! | `run(.., false)` | gate acquisition only |
//! | `afetch` | queued call plus record selection |
//! | `OperationName::parse` | name classification |

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use p4_async::{InMemorySession, OperationName, P4Async, Record};
use tokio::runtime::Runtime;

fn server() -> P4Async<InMemorySession> {
    let session = InMemorySession::new()
        .respond("info", vec![Record::spec([("serverVersion", "P4D/2024.1")])])
        .respond(
            "client",
            vec![Record::text("warning"), Record::spec([("Client", "ws1")])],
        );
    P4Async::new(session).expect("adapter starts")
}

fn bench_round_trips(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime starts");
    let adapter = server();

    let mut group = c.benchmark_group("adapter-round-trip");

    group.bench_function("arun_queued", |b| {
        b.iter(|| rt.block_on(adapter.arun(black_box("info"), &[])).unwrap())
    });

    group.bench_function("run_inline", |b| {
        b.iter(|| {
            adapter
                .run(black_box("info"), &[], false)
                .into_completed()
                .unwrap()
                .unwrap()
        })
    });

    group.bench_function("afetch_queued", |b| {
        b.iter(|| rt.block_on(adapter.afetch(black_box("client"), &["ws1"])).unwrap())
    });

    group.finish();
}

fn bench_name_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("operation-name");
    for name in ["arun_files", "adelete_shelve", "aiterate_clients", "afoobar"] {
        group.bench_function(name, |b| b.iter(|| OperationName::parse(black_box(name))));
    }
    group.finish();
}

criterion_group!(benches, bench_round_trips, bench_name_classification);
criterion_main!(benches);
