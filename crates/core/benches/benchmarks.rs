//! Benchmarks for ofxkit-core.
//!
//! Run with: `cargo bench -p ofxkit-core`
//!
//! Results are saved to `target/criterion/` with HTML reports.

use std::ffi::c_void;
use std::ptr;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ofxkit_core::{StatusCode, SuiteKind, SuiteRegistry};
use ofxkit_ffi::{kOfxStatOK, OfxMemorySuiteV1};

static MEMORY: OfxMemorySuiteV1 = OfxMemorySuiteV1 {
    memoryAlloc: None,
    memoryFree: None,
};

fn lookup(name: &str, version: u32) -> Option<*const c_void> {
    (name == "OfxMemorySuite" && version == 1)
        .then(|| &MEMORY as *const OfxMemorySuiteV1 as *const c_void)
}

/// Translate every defined code plus a spread of out-of-range values.
fn bench_from_raw(c: &mut Criterion) {
    let mut group = c.benchmark_group("from_raw");

    let defined: Vec<i32> = (-1..=14).collect();
    group.throughput(Throughput::Elements(defined.len() as u64));
    group.bench_function("defined", |b| {
        b.iter(|| {
            for raw in &defined {
                black_box(StatusCode::from_raw(black_box(*raw)));
            }
        })
    });

    let unknown: Vec<i32> = (0..1024).map(|i| i * 7919 + 15).collect();
    group.throughput(Throughput::Elements(unknown.len() as u64));
    group.bench_function("unknown", |b| {
        b.iter(|| {
            for raw in &unknown {
                black_box(StatusCode::from_raw(black_box(*raw)));
            }
        })
    });

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for input in ["kOfxStatErrBadHandle", "bad-handle", "  OK  ", "nonsense"] {
        group.bench_with_input(BenchmarkId::new("input", input.trim()), &input, |b, input| {
            b.iter(|| black_box(input.parse::<StatusCode>()))
        });
    }

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let registry = unsafe { SuiteRegistry::new(lookup) };
    let mut group = c.benchmark_group("resolve");

    group.bench_function("hit", |b| {
        b.iter(|| black_box(registry.resolve(black_box("OfxMemorySuite"), 1)))
    });
    group.bench_function("not_provided", |b| {
        b.iter(|| black_box(registry.resolve(black_box("OfxPropertySuite"), 1)))
    });
    group.bench_function("not_catalogued", |b| {
        b.iter(|| black_box(registry.resolve(black_box("OfxInteractSuite"), 1)))
    });
    group.bench_function("negotiate_fallback", |b| {
        b.iter(|| black_box(registry.negotiate(black_box("OfxMemorySuite"), &[2, 1])))
    });
    group.bench_function("catalogue_lookup", |b| {
        b.iter(|| black_box(SuiteKind::lookup(black_box("OfxTimeLineSuite"), 1)))
    });

    group.finish();
}

fn bench_call(c: &mut Criterion) {
    let registry = unsafe { SuiteRegistry::new(lookup) };
    let Ok(handle) = registry.resolve("OfxMemorySuite", 1) else {
        return;
    };

    c.bench_function("call", |b| {
        b.iter(|| {
            let result = unsafe {
                registry.call::<ofxkit_core::MemorySuite<'_>, *mut c_void, _>(&handle, |_, out| {
                    out.write(ptr::null_mut());
                    kOfxStatOK
                })
            };
            black_box(result)
        })
    });
}

criterion_group!(benches, bench_from_raw, bench_parse, bench_resolve, bench_call);

criterion_main!(benches);
