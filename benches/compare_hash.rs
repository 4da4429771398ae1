//! Benchmarks for the structural engine.
//!
//! Measures schema-directed ordering, hashing, deep copy and binary
//! comparison over records of growing width.
//!
//! # Configuration
//!
//! - `BENCH_SAMPLE_SIZE`: Number of samples to collect (default: 100)
//! - `BENCH_MEASUREMENT_TIME`: Measurement time in seconds (default: 5)
//! - `BENCH_WARM_UP_TIME`: Warm-up time in seconds (default: 3)
//!
//! ```bash
//! BENCH_SAMPLE_SIZE=50 BENCH_MEASUREMENT_TIME=3 cargo bench
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use avro_generic::{
    binary_compare, AvroSchema, BigDecimal, BinaryEncoder, FieldSchema, GenericData, GenericDatumWriter,
    LogicalType, LogicalTypeName, Record, RecordSchema, Value,
};

/// Configure Criterion from environment variables.
fn configure_criterion() -> Criterion {
    let mut criterion = Criterion::default();

    if let Some(size) = env_parse::<usize>("BENCH_SAMPLE_SIZE") {
        criterion = criterion.sample_size(size);
    }
    if let Some(secs) = env_parse::<u64>("BENCH_MEASUREMENT_TIME") {
        criterion = criterion.measurement_time(Duration::from_secs(secs));
    }
    if let Some(secs) = env_parse::<u64>("BENCH_WARM_UP_TIME") {
        criterion = criterion.warm_up_time(Duration::from_secs(secs));
    }
    criterion
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => {
            eprintln!("Configured {}: {}", name, raw);
            Some(value)
        }
        Err(_) => {
            eprintln!("Warning: Invalid {} value: {}", name, raw);
            None
        }
    }
}

fn decimal() -> AvroSchema {
    AvroSchema::Logical(LogicalType::new(
        AvroSchema::Bytes,
        LogicalTypeName::Decimal { precision: 18, scale: 4 },
    ))
}

/// A record with `width` groups of (long, string, double, decimal) fields.
fn wide_record(width: usize, seed: i64) -> (AvroSchema, Value) {
    let mut fields = Vec::with_capacity(width * 4);
    for i in 0..width {
        fields.push(FieldSchema::new(format!("id{}", i), AvroSchema::Long));
        fields.push(FieldSchema::new(format!("name{}", i), AvroSchema::String));
        fields.push(FieldSchema::new(format!("score{}", i), AvroSchema::Double));
        fields.push(FieldSchema::new(format!("amount{}", i), decimal()));
    }
    let schema = Arc::new(RecordSchema::new("Wide", fields));
    let mut record = Record::new(Arc::clone(&schema));
    for i in 0..width {
        let base = i * 4;
        let n = seed + i as i64;
        record.put(base, n).unwrap();
        record.put(base + 1, format!("name-{}", n)).unwrap();
        record.put(base + 2, n as f64 * 0.5).unwrap();
        record.put(base + 3, BigDecimal::new(n * 10_000 + 1234, 4)).unwrap();
    }
    (AvroSchema::Record(schema), Value::Record(record))
}

fn encode(data: &GenericData, schema: &AvroSchema, value: &Value) -> Vec<u8> {
    let mut encoder = BinaryEncoder::new();
    GenericDatumWriter::new(data, schema.clone())
        .write(value, &mut encoder)
        .unwrap();
    encoder.into_inner()
}

fn bench_engine(c: &mut Criterion) {
    let data = GenericData::new();
    let mut group = c.benchmark_group("engine");

    for width in [1usize, 8, 64] {
        let (schema, a) = wide_record(width, 1);
        let (_, b) = wide_record(width, 2);
        group.throughput(Throughput::Elements((width * 4) as u64));

        group.bench_with_input(BenchmarkId::new("compare", width), &width, |bench, _| {
            bench.iter(|| black_box(data.compare(&a, &b, &schema).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("hash_code", width), &width, |bench, _| {
            bench.iter(|| black_box(data.hash_code(&a, &schema).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("deep_copy", width), &width, |bench, _| {
            bench.iter(|| black_box(data.deep_copy(&schema, &a).unwrap()));
        });

        let left = encode(&data, &schema, &a);
        let right = encode(&data, &schema, &b);
        group.bench_with_input(BenchmarkId::new("binary_compare", width), &width, |bench, _| {
            bench.iter(|| black_box(binary_compare(&left, &right, &schema).unwrap()));
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = bench_engine
}

criterion_main!(benches);
