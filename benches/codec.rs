use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};

use cton::{decode, encode, from_str, to_string, EncodeOptions};

#[derive(Serialize, Deserialize, Clone)]
struct User {
    id: u32,
    name: String,
    email: String,
    active: bool,
}

#[derive(Serialize, Deserialize, Clone)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

fn benchmark_encode_simple(c: &mut Criterion) {
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        active: true,
    };

    c.bench_function("encode_simple_struct", |b| {
        b.iter(|| to_string(black_box(&user)))
    });
}

fn benchmark_decode_simple(c: &mut Criterion) {
    let text = "id=123\nname=Alice\nemail=alice@example.com\nactive=true";

    c.bench_function("decode_simple_struct", |b| {
        b.iter(|| from_str::<User>(black_box(text)))
    });
}

fn benchmark_encode_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_table");

    for size in [10, 100, 500].iter() {
        let products: Vec<Product> = (0..*size)
            .map(|i| Product {
                sku: format!("SKU-{i:05}"),
                name: format!("Product {i}"),
                price: 9.25 + i as f64 * 0.5,
                quantity: i as u32 % 17,
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &products, |b, products| {
            b.iter(|| to_string(black_box(products)))
        });
    }
    group.finish();
}

fn benchmark_decode_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_table");

    for size in [10, 100, 500].iter() {
        let products: Vec<Product> = (0..*size)
            .map(|i| Product {
                sku: format!("SKU-{i:05}"),
                name: format!("Product {i}"),
                price: 9.25 + i as f64 * 0.5,
                quantity: i as u32 % 17,
            })
            .collect();
        let text = to_string(&products).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| decode(black_box(text)))
        });
    }
    group.finish();
}

fn benchmark_separator_less_decode(c: &mut Criterion) {
    let value = cton::cton!({
        "a": 1, "bb": 22, "ccc": 333, "dddd": 4444, "eeeee": 55555
    });
    let packed = encode(&value, &EncodeOptions::new().with_separator("")).unwrap();

    c.bench_function("decode_separator_less", |b| {
        b.iter(|| decode(black_box(&packed)))
    });
}

criterion_group!(
    benches,
    benchmark_encode_simple,
    benchmark_decode_simple,
    benchmark_encode_table,
    benchmark_decode_table,
    benchmark_separator_less_decode
);
criterion_main!(benches);
