use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use sigma::{
    from_slice, from_str, from_value, sigma_record, to_string, to_value, to_vec,
    to_string_with_options, Bytes, Number, Types, Value, WriterOptions,
};

#[derive(Clone, Debug, Default, PartialEq)]
struct Product {
    sku: String,
    name: String,
    price: Option<Number>,
    quantity: u32,
    released: Option<NaiveDate>,
}

sigma_record!(Product {
    sku,
    name,
    price,
    quantity,
    released,
});

#[derive(Serialize, Deserialize, Clone)]
struct User {
    id: u32,
    name: String,
    email: String,
    active: bool,
}

fn product(i: u32) -> Product {
    Product {
        sku: format!("SKU{}", i),
        name: format!("Product {}", i),
        price: Some(Number::new(999.into(), 2)),
        quantity: i,
        released: NaiveDate::from_ymd_opt(2019, 1 + i % 12, 1 + i % 28),
    }
}

fn benchmark_write_record(c: &mut Criterion) {
    Types::register::<Product>("product").unwrap();
    let product = product(7);

    c.bench_function("write_record", |b| b.iter(|| to_string(black_box(&product))));
}

fn benchmark_read_record(c: &mut Criterion) {
    Types::register::<Product>("product").unwrap();
    let text = to_string(&product(7)).unwrap();

    c.bench_function("read_record", |b| {
        b.iter(|| from_str::<Product>(black_box(&text)))
    });
}

fn benchmark_record_list(c: &mut Criterion) {
    Types::register::<Product>("product").unwrap();
    let mut group = c.benchmark_group("record_list");

    for size in [10, 50, 100, 500].iter() {
        let products: Vec<Product> = (0..*size).map(product).collect();
        let text = to_string(&products).unwrap();

        group.bench_with_input(BenchmarkId::new("write", size), &products, |b, products| {
            b.iter(|| to_string(black_box(products)))
        });
        group.bench_with_input(BenchmarkId::new("read", size), &text, |b, text| {
            b.iter(|| from_str::<Vec<Product>>(black_box(text)))
        });
    }
    group.finish();
}

fn benchmark_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("strings");

    let plain = "This is a medium length string with some content";
    let escaped = "line one\nline \"two\"\ttabbed \\ and \u{1} control";
    let unicode = "grüße, こんにちは, 😀 and friends";

    for (name, s) in [("plain", plain), ("escaped", escaped), ("unicode", unicode)] {
        let text = to_string(s).unwrap();
        group.bench_function(format!("write_{}", name), |b| b.iter(|| to_string(black_box(s))));
        group.bench_function(format!("read_{}", name), |b| {
            b.iter(|| from_str::<String>(black_box(&text)))
        });
    }

    group.finish();
}

fn benchmark_numbers(c: &mut Criterion) {
    let mut group = c.benchmark_group("numbers");

    let integers: Vec<i64> = (0..100).map(|i| i * 1_000_003).collect();
    let decimals: Vec<Number> = (0..100)
        .map(|i| Number::new((i * 12_345).into(), i % 7))
        .collect();

    let integers_text = to_string(&integers).unwrap();
    let decimals_text = to_string(&decimals).unwrap();

    group.bench_function("write_integers", |b| b.iter(|| to_string(black_box(&integers))));
    group.bench_function("write_decimals", |b| b.iter(|| to_string(black_box(&decimals))));
    group.bench_function("read_integers", |b| {
        b.iter(|| from_str::<Vec<i64>>(black_box(&integers_text)))
    });
    group.bench_function("read_decimals", |b| {
        b.iter(|| from_str::<Vec<Number>>(black_box(&decimals_text)))
    });

    group.finish();
}

fn benchmark_binary(c: &mut Criterion) {
    let mut group = c.benchmark_group("binary");
    let blob = Bytes((0..4096u32).map(|i| (i % 251) as u8).collect());

    let raw = to_vec(&blob).unwrap();
    let base64 = to_string_with_options(&blob, WriterOptions::base64()).unwrap();

    group.bench_function("write_raw", |b| b.iter(|| to_vec(black_box(&blob))));
    group.bench_function("write_base64", |b| {
        b.iter(|| to_string_with_options(black_box(&blob), WriterOptions::base64()))
    });
    group.bench_function("read_raw", |b| b.iter(|| from_slice::<Bytes>(black_box(&raw))));
    group.bench_function("read_base64", |b| {
        b.iter(|| from_str::<Bytes>(black_box(&base64)))
    });

    group.finish();
}

fn benchmark_comparison_with_json(c: &mut Criterion) {
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        active: true,
    };

    let mut group = c.benchmark_group("comparison");

    group.bench_function("sigma_serialize", |b| {
        b.iter(|| to_value(black_box(&user)).and_then(|v| to_string(&v)))
    });

    group.bench_function("json_serialize", |b| {
        b.iter(|| serde_json::to_string(black_box(&user)))
    });

    let sigma_str = to_string(&to_value(&user).unwrap()).unwrap();
    let json_str = serde_json::to_string(&user).unwrap();

    group.bench_function("sigma_deserialize", |b| {
        b.iter(|| {
            from_str::<Value>(black_box(&sigma_str))
                .and_then(|v| from_value::<User>(v.unwrap_or(Value::Null)))
        })
    });

    group.bench_function("json_deserialize", |b| {
        b.iter(|| serde_json::from_str::<User>(black_box(&json_str)))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_write_record,
    benchmark_read_record,
    benchmark_record_list,
    benchmark_strings,
    benchmark_numbers,
    benchmark_binary,
    benchmark_comparison_with_json
);
criterion_main!(benches);
