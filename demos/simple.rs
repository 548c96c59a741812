//! Basic Sigma reading and writing.
//!
//! Run with: cargo run --example simple

use chrono::NaiveDate;
use sigma::{from_str, to_string, to_vec, Bytes, Number, Value};
use std::collections::BTreeMap;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let mut prices: BTreeMap<String, Number> = BTreeMap::new();
    prices.insert("coffee".to_string(), "3.50".parse()?);
    prices.insert("tea".to_string(), "2.25".parse()?);

    // Write typed values
    let text = to_string(&prices)?;
    println!("Sigma output:\n{}\n", text);

    // Read them back; trailing zeros survive
    let prices_back: BTreeMap<String, Number> = from_str(&text)?.ok_or("empty input")?;
    assert_eq!(prices, prices_back);
    println!("✓ Round-trip successful");

    // Read without knowing the shape up front
    let value: Value = from_str(r#"["launch", @2019-08-21, 1.23e-97, &t, &n]"#)?
        .ok_or("empty input")?;
    println!("Dynamic value: {}", to_string(&value)?);

    let launch: NaiveDate = from_str("@2019-08-21")?.ok_or("empty input")?;
    println!("Typed date: {}", launch);

    // Raw binary is not text, so write it to bytes
    let encoded = to_vec(&Bytes(vec![0xCA, 0xFE]))?;
    println!("Binary output: {:?}", encoded);

    Ok(())
}
