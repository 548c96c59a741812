//! Working with Value trees and the serde bridge.
//!
//! Run with: cargo run --example dynamic_values

use serde::{Deserialize, Serialize};
use sigma::{from_str, from_value, sigma, to_string, to_value, Value};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct User {
    id: u32,
    name: String,
    roles: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Build config dynamically with sigma! macro; keys can be any value
    let config = sigma!({
        "host" => "localhost",
        "port" => 8080,
        "features" => ["auth", "logging"],
        [1, 2] => "a list key",
        "debug" => true
    });

    println!("Config as Sigma:\n{}\n", to_string(&config)?);

    // Access values dynamically
    if let Some(map) = config.as_map() {
        if let Some(host) = map.get(&Value::from("host")).and_then(Value::as_str) {
            println!("Accessing field 'host': {}", host);
        }

        if let Some(port) = map.get(&Value::from("port")).and_then(Value::as_i64) {
            println!("Accessing field 'port': {}", port);
        }

        if let Some(features) = map.get(&Value::from("features")).and_then(Value::as_list) {
            println!("Accessing field 'features': {} items\n", features.len());
        }
    }

    // Convert existing struct to Value
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        roles: vec!["admin".to_string(), "developer".to_string()],
    };

    let user_value = to_value(&user)?;
    let text = to_string(&user_value)?;
    println!("User as Sigma:\n{}\n", text);

    // And back through serde
    let value: Value = from_str(&text)?.ok_or("empty input")?;
    let user_back: User = from_value(value)?;
    assert_eq!(user, user_back);
    println!("✓ Round-trip through Value successful");

    Ok(())
}
