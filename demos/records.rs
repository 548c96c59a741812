//! Registering record types and reading them by name.
//!
//! Run with: cargo run --example records

use chrono::NaiveDate;
use sigma::{from_str, sigma_record, to_string, Types, Value};
use std::error::Error;

#[derive(Clone, Debug, Default, PartialEq)]
struct Address {
    street: String,
    city: String,
}

sigma_record!(Address { street, city });

#[derive(Clone, Debug, Default, PartialEq)]
struct Person {
    name: String,
    born: Option<NaiveDate>,
    address: Option<Address>,
    tags: Vec<String>,
}

sigma_record!(Person {
    name,
    born as "dateOfBirth",
    address,
    tags,
} readonly {
    "initial" => |p| Ok(Value::from(p.name.chars().next().map(String::from))),
});

fn main() -> Result<(), Box<dyn Error>> {
    Types::register::<Address>("address")?;
    Types::register::<Person>("person")?;

    let person = Person {
        name: "Ada".to_string(),
        born: NaiveDate::from_ymd_opt(1815, 12, 10),
        address: Some(Address {
            street: "12 St James's Square".to_string(),
            city: "London".to_string(),
        }),
        tags: vec!["mathematician".to_string()],
    };

    let text = to_string(&person)?;
    println!("Written:\n{}\n", text);

    let back: Person = from_str(&text)?.ok_or("empty input")?;
    assert_eq!(person, back);
    println!("✓ Round-trip successful");

    // Type and field names match in any case; missing fields keep their defaults
    let partial: Person = from_str(r#"PERSON { Name = "Grace" }"#)?.ok_or("empty input")?;
    println!("Partial record: {:?}", partial);

    // Read-only fields are never written and cannot be assigned
    match from_str::<Person>(r#"person{initial="G"}"#) {
        Ok(_) => println!("unexpected success"),
        Err(err) => println!("Expected error: {}", err),
    }

    Ok(())
}
