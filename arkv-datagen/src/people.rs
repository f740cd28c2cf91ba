//! Deterministic synthetic "people" rows.
//!
//! The shape (a flat person with a nested address struct) is what the
//! analytics demo and the reader pipeline tests filter and group on.

use std::sync::Arc;

use arkv_result::Result;
use arkv_types::BatchBuilder;
use arrow::datatypes::{DataType, Field, Fields, Schema, SchemaRef};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const FIRST_NAMES: &[&str] = &["John", "Jane", "Gerard", "Aubrey", "Amelia"];
pub const LAST_NAMES: &[&str] = &["Smith", "Parker", "Phillips", "Jones"];
pub const STREETS: &[&str] = &["Halloway", "Sunset Boulvard", "Wall Street", "Secret Passageway"];
pub const CITIES: &[&str] = &["Brussels", "Paris", "London", "Amsterdam"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub street_number: i32,
    pub city: String,
    pub postal_code: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub address: Address,
}

fn pick<'a>(rng: &mut StdRng, options: &[&'a str]) -> &'a str {
    options[rng.random_range(0..options.len())]
}

/// `count` people drawn from a generator seeded with `seed`.
pub fn random_people(count: usize, seed: u64) -> Vec<Person> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| Person {
            first_name: pick(&mut rng, FIRST_NAMES).to_string(),
            last_name: pick(&mut rng, LAST_NAMES).to_string(),
            age: rng.random_range(0..120),
            address: Address {
                street: pick(&mut rng, STREETS).to_string(),
                street_number: rng.random_range(1..3000),
                city: pick(&mut rng, CITIES).to_string(),
                postal_code: rng.random_range(1000..10000),
            },
        })
        .collect()
}

pub fn address_fields() -> Fields {
    Fields::from(vec![
        Field::new("street", DataType::Utf8, true),
        Field::new("streetNumber", DataType::Int32, true),
        Field::new("city", DataType::Utf8, true),
        Field::new("postalCode", DataType::Int32, true),
    ])
}

pub fn person_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("firstName", DataType::Utf8, true),
        Field::new("lastName", DataType::Utf8, true),
        Field::new("age", DataType::Int32, true),
        Field::new("address", DataType::Struct(address_fields()), true),
    ]))
}

/// Vectorize callback writing `person` into row `index` of `batch`.
pub fn vectorize_person(person: &Person, index: usize, batch: &mut BatchBuilder) -> Result<()> {
    batch.set("firstName", index, person.first_name.as_str())?;
    batch.set("lastName", index, person.last_name.as_str())?;
    batch.set("age", index, person.age)?;
    batch.set("address.street", index, person.address.street.as_str())?;
    batch.set("address.streetNumber", index, person.address.street_number)?;
    batch.set("address.city", index, person.address.city.as_str())?;
    batch.set("address.postalCode", index, person.address.postal_code)?;
    Ok(())
}
