//! Seeded synthetic rows for the `people` demo, benches and tests.

pub mod people;

pub use people::{Address, Person, person_schema, random_people, vectorize_person};
