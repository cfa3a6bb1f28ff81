pub mod coerce;
pub mod entity;
pub mod registry;
pub mod schema;
pub mod value;
