//! Lodgebook core: a keyed entity store mirrored to one JSON file, driven
//! by a line console that accepts two command grammars.
//!
//! The crate performs no console I/O itself; the shell in the `lodgebook`
//! binary reads lines, hands them to [`parse::parse_line`], and prints the
//! [`dispatch::Response`] that comes back.
//!
//! # Modules
//!
//! - [`model`]: entity variants, typed attribute values, timestamps
//! - [`store`]: the keyed in-memory store and its JSON backing file
//! - [`parse`]: both console grammars, reduced to one request shape
//! - [`command`]: the normalized request passed from parser to dispatcher
//! - [`dispatch`]: one handler per verb, shared by both grammars
//! - [`help`]: console help text
//! - [`settings`]: YAML runtime configuration
//! - [`error`]: command diagnostics and storage failures

pub mod command;
pub mod dispatch;
pub mod error;
pub mod help;
pub mod model;
pub mod parse;
pub mod settings;
pub mod store;
