//! Request: the normalized form every console line reduces to.
//!
//! Both grammars (`show User <id>` and `User.show(<id>)`) parse into the
//! same `Request` value, so one handler per verb serves both and they can
//! never drift apart. Slots a line failed to supply stay `None`; the
//! dispatcher decides which diagnostic that is worth.

use crate::model::value::FieldValue;


/// One normalized command, ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Allocate and persist a fresh entity, printing its id.
    Create { class: Option<String> },
    /// Print one entity's rendered form.
    Show {
        class: Option<String>,
        id: Option<String>,
    },
    /// Delete one entity and persist.
    Destroy {
        class: Option<String>,
        id: Option<String>,
    },
    /// Assign attributes on one entity and persist.
    Update {
        class: Option<String>,
        id: Option<String>,
        args: UpdateArgs,
    },
    /// Print every entity, optionally filtered to one variant.
    All { class: Option<String> },
    /// Print how many entities of one variant exist.
    Count { class: Option<String> },
}

/// Arguments carried by an update.
///
/// The pair form keeps the value as raw text with quotes stripped, never
/// coerced to a number. The mapping form keeps each literal's decoded type.
/// Numeric-looking input is stored differently by the two forms on purpose.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateArgs {
    Pair {
        attr: Option<String>,
        value: Option<String>,
    },
    Map(Vec<(String, FieldValue)>),
}
