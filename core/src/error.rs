use std::fmt;
use std::io;

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

/// A command-level failure. Each variant renders as the fixed one-line
/// diagnostic the console prints. The store is never mutated once one is
/// raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// No type name was given where one is required.
    ClassMissing,
    /// The given type name is not a known variant.
    ClassUnknown,
    /// No instance id was given where one is required.
    IdMissing,
    /// No entity lives under the given key.
    NotFound,
    /// Update was given no attribute name.
    AttrMissing,
    /// Update was given an attribute name but no value.
    ValueMissing,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = match self {
            CommandError::ClassMissing => "** class name missing **",
            CommandError::ClassUnknown => "** class doesn't exist **",
            CommandError::IdMissing => "** instance id missing **",
            CommandError::NotFound => "** no instance found **",
            CommandError::AttrMissing => "** attribute name missing **",
            CommandError::ValueMissing => "** value missing **",
        };
        f.write_str(line)
    }
}

impl std::error::Error for CommandError {}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

/// A storage-level failure. These are fatal to the session: the backing file
/// is the single source of durability and no repair is attempted.
#[derive(Debug)]
pub enum StoreError {
    /// Filesystem I/O error.
    Io(io::Error),
    /// The backing file, or an entry in it, has the wrong shape.
    Malformed(String),
    /// A persisted record names a variant the registry does not know.
    UnknownVariant(String),
    /// A persisted timestamp failed to parse.
    BadTimestamp(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "storage I/O error: {}", e),
            StoreError::Malformed(msg) => write!(f, "malformed backing file: {}", msg),
            StoreError::UnknownVariant(tag) => {
                write!(f, "unknown variant tag '{}' in backing file", tag)
            }
            StoreError::BadTimestamp(text) => {
                write!(f, "unparseable timestamp '{}' in backing file", text)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}
