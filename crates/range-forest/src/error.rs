//! Error taxonomy shared by the engine and every facade.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A fixed-capacity arena has no free slot, or the arena cannot grow.
    #[error("node arena exhausted")]
    OutOfMemory,
    /// An extent, count or length computation left the position range.
    #[error("arithmetic overflow in position or count")]
    Overflow,
    #[error("argument out of range: {0}")]
    OutOfRange(&'static str),
    #[error("an element with the same key or start already exists")]
    AlreadyExists,
    #[error("no element matches the key or start")]
    NotFound,
    #[error("unsupported configuration: {0}")]
    Unsupported(&'static str),
    /// A fast cursor observed a structural change after it was created.
    #[error("tree was modified after the cursor was created")]
    InvalidState,
    /// Raised only by validation; indicates a defect in a balancing strategy.
    #[error("tree invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, Error>;
