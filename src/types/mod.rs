//! Shared primitive types.
mod contracts;
pub use contracts::*;

mod envelope;
pub use envelope::*;

mod message;
pub use message::*;

mod signature;
pub use signature::*;

mod transaction;
pub use transaction::*;

mod version;
pub use version::*;
