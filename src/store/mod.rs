//! Typed memory storage module
//!
//! Value types, the persisted entry shape, and the reader/writer handles.
//! This module is independent of the command-line front end (loose coupling).

mod entry;
mod memory;
mod reader;
mod value;

pub use entry::Entry;
pub use memory::{Arg, MemoryStore, MemoryWrite};
pub use reader::{MemoryRead, MemoryReader};
pub use value::{TypeTag, Value};
