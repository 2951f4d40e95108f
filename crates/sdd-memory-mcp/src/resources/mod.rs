//! `memory://` resource surface, read-only views over the same engines
//! the tool contract uses.

pub mod memory;
