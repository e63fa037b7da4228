//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on the FileSystem I/O boundary trait
//! but are themselves concrete structs, not traits.

mod loader;
mod resolver;

pub use loader::{parse_load_directive, LoadOutput, LoadService, PreviewOptions, SpecReport};
pub use resolver::{ProjectResolver, ResolvedProject};
