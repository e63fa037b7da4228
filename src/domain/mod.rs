//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod bundle;
pub mod entities;
pub mod error;
pub mod render;
pub mod require;

pub use arena::{PathTree, TreeNode, PATH_SEPARATOR};
pub use bundle::{bundle, loader_id};
pub use entities::*;
pub use error::DomainError;
pub use render::{draw, render_paths, render_rows, RenderRow, TreeStyle, TreeStyleKind};
pub use require::{required_names, RequireExtractor};
