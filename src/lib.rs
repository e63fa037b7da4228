//! Bundle a Lua project into one self-contained script.
//!
//! Starting from an entry file, local `require` statements are followed
//! depth-first; every dependency is wrapped in a loader function registered in
//! `package.loaded`, and the entry file's code comes last.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::services::{LoadOutput, LoadService, ProjectResolver, ResolvedProject};
pub use domain::{bundle, render_paths, Bundle, Module, TreeStyle};
