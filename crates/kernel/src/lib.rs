//! Kernel for the bookstore service: layered settings, the module trait, and
//! the registry driving module lifecycle.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
