//! Module kernel for bookshelf: the [`Module`] lifecycle trait, the
//! [`ModuleRegistry`] that drives it, and layered [`settings::Settings`].

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Migration, Module};
pub use registry::ModuleRegistry;
