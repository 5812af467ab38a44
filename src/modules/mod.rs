pub mod books;

use std::sync::Arc;

use bookshelf_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, book_store: Arc<dyn books::BookStore>) {
    registry.register(books::create_module(book_store));
}
