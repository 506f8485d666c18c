pub mod books;

use std::sync::Arc;

use bookshelf_db::Database;
use bookshelf_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, db: &Database) {
    let repository = Arc::new(books::repository::PgBookRepository::new(db.clone()));
    registry.register(books::create_module(repository));
}
