pub mod books;

use bookshelf_kernel::{settings::Settings, ModuleRegistry};

use books::store::SharedBookStore;

/// Register all project-specific modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    settings: &Settings,
    store: SharedBookStore,
) -> anyhow::Result<()> {
    registry.register(books::create_module(store, settings))
}
