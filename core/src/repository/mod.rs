pub mod file;
pub mod memory;
pub mod traits;

// Re-export
pub use file::{default_data_dir, FileStorage};
pub use memory::MemoryStorage;
pub use traits::KeyValueStorage;
