pub mod config;
pub mod input;
pub mod model;
pub mod repository;
pub mod service;
pub mod time;

pub use config::{PersistMode, StoreConfig};
pub use input::{expand_key, parse_args, parse_draft, ParsedInput};
pub use model::task::{Task, TaskDraft, TaskId};
pub use model::view::{FilterMode, SortOrder};
pub use repository::{FileStorage, KeyValueStorage, MemoryStorage};
pub use service::command::TaskCommand;
pub use service::task_store::{TaskStore, TASKS_KEY};
pub use service::view::{derive_view, locale_cmp, ViewQuery};
