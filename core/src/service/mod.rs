pub mod command;
pub mod task_store;
pub mod view;
