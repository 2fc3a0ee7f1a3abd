pub mod board;
pub mod note_store;
pub mod ref_store;
pub mod task_store;
