pub mod filter;
pub mod note;
pub mod refdata;
pub mod task;

pub use filter::*;
pub use note::*;
pub use refdata::*;
pub use task::*;
