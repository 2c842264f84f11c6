pub mod task;
pub mod category;
pub mod section;
pub mod config;

pub use task::*;
pub use category::*;
pub use section::*;
pub use config::*;
