pub mod config_io;
pub mod http;
pub mod memory;
pub mod state;
pub mod store;
