pub mod config;
pub mod record;
pub mod result;
pub mod thread;
