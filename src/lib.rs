pub mod config;
pub mod errors;
pub mod guard;
pub mod hooks;
