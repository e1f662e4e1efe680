pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod plate;
pub mod render;
pub mod scale;
pub mod session;
pub mod status;
pub mod types;
