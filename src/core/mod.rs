pub mod config;
pub mod dedup;
pub mod models;
pub mod ports;
