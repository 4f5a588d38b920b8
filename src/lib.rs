pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod exit;
pub mod graph;
pub mod logging;
pub mod plan;
pub mod process;
pub mod repo;
pub mod runner;
pub mod stream;
pub mod types;
