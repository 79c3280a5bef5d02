pub mod config;
pub mod db;
pub mod export;
pub mod models;
pub mod service;
pub mod sync;
pub mod trend;
