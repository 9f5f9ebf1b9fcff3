pub mod assets;
pub mod cache;
pub mod config;
pub mod dom;
pub mod errors;
pub mod models;
pub mod render;
pub mod scheduler;
pub mod scrape;
pub mod utils;
pub mod web;
