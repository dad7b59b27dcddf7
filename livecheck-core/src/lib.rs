pub mod config;
pub mod error;
pub mod listings;
pub mod models;
pub mod schedule;
pub mod tracing_ext;
pub mod web;
