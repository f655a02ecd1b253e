pub mod artifact;
pub mod classify;
pub mod config;
pub mod errors;
pub mod manifest;
pub mod model;
pub mod planner;
pub mod runner;
pub mod store;
pub mod summary;
pub mod sweep;
pub mod ui;
