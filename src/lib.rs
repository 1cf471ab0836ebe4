pub mod api;
pub mod cli;
pub mod config;
pub mod data_paths;
pub use data_paths as data;
pub mod desk;
pub mod display;
pub mod errors;
pub mod feed;
pub mod ledger;
pub mod logging;
pub mod service;
pub mod store;
pub mod universe;
pub mod valuation;
