pub mod error;
pub mod filters;
pub mod ports;
pub mod repo;
pub mod service;
