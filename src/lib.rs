// Library crate exposing modules for integration tests

pub mod analytics;
pub mod error;
pub mod model;
pub mod repository;
pub mod snapshot;
pub mod util;
