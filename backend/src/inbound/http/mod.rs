//! HTTP inbound adapter exposing the map REST endpoints and health probes.

pub mod error;
pub mod health;
pub mod maps;
pub mod schemas;
pub mod state;

pub use error::ApiResult;
