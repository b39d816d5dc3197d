//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on the driving
//! ports, so they can be exercised with mocks and no I/O.

use std::sync::Arc;

use crate::domain::ports::{MapCommand, MapQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub maps: Arc<dyn MapCommand>,
    pub maps_query: Arc<dyn MapQuery>,
}

impl HttpState {
    /// Bundle the command and query ports.
    pub fn new(maps: Arc<dyn MapCommand>, maps_query: Arc<dyn MapQuery>) -> Self {
        Self { maps, maps_query }
    }
}
