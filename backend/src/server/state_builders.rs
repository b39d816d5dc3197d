//! Builds the HTTP state from the configured map store.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;

use maps_backend::domain::MapService;
use maps_backend::domain::ports::MapStore;
use maps_backend::inbound::http::state::HttpState;
use maps_backend::outbound::InMemoryMapStore;
use maps_backend::outbound::persistence::{DbPool, DieselMapStore};

use super::ServerConfig;

fn build_store(db_pool: Option<&DbPool>) -> Arc<dyn MapStore> {
    match db_pool {
        Some(pool) => {
            info!("using PostgreSQL map store");
            Arc::new(DieselMapStore::new(pool.clone()))
        }
        None => {
            info!("no database configured; using in-memory map store");
            Arc::new(InMemoryMapStore::new())
        }
    }
}

/// Wire one [`MapService`] behind both driving ports.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let service = Arc::new(MapService::new(
        build_store(config.db_pool.as_ref()),
        Arc::new(DefaultClock),
    ));
    web::Data::new(HttpState::new(service.clone(), service))
}
