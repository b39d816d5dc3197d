//! Domain ports for the hexagonal boundary.
//!
//! [`MapCommand`] and [`MapQuery`] are driving ports called by inbound
//! adapters. [`MapStore`] is the driven port implemented by persistence
//! adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod map_command;
mod map_query;
mod map_store;

pub use map_command::MapCommand;
#[cfg(test)]
pub use map_command::MockMapCommand;
pub use map_query::MapQuery;
#[cfg(test)]
pub use map_query::MockMapQuery;
pub use map_store::{MapMetadataUpdate, MapStore, MapStoreError, MapStoreTransaction, NewMap};
#[cfg(test)]
pub use map_store::{MockMapStore, MockMapStoreTransaction};
