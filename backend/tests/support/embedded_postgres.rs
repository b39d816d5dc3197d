//! Per-test databases cloned from a migrated template.
//!
//! The template is named after a hash of `migrations/`, so it is rebuilt
//! whenever a migration changes and reused otherwise. Each test then gets a
//! fresh `test_<uuid>` clone that is dropped with its [`TemporaryDatabase`].

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use maps_backend::domain::ports::MapStoreError;
use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use uuid::Uuid;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const TEMPLATE_PREFIX: &str = "maps_template";
const PROVISION_ATTEMPTS: usize = 5;
const PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn template_name() -> Result<String, MapStoreError> {
    let migrations = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let hash = hash_directory(migrations)
        .map_err(|err| MapStoreError::query(format!("hash migrations: {err}")))?;
    let short = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_PREFIX}_{short}"))
}

/// Create the template on first use and return its name.
fn ensure_template(cluster: &ClusterHandle) -> Result<String, MapStoreError> {
    let name = template_name()?;
    let _guard = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let exists = cluster
        .database_exists(name.as_str())
        .map_err(|err| MapStoreError::query(format!("template check: {err:?}")))?;
    if !exists {
        cluster
            .create_database(name.as_str())
            .map_err(|err| MapStoreError::query(format!("create template: {err:?}")))?;
        migrate_schema(&cluster.connection().database_url(&name))?;
    }
    Ok(name)
}

fn clone_template(cluster: &ClusterHandle) -> Result<TemporaryDatabase, MapStoreError> {
    let template = ensure_template(cluster)?;
    let database = format!("test_{}", Uuid::new_v4());
    cluster
        .temporary_database_from_template(database.as_str(), template.as_str())
        .map_err(|err| MapStoreError::query(format!("clone {template}: {err:?}")))
}

/// Provision a migrated database for one test, retrying transient failures.
pub fn provision_template_database(
    cluster: &ClusterHandle,
) -> Result<TemporaryDatabase, MapStoreError> {
    let mut last_error = MapStoreError::query("template provisioning never ran");
    for attempt in 1..=PROVISION_ATTEMPTS {
        match clone_template(cluster) {
            Ok(database) => return Ok(database),
            Err(error) => {
                last_error =
                    MapStoreError::query(format!("attempt {attempt}/{PROVISION_ATTEMPTS}: {error}"));
            }
        }
        if attempt < PROVISION_ATTEMPTS {
            std::thread::sleep(PROVISION_RETRY_DELAY);
        }
    }
    Err(last_error)
}

/// Apply every pending migration to the database at `url`.
pub fn migrate_schema(url: &str) -> Result<(), MapStoreError> {
    let mut conn = PgConnection::establish(url)
        .map_err(|err| MapStoreError::connection(format!("{err:?}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| MapStoreError::query(format!("migration: {err:?}")))?;
    Ok(())
}
