//! Helpers shared by the integration suites that run against embedded
//! PostgreSQL.

pub mod atexit_cleanup;
pub mod cluster_skip;
pub mod embedded_postgres;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::provision_template_database;

/// Render a `postgres` error with its SQLSTATE and server detail.
///
/// `Display` on `postgres::Error` often reduces to `db error`, which is
/// useless in CI logs.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!("postgres error {:?}: {}", db_error.code(), db_error.message());
    let extras = [
        ("detail", db_error.detail()),
        ("hint", db_error.hint()),
        ("where", db_error.where_()),
    ];
    for (label, value) in extras {
        if let Some(value) = value {
            summary.push_str(&format!("; {label}: {value}"));
        }
    }
    summary
}
