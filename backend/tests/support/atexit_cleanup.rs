//! Shared embedded PostgreSQL cluster with shutdown at process exit.
//!
//! The library's shared cluster handle leaks its guard so the cluster lives as
//! long as the test binary. Under `nextest` every binary is its own process,
//! and a postmaster left running blocks the next binary from starting on the
//! same data directory. This wrapper serialises bootstrap across processes
//! with an advisory file lock and registers a `libc::atexit` hook that stops
//! the postmaster recorded in `postmaster.pid`.

#[cfg(unix)]
use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::sync::OnceLock;
#[cfg(unix)]
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

#[cfg(unix)]
use color_eyre::eyre::eyre;
#[cfg(unix)]
use pg_embedded_setup_unpriv::BootstrapError;
use pg_embedded_setup_unpriv::{BootstrapResult, ClusterHandle};

const BOOTSTRAP_ATTEMPTS: usize = 5;
const BOOTSTRAP_RETRY_DELAY: Duration = Duration::from_millis(500);
const EMBEDDED_PASSWORD: &str = "maps_backend_embedded_test";
#[cfg(unix)]
const PROCESS_LOCK_FILE: &str = "maps-backend-pg-embedded.lock";
#[cfg(unix)]
const SHUTDOWN_POLLS: usize = 50;
#[cfg(unix)]
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[cfg(unix)]
static POSTMASTER_PID: AtomicI32 = AtomicI32::new(0);
#[cfg(unix)]
static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();
#[cfg(unix)]
static PROCESS_LOCK: OnceLock<std::fs::File> = OnceLock::new();

/// Take an exclusive `flock` that is held until the process exits.
#[cfg(unix)]
fn lock_across_processes() -> BootstrapResult<()> {
    use std::os::fd::AsRawFd;

    if PROCESS_LOCK.get().is_some() {
        return Ok(());
    }

    let path = std::env::temp_dir().join(PROCESS_LOCK_FILE);
    let file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(&path)
        .map_err(|error| {
            BootstrapError::from(eyre!("open cluster lock '{}': {error}", path.display()))
        })?;

    // SAFETY: the descriptor belongs to `file`, which outlives the call.
    if unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) } != 0 {
        let error = std::io::Error::last_os_error();
        return Err(BootstrapError::from(eyre!(
            "lock cluster bootstrap '{}': {error}",
            path.display()
        )));
    }

    // A concurrent winner already holds the lock; dropping ours closes it.
    let _ = PROCESS_LOCK.set(file);
    Ok(())
}

/// Return the shared cluster, starting it on first use.
///
/// Bootstrap is retried a few times because parallel binaries can race on
/// the data directory even with the process lock.
pub fn shared_cluster_handle() -> BootstrapResult<&'static ClusterHandle> {
    pin_embedded_password();
    #[cfg(unix)]
    lock_across_processes()?;

    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => {
                #[cfg(unix)]
                stop_postmaster_at_exit(handle);
                return Ok(handle);
            }
            Err(error) if attempt >= BOOTSTRAP_ATTEMPTS => return Err(error),
            Err(_) => {
                std::thread::sleep(BOOTSTRAP_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}

/// Fix `PG_PASSWORD` so a reused data directory still accepts our logins.
///
/// Without it every process would generate a fresh password while `initdb`
/// only ran for the first one.
fn pin_embedded_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster bootstrap spawns any threads.
        unsafe {
            std::env::set_var("PG_PASSWORD", EMBEDDED_PASSWORD);
        }
    }
}

/// First line of `postmaster.pid` in `data_dir`.
#[cfg(unix)]
fn read_postmaster_pid(data_dir: &Path) -> Option<i32> {
    let dir = cap_std::fs::Dir::open_ambient_dir(data_dir, cap_std::ambient_authority()).ok()?;
    let content = dir.read_to_string("postmaster.pid").ok()?;
    content.lines().next()?.trim().parse().ok()
}

#[cfg(unix)]
extern "C" fn shut_down_postmaster() {
    let recorded = POSTMASTER_PID.load(Ordering::Relaxed);
    if recorded <= 0 {
        return;
    }
    // The pid file must still name the same process; pids get reused.
    let current = DATA_DIR.get().and_then(|dir| read_postmaster_pid(dir));
    if current != Some(recorded) {
        return;
    }

    // SAFETY: `recorded` matches the live postmaster.pid. SIGTERM requests a
    // smart shutdown and signal 0 only checks that it exists.
    unsafe {
        if libc::kill(recorded, libc::SIGTERM) != 0 {
            return;
        }
        for _ in 0..SHUTDOWN_POLLS {
            std::thread::sleep(SHUTDOWN_POLL_INTERVAL);
            if libc::kill(recorded, 0) != 0 {
                return;
            }
        }
        libc::kill(recorded, libc::SIGKILL);
    }
}

/// Record the postmaster pid and register the exit hook once per process.
#[cfg(unix)]
fn stop_postmaster_at_exit(handle: &ClusterHandle) {
    let data_dir = &handle.settings().data_dir;
    let Some(pid) = read_postmaster_pid(data_dir) else {
        return;
    };
    if POSTMASTER_PID
        .compare_exchange(0, pid, Ordering::Relaxed, Ordering::Relaxed)
        .is_err()
    {
        return;
    }
    let _ = DATA_DIR.set(data_dir.clone());

    // SAFETY: `shut_down_postmaster` is an `extern "C"` fn with no arguments.
    let rc = unsafe { libc::atexit(shut_down_postmaster) };
    if rc != 0 {
        eprintln!("pg-embed: atexit registration failed (rc={rc}); postmaster {pid} may outlive the tests");
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    #[cfg(unix)]
    #[rstest]
    #[case("4242\n/tmp/data\n5432\n", Some(4242))]
    #[case("  17  \n", Some(17))]
    #[case("postmaster\n", None)]
    fn postmaster_pid_is_the_first_line(#[case] content: &str, #[case] expected: Option<i32>) {
        let dir = tempfile::tempdir().expect("tempdir");
        let handle = cap_std::fs::Dir::open_ambient_dir(dir.path(), cap_std::ambient_authority())
            .expect("open tempdir");
        handle.write("postmaster.pid", content).expect("write pid file");

        assert_eq!(super::read_postmaster_pid(dir.path()), expected);
    }

    #[cfg(unix)]
    #[rstest]
    fn missing_pid_file_yields_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(super::read_postmaster_pid(dir.path()), None);
    }

    #[rstest]
    fn an_explicit_password_is_kept() {
        let _guard = env_lock::lock_env([("PG_PASSWORD", Some("operator_choice"))]);
        super::pin_embedded_password();
        assert_eq!(
            std::env::var("PG_PASSWORD").expect("PG_PASSWORD is set"),
            "operator_choice"
        );
    }
}
