// Logging: tracing events go to a file, never to the terminal, because the
// terminal is owned by the dialoguer menus and the spinner.

use std::fs::File;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable naming the log file prefix.
pub const LOG_ENV: &str = "GISTIFY_LOG";

/// Install the file subscriber when `GISTIFY_LOG` is set; otherwise do
/// nothing and every `tracing` macro is a no-op.
///
/// Verbosity follows `RUST_LOG` and falls back to `info`. A log file that
/// cannot be created is reported once on stderr and the session continues
/// without logs.
pub fn init_tracing() {
    let Some(prefix) = std::env::var(LOG_ENV).ok().filter(|p| !p.is_empty()) else {
        return;
    };

    let started = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let path = session_log_path(&prefix, started, std::process::id());

    let file = match File::create(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("gistify: logging disabled, cannot create {}: {}", path.display(), e);
            return;
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let to_file = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry().with(filter).with(to_file).init();
}

/// One file per run: `{prefix}.{unix_seconds}.{pid}`, so two terminals
/// running the CLI side by side keep separate logs.
fn session_log_path(prefix: &str, started: u64, pid: u32) -> PathBuf {
    PathBuf::from(format!("{prefix}.{started}.{pid}"))
}
