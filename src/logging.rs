use std::{
    fs::OpenOptions,
    io::Write,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Sender},
        OnceLock,
    },
    thread,
};

use crate::utility::app_root_dir;

const LOG_FILE_NAME: &str = "rickroll.log";

/* =========================
   GLOBAL STATE
   ========================= */

static DEBUG: AtomicBool = AtomicBool::new(false);
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();
static LOG_TX: OnceLock<Sender<String>> = OnceLock::new();

/* =========================
   PUBLIC API
   ========================= */

/// Starts the writer thread. Until this runs every log macro is a no-op,
/// which is what unit tests rely on.
pub fn init(debug: bool) {
    if LOG_TX.get().is_some() {
        panic!("logging::init() called more than once");
    }

    DEBUG.store(debug, Ordering::Relaxed);
    let path = log_path().clone();
    let (tx, rx) = mpsc::channel::<String>();
    LOG_TX.set(tx).expect("LOG_TX already set");

    thread::spawn(move || {
        let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) else {
            return;
        };

        while let Ok(line) = rx.recv() {
            let _ = writeln!(file, "{line}");
            let _ = file.flush();
        }
    });
}

pub fn set_debug(debug: bool) {
    DEBUG.store(debug, Ordering::Relaxed);
}

#[inline]
pub fn should_log(level: &str) -> bool {
    DEBUG.load(Ordering::Relaxed) || level == "WARN" || level == "ERROR"
}

pub fn log_file() -> &'static PathBuf {
    log_path()
}

/* =========================
   INTERNAL
   ========================= */

#[inline]
pub fn enqueue(level: &str, msg: String) {
    if let Some(tx) = LOG_TX.get() {
        let ts = timestamp();
        let _ = tx.send(format!("{ts} [{level}] {msg}"));
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/* =========================
   MACROS
   ========================= */

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {{
        if $crate::logging::should_log("INFO") {
            $crate::logging::enqueue(
                "INFO",
                format!($($arg)*)
            );
        }
    }};
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        $crate::logging::enqueue(
            "WARN",
            format!($($arg)*)
        );
    }};
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        $crate::logging::enqueue(
            "ERROR",
            format!($($arg)*)
        );
    }};
}

/* =========================
   PATH
   ========================= */

fn log_path() -> &'static PathBuf {
    LOG_PATH.get_or_init(|| {
        app_root_dir()
            .map(|p| p.join(LOG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_and_errors_always_pass_the_gate() {
        assert!(should_log("WARN"));
        assert!(should_log("ERROR"));
    }

    #[test]
    fn macros_are_silent_before_init() {
        // No writer thread exists in unit tests; these must not panic.
        crate::info!("[RICKROLL][TEST] {}", 1);
        crate::warn!("[RICKROLL][TEST] {}", 2);
        crate::error!("[RICKROLL][TEST] {}", 3);
    }

    #[test]
    fn log_file_lives_next_to_the_executable() {
        assert_eq!(
            log_file().file_name().and_then(|n| n.to_str()),
            Some(LOG_FILE_NAME)
        );
    }
}
