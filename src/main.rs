#![cfg_attr(windows, windows_subsystem = "windows")]
#![cfg_attr(not(windows), allow(dead_code))]

mod app;
mod assets;
mod audio;
mod bootstrap;
mod data_loaders;
mod engine;
mod error;
mod logging;
mod platform;
mod popup;
mod scheduler;
mod utility;
mod wallpaper;

use crate::data_loaders::config::PrankConfig;

fn load_config() -> PrankConfig {
    let config_path = utility::app_config_path();
    match PrankConfig::load(&config_path) {
        Some(config) => {
            info!("[RICKROLL] Config loaded from {}", config_path.display());
            config
        }
        None => {
            warn!(
                "[RICKROLL] No usable config at {}, using defaults",
                config_path.display()
            );
            PrankConfig::default()
        }
    }
}

fn verbose(config: &PrankConfig) -> bool {
    config.debug || matches!(config.log_level.as_str(), "info" | "debug" | "trace")
}

#[cfg(windows)]
fn main() {
    use crate::platform::win32::{
        enable_per_monitor_dpi_awareness, RodioPlayer, Win32Desktop, Win32Wallpaper,
    };

    logging::init(true);
    bootstrap::bootstrap_app();

    let config = load_config();
    logging::set_debug(verbose(&config));
    info!("[RICKROLL] Logging to {}", logging::log_file().display());
    std::panic::set_hook(Box::new(|panic_info| {
        error!("[RICKROLL] Panic: {}", panic_info);
    }));

    enable_per_monitor_dpi_awareness();

    let app = app::App::new(config);
    bootstrap::missing_assets(app.paths());

    let desktop = match Win32Desktop::new() {
        Ok(desktop) => desktop,
        Err(e) => {
            error!("[RICKROLL] Cannot create windows: {}", e);
            std::process::exit(1);
        }
    };

    app.run(desktop, Win32Wallpaper, RodioPlayer::open_default);
}

#[cfg(not(windows))]
fn main() {
    eprintln!("rickroll-desktop only runs on Windows");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_can_enable_info_lines() {
        let mut config = PrankConfig::default();
        assert!(!verbose(&config));

        config.log_level = "info".to_string();
        assert!(verbose(&config));

        config.log_level = "warn".to_string();
        config.debug = true;
        assert!(verbose(&config));
    }
}
