use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{data_loaders::config::AssetPaths, info, utility::app_root_dir, warn};

/// First-run setup: scaffold `config.yaml` next to the executable.
pub fn bootstrap_app() {
    info!("[RICKROLL] === Bootstrap starting ===");
    info!("[RICKROLL] Current exe: {:?}", std::env::current_exe());

    let Some(root) = app_root_dir() else {
        warn!("[RICKROLL] Cannot resolve app directory, skipping scaffolding");
        return;
    };

    scaffold_config_yaml(&root);
    info!("[RICKROLL] Bootstrap complete in {}", root.display());
}

/// Writes the default config into `dir` unless one exists. Returns whether a
/// file was created.
pub fn scaffold_config_yaml(dir: &Path) -> bool {
    let path = dir.join("config.yaml");
    if path.exists() {
        return false;
    }

    let content = r#"debug: false
log_level: warn

settings:
  popups:
    spawn_interval_ms: 1000
    lifetime_ms: 5000
    size_min: 115
    size_max: 135
    head_probability: 0.15
    text_probability: 0.1
    frame_interval_ms: 50
    rotation_step_deg: 10
    spawn_margin_px: 200
  movement:
    step_interval_ms: 20
    pause_ms: 1000
    min_steps: 50
    max_steps: 100
    margin_px: 300
  text:
    lifetime_ms: 3000
    width: 300
    height: 80
    title: "Never Gonna ..."
    phrases:
      - "Give you up!"
      - "Let you down!"
      - "Run around and desert you!"
      - "Make you cry!"
      - "Say goodbye!"
      - "Tell a lie and hurt you!"
    heightened_phrase: " GIVE YOU UP !!! "
    x_range: [100, 800]
    y_range: [100, 600]
  audio:
    enabled: true
    poll_interval_ms: 100
    heightened_track: 1
  disco:
    enabled: true
    interval_ms: 200
    alpha: 0.5
  runtime:
    tick_sleep_ms: 8

assets:
  dir: "assets"
  background: "background.jpg"
  head: "head.png"
  tracks:
    - "rickroll.mp3"
    - "rickroll2.mp3"
  animations:
    - "rickroll1.gif"
    - "rickroll2.gif"
    - "rickroll3.gif"
"#;
    match fs::write(&path, content) {
        Ok(_) => {
            info!("[RICKROLL] Created config.yaml");
            true
        }
        Err(e) => {
            warn!("[RICKROLL] Failed to create config.yaml: {e}");
            false
        }
    }
}

/// Asset files that do not exist. Each one is logged; startup carries on.
pub fn missing_assets(paths: &AssetPaths) -> Vec<PathBuf> {
    let missing: Vec<PathBuf> = paths.all().filter(|p| !p.is_file()).cloned().collect();

    for path in &missing {
        warn!("[RICKROLL][ASSETS] Missing asset {}", path.display());
    }
    missing
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::data_loaders::config::{AssetSettings, PrankConfig};

    #[test]
    fn scaffolded_config_parses_to_the_defaults() {
        let temp_dir = TempDir::new().unwrap();
        assert!(scaffold_config_yaml(temp_dir.path()));

        let loaded = PrankConfig::load(&temp_dir.path().join("config.yaml")).unwrap();
        let defaults = PrankConfig::default();

        assert_eq!(loaded.debug, defaults.debug);
        assert_eq!(loaded.log_level, defaults.log_level);
        assert_eq!(loaded.settings.text.phrases, defaults.settings.text.phrases);
        assert_eq!(
            loaded.settings.text.heightened_phrase,
            defaults.settings.text.heightened_phrase
        );
        assert_eq!(loaded.settings.text.x_range, defaults.settings.text.x_range);
        assert_eq!(
            loaded.settings.popups.text_probability,
            defaults.settings.popups.text_probability
        );
        assert_eq!(loaded.settings.disco.alpha, defaults.settings.disco.alpha);
        assert_eq!(
            loaded.assets.resolve_in(temp_dir.path()),
            defaults.assets.resolve_in(temp_dir.path())
        );
    }

    #[test]
    fn existing_config_is_never_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "debug: true\n").unwrap();

        assert!(!scaffold_config_yaml(temp_dir.path()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "debug: true\n");
    }

    #[test]
    fn missing_assets_are_listed() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AssetSettings::default().resolve_in(temp_dir.path());
        fs::write(&paths.head, b"png").unwrap();
        fs::write(&paths.tracks[0], b"mp3").unwrap();

        let missing = missing_assets(&paths);

        assert_eq!(missing.len(), 5);
        assert!(!missing.contains(&paths.head));
        assert!(missing.contains(&paths.background));
        assert!(missing.contains(&paths.tracks[1]));
    }
}
