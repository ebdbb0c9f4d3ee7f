use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use super::yaml::load_yaml;
use crate::utility::resolve_asset_dir;

pub const DEFAULT_PHRASES: [&str; 6] = [
    "Give you up!",
    "Let you down!",
    "Run around and desert you!",
    "Make you cry!",
    "Say goodbye!",
    "Tell a lie and hurt you!",
];

#[derive(Debug, Clone)]
pub struct PrankConfig {
    pub debug: bool,
    pub log_level: String,
    pub settings: PrankSettings,
    pub assets: AssetSettings,
}

#[derive(Debug, Clone, Default)]
pub struct PrankSettings {
    pub popups: PopupSettings,
    pub movement: MovementSettings,
    pub text: TextSettings,
    pub audio: AudioSettings,
    pub disco: DiscoSettings,
    pub runtime: RuntimeSettings,
}

#[derive(Debug, Clone)]
pub struct PopupSettings {
    pub spawn_interval_ms: u64,
    pub lifetime_ms: u64,
    pub size_min: u32,
    pub size_max: u32,
    pub head_probability: f64,
    pub text_probability: f64,
    pub frame_interval_ms: u64,
    pub rotation_step_deg: u32,
    pub spawn_margin_px: u32,
}

#[derive(Debug, Clone)]
pub struct MovementSettings {
    pub step_interval_ms: u64,
    pub pause_ms: u64,
    pub min_steps: u32,
    pub max_steps: u32,
    pub margin_px: u32,
}

#[derive(Debug, Clone)]
pub struct TextSettings {
    pub lifetime_ms: u64,
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub phrases: Vec<String>,
    pub heightened_phrase: String,
    pub x_range: (i32, i32),
    pub y_range: (i32, i32),
}

#[derive(Debug, Clone)]
pub struct AudioSettings {
    pub enabled: bool,
    pub poll_interval_ms: u64,
    pub heightened_track: usize,
}

#[derive(Debug, Clone)]
pub struct DiscoSettings {
    pub enabled: bool,
    pub interval_ms: u64,
    pub alpha: f32,
}

#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub tick_sleep_ms: u64,
}

#[derive(Debug, Clone)]
pub struct AssetSettings {
    pub dir: PathBuf,
    pub background: String,
    pub head: String,
    pub tracks: Vec<String>,
    pub animations: Vec<String>,
}

/// Asset locations after resolving them against the asset directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    pub background: PathBuf,
    pub head: PathBuf,
    pub tracks: Vec<PathBuf>,
    pub animations: Vec<PathBuf>,
}

impl Default for PrankConfig {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "warn".to_string(),
            settings: PrankSettings::default(),
            assets: AssetSettings::default(),
        }
    }
}

impl Default for PopupSettings {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 1000,
            lifetime_ms: 5000,
            size_min: 115,
            size_max: 135,
            head_probability: 0.15,
            text_probability: 0.1,
            frame_interval_ms: 50,
            rotation_step_deg: 10,
            spawn_margin_px: 200,
        }
    }
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            step_interval_ms: 20,
            pause_ms: 1000,
            min_steps: 50,
            max_steps: 100,
            margin_px: 300,
        }
    }
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            lifetime_ms: 3000,
            width: 300,
            height: 80,
            title: "Never Gonna ...".to_string(),
            phrases: DEFAULT_PHRASES.iter().map(|s| s.to_string()).collect(),
            heightened_phrase: " GIVE YOU UP !!! ".to_string(),
            x_range: (100, 800),
            y_range: (100, 600),
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: 100,
            heightened_track: 1,
        }
    }
}

impl Default for DiscoSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 200,
            alpha: 0.5,
        }
    }
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self { tick_sleep_ms: 8 }
    }
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets"),
            background: "background.jpg".to_string(),
            head: "head.png".to_string(),
            tracks: vec!["rickroll.mp3".to_string(), "rickroll2.mp3".to_string()],
            animations: (1..=3).map(|i| format!("rickroll{i}.gif")).collect(),
        }
    }
}

impl AssetSettings {
    pub fn resolve(&self) -> AssetPaths {
        self.resolve_in(&resolve_asset_dir(&self.dir))
    }

    pub fn resolve_in(&self, dir: &Path) -> AssetPaths {
        AssetPaths {
            background: dir.join(&self.background),
            head: dir.join(&self.head),
            tracks: self.tracks.iter().map(|t| dir.join(t)).collect(),
            animations: self.animations.iter().map(|a| dir.join(a)).collect(),
        }
    }
}

impl AssetPaths {
    pub fn all(&self) -> impl Iterator<Item = &PathBuf> {
        std::iter::once(&self.background)
            .chain(std::iter::once(&self.head))
            .chain(self.tracks.iter())
            .chain(self.animations.iter())
    }
}

impl PrankConfig {
    pub fn load(path: &Path) -> Option<Self> {
        let value = load_yaml(path)?;
        Self::from_yaml(&value)
    }

    pub fn from_yaml(root: &Value) -> Option<Self> {
        let map = root.as_mapping()?;
        let defaults = Self::default();

        let debug = bool_at(map, "debug").unwrap_or(defaults.debug);
        let log_level = str_at(map, "log_level")
            .unwrap_or(&defaults.log_level)
            .to_lowercase();

        Some(Self {
            debug,
            log_level,
            settings: parse_settings(map),
            assets: parse_assets(map),
        })
    }
}

fn parse_settings(root: &Mapping) -> PrankSettings {
    let mut settings = PrankSettings::default();

    let Some(settings_map) = mapping_at(root, "settings") else {
        return settings;
    };

    if let Some(popups) = mapping_at(settings_map, "popups") {
        let p = &mut settings.popups;
        p.spawn_interval_ms = u64_any(popups, &["spawn_interval_ms", "interval_ms"])
            .unwrap_or(p.spawn_interval_ms)
            .max(1);
        p.lifetime_ms = u64_at(popups, "lifetime_ms").unwrap_or(p.lifetime_ms).max(1);
        p.size_min = u64_at(popups, "size_min")
            .map(|v| v as u32)
            .unwrap_or(p.size_min)
            .max(10);
        p.size_max = u64_at(popups, "size_max")
            .map(|v| v as u32)
            .unwrap_or(p.size_max)
            .max(p.size_min);
        p.head_probability = f64_any(popups, &["head_probability", "rotating_head_probability"])
            .unwrap_or(p.head_probability)
            .clamp(0.0, 1.0);
        p.text_probability = f64_any(popups, &["text_probability", "text_popup_probability"])
            .unwrap_or(p.text_probability)
            .clamp(0.0, 1.0);
        p.frame_interval_ms = u64_at(popups, "frame_interval_ms")
            .unwrap_or(p.frame_interval_ms)
            .max(1);
        p.rotation_step_deg = u64_at(popups, "rotation_step_deg")
            .map(|v| (v % 360) as u32)
            .unwrap_or(p.rotation_step_deg)
            .max(1);
        p.spawn_margin_px = u64_at(popups, "spawn_margin_px")
            .map(|v| v as u32)
            .unwrap_or(p.spawn_margin_px);
    }

    if let Some(movement) = mapping_at(settings_map, "movement") {
        let m = &mut settings.movement;
        m.step_interval_ms = u64_at(movement, "step_interval_ms")
            .unwrap_or(m.step_interval_ms)
            .max(1);
        m.pause_ms = u64_at(movement, "pause_ms").unwrap_or(m.pause_ms).max(1);
        m.min_steps = u64_at(movement, "min_steps")
            .map(|v| v as u32)
            .unwrap_or(m.min_steps)
            .max(1);
        m.max_steps = u64_at(movement, "max_steps")
            .map(|v| v as u32)
            .unwrap_or(m.max_steps)
            .max(m.min_steps);
        m.margin_px = u64_at(movement, "margin_px")
            .map(|v| v as u32)
            .unwrap_or(m.margin_px);
    }

    if let Some(text) = mapping_at(settings_map, "text") {
        let t = &mut settings.text;
        t.lifetime_ms = u64_at(text, "lifetime_ms").unwrap_or(t.lifetime_ms).max(1);
        t.width = u64_at(text, "width").map(|v| v as u32).unwrap_or(t.width).max(1);
        t.height = u64_at(text, "height").map(|v| v as u32).unwrap_or(t.height).max(1);
        if let Some(title) = str_at(text, "title") {
            t.title = title.to_string();
        }
        if let Some(phrases) = string_list_at(text, "phrases") {
            t.phrases = phrases;
        }
        if let Some(phrase) = str_any(text, &["heightened_phrase", "emphatic_phrase"]) {
            t.heightened_phrase = phrase.to_string();
        }
        t.x_range = range_at(text, "x_range").unwrap_or(t.x_range);
        t.y_range = range_at(text, "y_range").unwrap_or(t.y_range);
    }

    if let Some(audio) = mapping_at(settings_map, "audio") {
        let a = &mut settings.audio;
        a.enabled = bool_at(audio, "enabled").unwrap_or(a.enabled);
        a.poll_interval_ms = u64_at(audio, "poll_interval_ms")
            .unwrap_or(a.poll_interval_ms)
            .max(1);
        a.heightened_track = u64_at(audio, "heightened_track")
            .map(|v| v as usize)
            .unwrap_or(a.heightened_track);
    }

    if let Some(disco) = mapping_at(settings_map, "disco") {
        let d = &mut settings.disco;
        d.enabled = bool_at(disco, "enabled").unwrap_or(d.enabled);
        d.interval_ms = u64_at(disco, "interval_ms").unwrap_or(d.interval_ms).max(1);
        d.alpha = f64_at(disco, "alpha")
            .map(|v| v as f32)
            .unwrap_or(d.alpha)
            .clamp(0.0, 1.0);
    }

    if let Some(runtime) = mapping_at(settings_map, "runtime") {
        settings.runtime.tick_sleep_ms = u64_at(runtime, "tick_sleep_ms")
            .unwrap_or(settings.runtime.tick_sleep_ms)
            .max(1);
    }

    settings
}

fn parse_assets(root: &Mapping) -> AssetSettings {
    let mut assets = AssetSettings::default();

    let Some(map) = mapping_at(root, "assets") else {
        return assets;
    };

    if let Some(dir) = str_at(map, "dir") {
        assets.dir = PathBuf::from(dir);
    }
    if let Some(background) = str_any(map, &["background", "wallpaper"]) {
        assets.background = background.to_string();
    }
    if let Some(head) = str_at(map, "head") {
        assets.head = head.to_string();
    }
    if let Some(tracks) = string_list_at(map, "tracks") {
        assets.tracks = tracks;
    }
    if let Some(animations) = string_list_at(map, "animations") {
        assets.animations = animations;
    }

    assets
}

fn bool_at(map: &Mapping, key: &str) -> Option<bool> {
    map.get(Value::String(key.to_string()))?.as_bool()
}

fn str_at<'a>(map: &'a Mapping, key: &str) -> Option<&'a str> {
    map.get(Value::String(key.to_string()))?.as_str()
}

fn str_any<'a>(map: &'a Mapping, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| str_at(map, k))
}

fn mapping_at<'a>(map: &'a Mapping, key: &str) -> Option<&'a Mapping> {
    map.get(Value::String(key.to_string()))?.as_mapping()
}

fn u64_at(map: &Mapping, key: &str) -> Option<u64> {
    map.get(Value::String(key.to_string()))?
        .as_i64()
        .and_then(|v| if v >= 0 { Some(v as u64) } else { None })
}

fn u64_any(map: &Mapping, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|k| u64_at(map, k))
}

fn f64_at(map: &Mapping, key: &str) -> Option<f64> {
    map.get(Value::String(key.to_string()))?.as_f64()
}

fn f64_any(map: &Mapping, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| f64_at(map, k))
}

fn string_list_at(map: &Mapping, key: &str) -> Option<Vec<String>> {
    let list = map.get(Value::String(key.to_string()))?.as_sequence()?;
    let parsed: Vec<String> = list
        .iter()
        .filter_map(|v| v.as_str().map(|s| s.to_string()))
        .collect();

    if parsed.is_empty() {
        None
    } else {
        Some(parsed)
    }
}

/// `[lo, hi]` pair; reversed bounds are swapped.
fn range_at(map: &Mapping, key: &str) -> Option<(i32, i32)> {
    let list = map.get(Value::String(key.to_string()))?.as_sequence()?;
    let [lo, hi] = list.as_slice() else {
        return None;
    };
    let (lo, hi) = (lo.as_i64()? as i32, hi.as_i64()? as i32);
    Some((lo.min(hi), lo.max(hi)))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn parse(yaml: &str) -> PrankConfig {
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        PrankConfig::from_yaml(&value).unwrap()
    }

    #[test]
    fn empty_mapping_gives_defaults() {
        let config = parse("{}");
        assert!(!config.debug);
        assert_eq!(config.settings.popups.spawn_interval_ms, 1000);
        assert_eq!(config.settings.popups.lifetime_ms, 5000);
        assert_eq!(config.settings.popups.size_min, 115);
        assert_eq!(config.settings.popups.size_max, 135);
        assert!((config.settings.popups.head_probability - 0.15).abs() < f64::EPSILON);
        assert!((config.settings.popups.text_probability - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.settings.movement.min_steps, 50);
        assert_eq!(config.settings.movement.max_steps, 100);
        assert_eq!(config.settings.text.phrases.len(), DEFAULT_PHRASES.len());
        assert_eq!(config.settings.text.lifetime_ms, 3000);
        assert_eq!(config.settings.audio.heightened_track, 1);
        assert_eq!(config.settings.disco.interval_ms, 200);
        assert_eq!(config.assets.animations.len(), 3);
    }

    #[test]
    fn non_mapping_root_is_rejected() {
        let value: Value = serde_yaml::from_str("- a\n- b\n").unwrap();
        assert!(PrankConfig::from_yaml(&value).is_none());
    }

    #[test]
    fn overrides_are_honored() {
        let config = parse(
            r#"
debug: true
log_level: INFO
settings:
  popups:
    spawn_interval_ms: 250
    text_probability: 1.0
    size_min: 50
    size_max: 60
  text:
    phrases: ["one", "two"]
    heightened_phrase: "LOUD"
    x_range: [800, 100]
  audio:
    heightened_track: 0
assets:
  dir: "/opt/prank"
  tracks: ["a.mp3"]
"#,
        );

        assert!(config.debug);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.settings.popups.spawn_interval_ms, 250);
        assert!((config.settings.popups.text_probability - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.settings.popups.size_min, 50);
        assert_eq!(config.settings.popups.size_max, 60);
        assert_eq!(config.settings.text.phrases, vec!["one", "two"]);
        assert_eq!(config.settings.text.heightened_phrase, "LOUD");
        assert_eq!(config.settings.text.x_range, (100, 800));
        assert_eq!(config.settings.audio.heightened_track, 0);
        assert_eq!(config.assets.dir, PathBuf::from("/opt/prank"));
        assert_eq!(config.assets.tracks, vec!["a.mp3"]);
    }

    #[test]
    fn values_are_clamped() {
        let config = parse(
            r#"
settings:
  popups:
    spawn_interval_ms: 0
    head_probability: 4.5
    text_probability: -1.0
    size_min: 200
    size_max: 100
  movement:
    min_steps: 0
    max_steps: 0
  disco:
    alpha: 3.0
"#,
        );

        assert_eq!(config.settings.popups.spawn_interval_ms, 1);
        assert!((config.settings.popups.head_probability - 1.0).abs() < f64::EPSILON);
        assert!(config.settings.popups.text_probability.abs() < f64::EPSILON);
        assert_eq!(config.settings.popups.size_max, 200);
        assert_eq!(config.settings.movement.min_steps, 1);
        assert_eq!(config.settings.movement.max_steps, 1);
        assert!((config.settings.disco.alpha - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn empty_phrase_list_keeps_defaults() {
        let config = parse("settings:\n  text:\n    phrases: []\n");
        assert_eq!(config.settings.text.phrases.len(), DEFAULT_PHRASES.len());
    }

    #[test]
    fn asset_paths_resolve_inside_the_asset_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AssetSettings::default().resolve_in(temp_dir.path());

        assert_eq!(paths.background, temp_dir.path().join("background.jpg"));
        assert_eq!(paths.head, temp_dir.path().join("head.png"));
        assert_eq!(paths.tracks[1], temp_dir.path().join("rickroll2.mp3"));
        assert_eq!(paths.animations[2], temp_dir.path().join("rickroll3.gif"));
        assert_eq!(paths.all().count(), 1 + 1 + 2 + 3);
    }

    #[test]
    fn load_reads_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "settings:\n  runtime:\n    tick_sleep_ms: 16\n").unwrap();

        let config = PrankConfig::load(&path).unwrap();
        assert_eq!(config.settings.runtime.tick_sleep_ms, 16);
    }
}
