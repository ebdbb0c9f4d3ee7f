//! Startup sequence and the UI event loop.

use std::{
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crate::{
    assets::AssetCache,
    audio::{AudioSequencer, PhaseFlag, TrackPlayer},
    data_loaders::config::{AssetPaths, PrankConfig},
    engine::{EngineStats, PrankEngine},
    error::AudioError,
    error, info,
    platform::Desktop,
    wallpaper::{WallpaperOutcome, WallpaperPlatform, WallpaperSetter},
    warn,
};

pub struct App {
    config: PrankConfig,
    paths: AssetPaths,
}

impl App {
    pub fn new(config: PrankConfig) -> Self {
        let paths = config.assets.resolve();
        Self { config, paths }
    }

    #[cfg(test)]
    pub fn with_paths(config: PrankConfig, paths: AssetPaths) -> Self {
        Self { config, paths }
    }

    pub fn paths(&self) -> &AssetPaths {
        &self.paths
    }

    /// Runs the whole prank until the desktop reports quit.
    pub fn run<D, W, P, M>(self, desktop: D, wallpaper: W, make_player: M) -> EngineStats
    where
        D: Desktop,
        W: WallpaperPlatform,
        P: TrackPlayer,
        M: FnOnce() -> Result<P, AudioError> + Send + 'static,
    {
        info!("!---------- [RICKROLL] Starting ----------!");

        self.apply_wallpaper(wallpaper);
        let assets = self.load_assets();

        let phase = PhaseFlag::new();
        let _audio = self.start_audio(make_player, phase.clone());

        let mut engine = PrankEngine::new(
            desktop,
            rand::rng(),
            self.config.settings.clone(),
            assets,
            phase,
        );
        let tick = Duration::from_millis(self.config.settings.runtime.tick_sleep_ms);
        event_loop(&mut engine, tick);

        let stats = engine.stats();
        info!(
            "[RICKROLL] Event loop finished: {} text / {} animated popups, {} failed, {} still open",
            stats.text_popups,
            stats.animated_popups,
            stats.failed_popups,
            engine.live_popups()
        );
        stats
    }

    pub fn apply_wallpaper<W: WallpaperPlatform>(&self, platform: W) -> Option<WallpaperOutcome> {
        let mut setter = WallpaperSetter::new(platform);
        match setter.apply(&self.paths.background) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("[RICKROLL][WALLPAPER] Failed to set wallpaper: {}", e);
                None
            }
        }
    }

    /// Decodes every animation up front. Failures are logged; the affected
    /// popups fail again (and are skipped) when spawned.
    pub fn load_assets(&self) -> AssetCache {
        let mut assets = AssetCache::new(&self.paths);
        let started = Instant::now();

        match assets.preload() {
            Ok(frames) => info!(
                "[RICKROLL][ASSETS] Preloaded {} animation(s), {} frame(s) in {:?}",
                assets.source_count(),
                frames,
                started.elapsed()
            ),
            Err(e) => error!("[RICKROLL][ASSETS] Preload failed: {}", e),
        }

        assets
    }

    /// Starts the playlist on its own thread. Starting the configured track
    /// marks the heightened phase.
    pub fn start_audio<P, M>(&self, make_player: M, phase: PhaseFlag) -> Option<JoinHandle<()>>
    where
        P: TrackPlayer,
        M: FnOnce() -> Result<P, AudioError> + Send + 'static,
    {
        let audio = &self.config.settings.audio;
        if !audio.enabled {
            info!("[RICKROLL][AUDIO] Audio disabled in config");
            return None;
        }

        let heightened_track = audio.heightened_track;
        let sequencer = AudioSequencer::new(
            self.paths.tracks.clone(),
            Duration::from_millis(audio.poll_interval_ms),
        );

        let spawned = sequencer.spawn(make_player, move |index| {
            if index == heightened_track {
                phase.mark_heightened();
            }
        });

        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("[RICKROLL][AUDIO] Failed to start audio thread: {}", e);
                None
            }
        }
    }
}

/// Pumps events, runs due tasks, sleeps one tick. Returns when the desktop
/// reports quit.
pub fn event_loop<D: Desktop, R: rand::Rng>(engine: &mut PrankEngine<D, R>, tick: Duration) {
    let epoch = Instant::now();
    engine.start(0);

    while engine.desktop_mut().pump_events() {
        let now_ms = epoch.elapsed().as_millis() as u64;
        engine.run_due(now_ms);
        thread::sleep(tick);
    }
}
