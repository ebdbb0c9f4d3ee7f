//! UI-thread runtime: owns every popup, the spawner and the timer queue.
//!
//! Every recurring behavior is a [`Task`] that reschedules itself. Popup tasks
//! carry only the popup's id; before acting they look the popup up and check
//! that its window is still alive, and a failed check simply ends the chain.

use std::collections::HashMap;

use image::Rgb;
use rand::Rng;

use crate::{
    assets::AssetCache,
    audio::PhaseFlag,
    data_loaders::config::PrankSettings,
    error::PrankError,
    error, info,
    platform::Desktop,
    popup::{
        animation::{Animation, FrameCycle, RotatingHead},
        movement::{Movement, Point},
        popup_size, random_coordinate,
        spawner::{PopupSpawner, SpawnKind},
        AnimatedPopup, Popup, PopupId, Rect, TextPopup,
    },
    scheduler::Scheduler,
    warn,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Spawn,
    Animate(PopupId),
    Retarget(PopupId),
    Glide(PopupId),
    Expire(PopupId),
    Disco,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub spawn_ticks: u64,
    pub text_popups: u64,
    pub animated_popups: u64,
    pub failed_popups: u64,
    pub expired_popups: u64,
    pub disco_frames: u64,
}

pub struct PrankEngine<D, R> {
    desktop: D,
    rng: R,
    settings: PrankSettings,
    assets: AssetCache,
    spawner: PopupSpawner,
    phase: PhaseFlag,
    scheduler: Scheduler<Task>,
    popups: HashMap<PopupId, Popup>,
    next_id: u64,
    disco_started: bool,
    stats: EngineStats,
}

impl<D: Desktop, R: Rng> PrankEngine<D, R> {
    pub fn new(
        desktop: D,
        rng: R,
        settings: PrankSettings,
        assets: AssetCache,
        phase: PhaseFlag,
    ) -> Self {
        let spawner = PopupSpawner::new(
            settings.text.phrases.clone(),
            settings.text.heightened_phrase.clone(),
            settings.popups.text_probability,
            settings.popups.head_probability,
        );

        Self {
            desktop,
            rng,
            settings,
            assets,
            spawner,
            phase,
            scheduler: Scheduler::new(),
            popups: HashMap::new(),
            next_id: 0,
            disco_started: false,
            stats: EngineStats::default(),
        }
    }

    /// Queues the first spawner tick.
    pub fn start(&mut self, now_ms: u64) {
        self.scheduler.schedule_at(now_ms, Task::Spawn);
    }

    /// Runs every task due at or before `now_ms`. Returns how many ran.
    pub fn run_due(&mut self, now_ms: u64) -> usize {
        self.observe_phase(now_ms);

        let mut ran = 0;
        while let Some((_, task)) = self.scheduler.pop_due(now_ms) {
            self.dispatch(task, now_ms);
            ran += 1;
        }
        ran
    }

    #[cfg(test)]
    pub fn desktop(&self) -> &D {
        &self.desktop
    }

    pub fn desktop_mut(&mut self) -> &mut D {
        &mut self.desktop
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn live_popups(&self) -> usize {
        self.popups.len()
    }

    #[cfg(test)]
    pub fn next_due(&self) -> Option<u64> {
        self.scheduler.next_due()
    }

    fn observe_phase(&mut self, now_ms: u64) {
        if self.disco_started || !self.phase.is_heightened() {
            return;
        }
        self.disco_started = true;

        if self.settings.disco.enabled {
            warn!("[RICKROLL][PHASE] Heightened phase reached, starting disco overlay");
            self.scheduler.schedule_at(now_ms, Task::Disco);
        }
    }

    fn dispatch(&mut self, task: Task, now_ms: u64) {
        match task {
            Task::Spawn => self.spawn_tick(now_ms),
            Task::Animate(id) => self.animate(id, now_ms),
            Task::Retarget(id) => self.retarget(id, now_ms),
            Task::Glide(id) => self.glide(id, now_ms),
            Task::Expire(id) => self.expire(id),
            Task::Disco => self.disco(now_ms),
        }
    }

    fn spawn_tick(&mut self, now_ms: u64) {
        self.stats.spawn_ticks += 1;
        let heightened = self.phase.is_heightened();

        let result = match self.spawner.next_spawn(&mut self.rng, heightened) {
            SpawnKind::Text(text) => self.open_text_popup(text, now_ms),
            SpawnKind::Animated { rotating_head } => self.open_animated_popup(rotating_head, now_ms),
        };

        if let Err(e) = result {
            self.stats.failed_popups += 1;
            error!("[RICKROLL][SPAWN] Skipping popup: {}", e);
        }

        self.scheduler
            .schedule_after(now_ms, self.settings.popups.spawn_interval_ms, Task::Spawn);
    }

    fn allocate_id(&mut self) -> PopupId {
        let id = PopupId(self.next_id);
        self.next_id += 1;
        id
    }

    fn open_text_popup(&mut self, text: String, now_ms: u64) -> Result<PopupId, PrankError> {
        let text_settings = &self.settings.text;
        let (x_lo, x_hi) = text_settings.x_range;
        let (y_lo, y_hi) = text_settings.y_range;
        let rect = Rect {
            x: self.rng.random_range(x_lo..=x_hi),
            y: self.rng.random_range(y_lo..=y_hi),
            width: text_settings.width,
            height: text_settings.height,
        };

        let window = self
            .desktop
            .open_text_popup(rect, &text_settings.title, &text)?;
        let expires_at_ms = now_ms + text_settings.lifetime_ms;

        let id = self.allocate_id();
        self.popups.insert(
            id,
            Popup::Text(TextPopup {
                window,
                text,
                expires_at_ms,
            }),
        );
        self.scheduler.schedule_at(expires_at_ms, Task::Expire(id));
        self.stats.text_popups += 1;
        Ok(id)
    }

    fn open_animated_popup(
        &mut self,
        rotating_head: bool,
        now_ms: u64,
    ) -> Result<PopupId, PrankError> {
        let popups = &self.settings.popups;
        let size = popup_size(&mut self.rng, popups.size_min, popups.size_max);

        // Assets first so a bad file never leaves an empty window behind.
        let mut animation = if rotating_head {
            Animation::RotatingHead(RotatingHead::new(
                self.assets.head(size)?,
                popups.rotation_step_deg,
            ))
        } else {
            let source = self.assets.random_source(&mut self.rng)?;
            Animation::FrameCycle(FrameCycle::new(self.assets.frames(source, size)?))
        };

        let (screen_w, screen_h) = self.desktop.screen_size();
        let x = random_coordinate(&mut self.rng, screen_w, popups.spawn_margin_px);
        let y = random_coordinate(&mut self.rng, screen_h, popups.spawn_margin_px);
        let rect = Rect {
            x,
            y,
            width: size,
            height: size,
        };

        let window = self.desktop.open_image_popup(rect)?;
        if let Some(frame) = animation.next_frame() {
            self.desktop.show_frame(window, &frame);
        }

        let expires_at_ms = now_ms + popups.lifetime_ms;
        let frame_interval_ms = popups.frame_interval_ms;

        let id = self.allocate_id();
        self.popups.insert(
            id,
            Popup::Animated(AnimatedPopup {
                window,
                size,
                animation,
                movement: Movement::new(Point::new(x as f64, y as f64)),
                expires_at_ms,
            }),
        );

        self.scheduler
            .schedule_after(now_ms, frame_interval_ms, Task::Animate(id));
        self.scheduler.schedule_at(now_ms, Task::Retarget(id));
        self.scheduler.schedule_at(expires_at_ms, Task::Expire(id));
        self.stats.animated_popups += 1;
        info!(
            "[RICKROLL][SPAWN] Popup {:?} ({}px, head={}) at ({}, {})",
            id, size, rotating_head, x, y
        );
        Ok(id)
    }

    /// Whether the popup behind `id` still exists with a live window. A
    /// popup whose window vanished is forgotten here.
    fn ensure_live(&mut self, id: PopupId) -> bool {
        let Some(popup) = self.popups.get(&id) else {
            return false;
        };
        if !self.desktop.is_alive(popup.window()) {
            self.popups.remove(&id);
            return false;
        }
        true
    }

    fn animate(&mut self, id: PopupId, now_ms: u64) {
        let interval = self.settings.popups.frame_interval_ms;
        if !self.ensure_live(id) {
            return;
        }
        let Some(Popup::Animated(popup)) = self.popups.get_mut(&id) else {
            return;
        };

        if let Some(frame) = popup.animation.next_frame() {
            self.desktop.show_frame(popup.window, &frame);
        }
        self.scheduler
            .schedule_after(now_ms, interval, Task::Animate(id));
    }

    fn retarget(&mut self, id: PopupId, now_ms: u64) {
        let (screen_w, screen_h) = self.desktop.screen_size();
        let movement = &self.settings.movement;
        let max_x = screen_w.saturating_sub(movement.margin_px) as i32;
        let max_y = screen_h.saturating_sub(movement.margin_px) as i32;
        let steps = movement.min_steps..=movement.max_steps;

        if !self.ensure_live(id) {
            return;
        }
        let Some(Popup::Animated(popup)) = self.popups.get_mut(&id) else {
            return;
        };

        popup.movement.retarget(&mut self.rng, max_x, max_y, steps);
        self.glide(id, now_ms);
    }

    fn glide(&mut self, id: PopupId, now_ms: u64) {
        let step_ms = self.settings.movement.step_interval_ms;
        let pause_ms = self.settings.movement.pause_ms;

        if !self.ensure_live(id) {
            return;
        }
        let Some(Popup::Animated(popup)) = self.popups.get_mut(&id) else {
            return;
        };

        match popup.movement.glide() {
            Some(step) => {
                let (x, y) = step.position.to_pixels();
                self.desktop.move_window(popup.window, x, y);
                if step.arrived {
                    self.scheduler
                        .schedule_after(now_ms, pause_ms, Task::Retarget(id));
                } else {
                    self.scheduler
                        .schedule_after(now_ms, step_ms, Task::Glide(id));
                }
            }
            None => self
                .scheduler
                .schedule_after(now_ms, pause_ms, Task::Retarget(id)),
        }
    }

    fn expire(&mut self, id: PopupId) {
        let Some(popup) = self.popups.remove(&id) else {
            return;
        };

        let window = popup.window();
        if self.desktop.is_alive(window) {
            self.desktop.close(window);
        }
        self.stats.expired_popups += 1;

        match popup {
            Popup::Animated(p) => info!(
                "[RICKROLL][POPUP] {:?} ({}px) closed at {}ms",
                id, p.size, p.expires_at_ms
            ),
            Popup::Text(p) => info!(
                "[RICKROLL][POPUP] {:?} \"{}\" closed at {}ms",
                id, p.text, p.expires_at_ms
            ),
        }
    }

    fn disco(&mut self, now_ms: u64) {
        let color = Rgb([self.rng.random(), self.rng.random(), self.rng.random()]);
        if !self.desktop.disco(color, self.settings.disco.alpha) {
            info!("[RICKROLL][PHASE] Main window gone, disco overlay stopped");
            return;
        }

        self.stats.disco_frames += 1;
        self.scheduler
            .schedule_after(now_ms, self.settings.disco.interval_ms, Task::Disco);
    }
}
