//! In-memory [`Desktop`] used by tests. Records every call, including calls
//! made against windows that were already closed.

use std::collections::HashSet;

use image::{Rgb, RgbaImage};

use super::{Desktop, WindowId};
use crate::{error::DesktopError, popup::Rect};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    OpenImage(WindowId, Rect),
    OpenText(WindowId, Rect, String),
    Frame(WindowId, (u32, u32)),
    Move(WindowId, i32, i32),
    Close(WindowId),
    Disco(Rgb<u8>),
}

pub struct FakeDesktop {
    pub screen: (u32, u32),
    pub alive: HashSet<WindowId>,
    pub calls: Vec<Call>,
    pub main_alive: bool,
    pub fail_windows: bool,
    /// `pump_events` returns `false` once this reaches zero.
    pub pumps_left: usize,
    next_handle: isize,
}

impl Default for FakeDesktop {
    fn default() -> Self {
        Self {
            screen: (1920, 1080),
            alive: HashSet::new(),
            calls: Vec::new(),
            main_alive: true,
            fail_windows: false,
            pumps_left: usize::MAX,
            next_handle: 1,
        }
    }
}

impl FakeDesktop {
    /// A desktop that reports quit after `pumps` event pumps.
    pub fn with_pumps(pumps: usize) -> Self {
        Self {
            pumps_left: pumps,
            ..Self::default()
        }
    }

    /// Simulates the user closing a window behind the engine's back.
    pub fn kill(&mut self, window: WindowId) {
        self.alive.remove(&window);
    }

    pub fn calls_for(&self, window: WindowId) -> impl Iterator<Item = &Call> {
        self.calls.iter().filter(move |call| match call {
            Call::OpenImage(w, _) | Call::OpenText(w, _, _) => *w == window,
            Call::Frame(w, _) | Call::Move(w, _, _) | Call::Close(w) => *w == window,
            Call::Disco(_) => false,
        })
    }

    pub fn texts(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::OpenText(_, _, text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }

    fn open(&mut self) -> Result<WindowId, DesktopError> {
        if self.fail_windows {
            return Err(DesktopError::CreateWindow("scripted failure".into()));
        }
        let window = WindowId(self.next_handle);
        self.next_handle += 1;
        self.alive.insert(window);
        Ok(window)
    }
}

impl Desktop for FakeDesktop {
    fn screen_size(&self) -> (u32, u32) {
        self.screen
    }

    fn open_image_popup(&mut self, rect: Rect) -> Result<WindowId, DesktopError> {
        let window = self.open()?;
        self.calls.push(Call::OpenImage(window, rect));
        Ok(window)
    }

    fn open_text_popup(
        &mut self,
        rect: Rect,
        _title: &str,
        text: &str,
    ) -> Result<WindowId, DesktopError> {
        let window = self.open()?;
        self.calls.push(Call::OpenText(window, rect, text.to_string()));
        Ok(window)
    }

    fn show_frame(&mut self, window: WindowId, frame: &RgbaImage) {
        self.calls.push(Call::Frame(window, frame.dimensions()));
    }

    fn move_window(&mut self, window: WindowId, x: i32, y: i32) {
        self.calls.push(Call::Move(window, x, y));
    }

    fn close(&mut self, window: WindowId) {
        self.alive.remove(&window);
        self.calls.push(Call::Close(window));
    }

    fn is_alive(&self, window: WindowId) -> bool {
        self.alive.contains(&window)
    }

    fn disco(&mut self, color: Rgb<u8>, _alpha: f32) -> bool {
        if !self.main_alive {
            return false;
        }
        self.calls.push(Call::Disco(color));
        true
    }

    fn pump_events(&mut self) -> bool {
        if self.pumps_left == 0 {
            return false;
        }
        self.pumps_left -= 1;
        true
    }
}
