//! Popup entities and the per-popup state machines that drive them.

pub mod animation;
pub mod movement;
pub mod spawner;

use rand::Rng;

use self::{animation::Animation, movement::Movement};
use crate::platform::WindowId;

/// Engine-side identity of a popup. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PopupId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

pub struct AnimatedPopup {
    pub window: WindowId,
    pub size: u32,
    pub animation: Animation,
    pub movement: Movement,
    pub expires_at_ms: u64,
}

pub struct TextPopup {
    pub window: WindowId,
    pub text: String,
    pub expires_at_ms: u64,
}

pub enum Popup {
    Animated(AnimatedPopup),
    Text(TextPopup),
}

impl Popup {
    pub fn window(&self) -> WindowId {
        match self {
            Self::Animated(popup) => popup.window,
            Self::Text(popup) => popup.window,
        }
    }
}

/// Uniform side length in `[min, max]`, rounded to the nearest 10px.
pub fn popup_size<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    let raw = rng.random_range(min.min(max)..=max.max(min));
    ((raw + 5) / 10 * 10).max(10)
}

/// Uniform coordinate in `[0, extent - margin]`, or 0 when the screen is
/// smaller than the margin.
pub fn random_coordinate<R: Rng + ?Sized>(rng: &mut R, extent: u32, margin: u32) -> i32 {
    let max = extent.saturating_sub(margin);
    rng.random_range(0..=max) as i32
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn sizes_are_multiples_of_ten_near_the_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let size = popup_size(&mut rng, 115, 135);
            assert_eq!(size % 10, 0);
            assert!((120..=140).contains(&size), "size {size}");
        }
    }

    #[test]
    fn degenerate_size_bounds_still_work() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(popup_size(&mut rng, 124, 124), 120);
        assert_eq!(popup_size(&mut rng, 1, 1), 10);
    }

    #[test]
    fn coordinates_respect_the_margin() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let x = random_coordinate(&mut rng, 1920, 300);
            assert!((0..=1620).contains(&x));
        }
        assert_eq!(random_coordinate(&mut rng, 100, 300), 0);
    }
}
