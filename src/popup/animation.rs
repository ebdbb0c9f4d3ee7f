use std::{borrow::Cow, sync::Arc};

use image::{Rgba, RgbaImage};

use crate::assets::FrameSet;

/// What a popup shows on each animation tick.
pub enum Animation {
    RotatingHead(RotatingHead),
    FrameCycle(FrameCycle),
}

impl Animation {
    /// The frame to display now; advances the state for the next tick.
    pub fn next_frame(&mut self) -> Option<Cow<'_, RgbaImage>> {
        match self {
            Self::RotatingHead(head) => Some(Cow::Owned(head.next_frame())),
            Self::FrameCycle(cycle) => cycle.next_frame().map(Cow::Borrowed),
        }
    }
}

pub struct RotatingHead {
    base: Arc<RgbaImage>,
    angle: u32,
    step: u32,
}

impl RotatingHead {
    pub fn new(base: Arc<RgbaImage>, step_deg: u32) -> Self {
        Self {
            base,
            angle: 0,
            step: step_deg % 360,
        }
    }

    #[cfg(test)]
    pub fn angle(&self) -> u32 {
        self.angle
    }

    fn next_frame(&mut self) -> RgbaImage {
        let frame = rotate_cropped(&self.base, self.angle as f32);
        self.angle = (self.angle + self.step) % 360;
        frame
    }
}

pub struct FrameCycle {
    frames: FrameSet,
    index: usize,
}

impl FrameCycle {
    pub fn new(frames: FrameSet) -> Self {
        Self { frames, index: 0 }
    }

    #[cfg(test)]
    pub fn index(&self) -> usize {
        self.index
    }

    fn next_frame(&mut self) -> Option<&RgbaImage> {
        if self.frames.is_empty() {
            return None;
        }
        let current = self.index;
        self.index = (self.index + 1) % self.frames.len();
        self.frames.get(current)
    }
}

/// Rotates `base` counter-clockwise by `angle_deg` about its center and keeps
/// the central `width`×`height` window. This is the same picture as rotating
/// onto an expanded canvas and center-cropping back. Pixels that fall outside
/// the source come out fully transparent.
pub fn rotate_cropped(base: &RgbaImage, angle_deg: f32) -> RgbaImage {
    let (width, height) = base.dimensions();
    if angle_deg.rem_euclid(360.0) == 0.0 {
        return base.clone();
    }

    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;

    RgbaImage::from_fn(width, height, |x, y| {
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        let sx = dx * cos - dy * sin + cx - 0.5;
        let sy = dx * sin + dy * cos + cy - 0.5;
        sample_bilinear(base, sx, sy)
    })
}

fn sample_bilinear(image: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let texel = |px: i64, py: i64| -> [f32; 4] {
        if px < 0 || py < 0 || px >= image.width() as i64 || py >= image.height() as i64 {
            return [0.0; 4];
        }
        let Rgba(c) = *image.get_pixel(px as u32, py as u32);
        [c[0] as f32, c[1] as f32, c[2] as f32, c[3] as f32]
    };

    let weights = [
        ((x0, y0), (1.0 - fx) * (1.0 - fy)),
        ((x0 + 1, y0), fx * (1.0 - fy)),
        ((x0, y0 + 1), (1.0 - fx) * fy),
        ((x0 + 1, y0 + 1), fx * fy),
    ];

    // Premultiplied so transparent neighbours do not darken edges.
    let mut acc = [0.0f32; 4];
    for ((px, py), w) in weights {
        if w <= 0.0 {
            continue;
        }
        let [r, g, b, a] = texel(px, py);
        let alpha = a / 255.0;
        acc[0] += r * alpha * w;
        acc[1] += g * alpha * w;
        acc[2] += b * alpha * w;
        acc[3] += a * w;
    }

    if acc[3] <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let alpha = acc[3] / 255.0;
    let channel = |v: f32| (v / alpha).round().clamp(0.0, 255.0) as u8;
    Rgba([
        channel(acc[0]),
        channel(acc[1]),
        channel(acc[2]),
        acc[3].round().clamp(0.0, 255.0) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked_square(size: u32) -> RgbaImage {
        let mut image = RgbaImage::from_pixel(size, size, Rgba([0, 0, 255, 255]));
        image.put_pixel(size - 1, 0, Rgba([255, 0, 0, 255]));
        image
    }

    #[test]
    fn zero_angle_is_identity() {
        let base = marked_square(8);
        assert_eq!(rotate_cropped(&base, 0.0), base);
        assert_eq!(rotate_cropped(&base, 360.0), base);
    }

    #[test]
    fn quarter_turn_is_counter_clockwise() {
        let base = marked_square(8);
        let rotated = rotate_cropped(&base, 90.0);

        // Top-right corner ends up top-left.
        assert_eq!(*rotated.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*rotated.get_pixel(7, 0), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn diagonal_turn_keeps_size_and_clears_corners() {
        let base = RgbaImage::from_pixel(20, 20, Rgba([10, 200, 10, 255]));
        let rotated = rotate_cropped(&base, 45.0);

        assert_eq!(rotated.dimensions(), (20, 20));
        assert_eq!(rotated.get_pixel(0, 0)[3], 0);
        assert_eq!(*rotated.get_pixel(10, 10), Rgba([10, 200, 10, 255]));
    }

    #[test]
    fn head_angle_wraps_at_360() {
        let mut head = RotatingHead::new(Arc::new(marked_square(4)), 10);
        for _ in 0..35 {
            head.next_frame();
        }
        assert_eq!(head.angle(), 350);
        head.next_frame();
        assert_eq!(head.angle(), 0);
    }

    #[test]
    fn frame_cycle_wraps_at_sequence_length() {
        let frames: FrameSet = (0..3u8)
            .map(|i| RgbaImage::from_pixel(2, 2, Rgba([i, i, i, 255])))
            .collect();
        let mut animation = Animation::FrameCycle(FrameCycle::new(frames));

        let shown: Vec<u8> = (0..7)
            .map(|_| animation.next_frame().unwrap().get_pixel(0, 0)[0])
            .collect();
        assert_eq!(shown, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn empty_frame_cycle_shows_nothing() {
        let frames: FrameSet = Vec::new().into();
        let mut cycle = FrameCycle::new(frames);
        assert!(cycle.next_frame().is_none());
        assert_eq!(cycle.index(), 0);
    }
}
