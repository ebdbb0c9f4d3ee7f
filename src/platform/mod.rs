//! The windowing collaborator. The engine only ever talks to [`Desktop`];
//! the Win32 implementation lives in [`win32`].

#[cfg(test)]
pub(crate) mod fake;
#[cfg(windows)]
pub mod win32;

use image::{Rgb, RgbaImage};

use crate::{error::DesktopError, popup::Rect};

/// Opaque native window handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub isize);

pub trait Desktop {
    fn screen_size(&self) -> (u32, u32);

    /// Borderless, topmost window whose color-keyed pixels are see-through.
    fn open_image_popup(&mut self, rect: Rect) -> Result<WindowId, DesktopError>;

    /// Plain titled, topmost window showing `text`.
    fn open_text_popup(&mut self, rect: Rect, title: &str, text: &str)
        -> Result<WindowId, DesktopError>;

    fn show_frame(&mut self, window: WindowId, frame: &RgbaImage);

    fn move_window(&mut self, window: WindowId, x: i32, y: i32);

    fn close(&mut self, window: WindowId);

    fn is_alive(&self, window: WindowId) -> bool;

    /// Paints the main window `color`, fullscreen, topmost and `alpha`
    /// translucent. Returns `false` once the main window no longer exists.
    fn disco(&mut self, color: Rgb<u8>, alpha: f32) -> bool;

    /// Drains pending platform events. Returns `false` when the app should quit.
    fn pump_events(&mut self) -> bool;
}

/// Color treated as fully transparent in image popups.
pub const COLOR_KEY: [u8; 3] = [255, 255, 255];

/// Converts RGBA to top-down BGRA with mostly-transparent pixels replaced by
/// the color key, so a color-keyed window shows only the image content.
pub fn keyed_bgra(frame: &RgbaImage) -> Vec<u8> {
    let [kr, kg, kb] = COLOR_KEY;
    frame
        .pixels()
        .flat_map(|pixel| {
            let [r, g, b, a] = pixel.0;
            if a < 128 {
                [kb, kg, kr, 0]
            } else {
                [b, g, r, 255]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    #[test]
    fn transparent_pixels_become_the_color_key() {
        let mut frame = RgbaImage::from_pixel(2, 1, Rgba([10, 20, 30, 255]));
        frame.put_pixel(1, 0, Rgba([10, 20, 30, 40]));

        assert_eq!(keyed_bgra(&frame), vec![30, 20, 10, 255, 255, 255, 255, 0]);
    }
}
