//! Win32 implementations of the platform traits.

mod audio;
mod desktop;
mod wallpaper;

pub use audio::RodioPlayer;
pub use desktop::Win32Desktop;
pub use wallpaper::Win32Wallpaper;

use windows::Win32::UI::HiDpi::{
    SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
};

use crate::warn;

/// Opts into physical pixels so popup coordinates match the screen size.
pub fn enable_per_monitor_dpi_awareness() {
    unsafe {
        if SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2).is_err() {
            warn!("[RICKROLL] Failed to set process DPI awareness to PerMonitorV2; coordinates may be scaled");
        }
    }
}
