use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{error::WallpaperError, info};

/// Persistent desktop background setting of the host OS.
pub trait WallpaperPlatform {
    /// The wallpaper path the OS has stored.
    fn current_wallpaper(&self) -> Result<PathBuf, WallpaperError>;

    /// Applies `image` immediately, without a logoff.
    fn set_wallpaper(&mut self, image: &Path) -> Result<(), WallpaperError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallpaperOutcome {
    Applied,
    AlreadySet,
}

pub struct WallpaperSetter<P> {
    platform: P,
}

impl<P: WallpaperPlatform> WallpaperSetter<P> {
    pub fn new(platform: P) -> Self {
        Self { platform }
    }

    #[cfg(test)]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Sets `image` as the wallpaper unless the OS already points at the same
    /// file. An unreadable current setting counts as "not set".
    pub fn apply(&mut self, image: &Path) -> Result<WallpaperOutcome, WallpaperError> {
        if !image.is_file() {
            return Err(WallpaperError::Missing(image.to_path_buf()));
        }

        match self.platform.current_wallpaper() {
            Ok(current) if same_file(&current, image) => {
                info!(
                    "[RICKROLL][WALLPAPER] {} is already the wallpaper",
                    image.display()
                );
                return Ok(WallpaperOutcome::AlreadySet);
            }
            Ok(_) => {}
            Err(e) => info!("[RICKROLL][WALLPAPER] Current wallpaper unknown: {}", e),
        }

        let absolute = std::path::absolute(image).unwrap_or_else(|_| image.to_path_buf());
        self.platform.set_wallpaper(&absolute)?;
        info!("[RICKROLL][WALLPAPER] Applied {}", absolute.display());
        Ok(WallpaperOutcome::Applied)
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
