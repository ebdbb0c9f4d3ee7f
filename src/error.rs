//! Error types shared across the prank runtime.

use std::path::PathBuf;

use thiserror::Error;

/// Failures loading or decoding bundled images.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to open asset {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode asset {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("asset {0} contains no frames")]
    Empty(PathBuf),
    #[error("unknown animation source #{0}")]
    UnknownSource(usize),
    #[error("no animation sources configured")]
    NoSources,
}

#[derive(Debug, Error)]
pub enum WallpaperError {
    #[error("wallpaper image not found: {0}")]
    Missing(PathBuf),
    #[error("failed to read current wallpaper: {0}")]
    Query(String),
    #[error("failed to apply wallpaper: {0}")]
    Apply(String),
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio output unavailable: {0}")]
    Output(String),
    #[error("failed to open track {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode track {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum DesktopError {
    #[error("window creation failed: {0}")]
    CreateWindow(String),
    #[error("window class registration failed: {0}")]
    RegisterClass(String),
}

/// Anything that can abort opening a single popup.
#[derive(Debug, Error)]
pub enum PrankError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Desktop(#[from] DesktopError),
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn popup_errors_keep_their_source_message() {
        let asset: PrankError = AssetError::Empty(PathBuf::from("rickroll1.gif")).into();
        assert!(matches!(asset, PrankError::Asset(_)));
        assert_eq!(asset.to_string(), "asset rickroll1.gif contains no frames");

        let desktop: PrankError = DesktopError::CreateWindow("denied".into()).into();
        assert!(matches!(desktop, PrankError::Desktop(_)));
        assert_eq!(desktop.to_string(), "window creation failed: denied");
    }
}
