use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use image::{
    codecs::gif::GifDecoder, imageops::FilterType, AnimationDecoder, ImageReader, RgbaImage,
};
use rand::Rng;

use crate::{data_loaders::config::AssetPaths, error::AssetError, info};

/// Decoded frames of one animation, shared between every popup using them.
pub type FrameSet = Arc<[RgbaImage]>;

/// Index of an animation in the configured animation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub usize);

/// Process-lifetime cache of decoded animation frames and their resized
/// variants. The asset set is small and fixed, so nothing is ever evicted.
pub struct AssetCache {
    animations: Vec<PathBuf>,
    head_path: PathBuf,
    raw: HashMap<SourceId, FrameSet>,
    resized: HashMap<(SourceId, u32), FrameSet>,
    head_raw: Option<Arc<RgbaImage>>,
    head_resized: HashMap<u32, Arc<RgbaImage>>,
}

impl AssetCache {
    pub fn new(paths: &AssetPaths) -> Self {
        Self {
            animations: paths.animations.clone(),
            head_path: paths.head.clone(),
            raw: HashMap::new(),
            resized: HashMap::new(),
            head_raw: None,
            head_resized: HashMap::new(),
        }
    }

    pub fn source_count(&self) -> usize {
        self.animations.len()
    }

    pub fn random_source<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SourceId, AssetError> {
        if self.animations.is_empty() {
            return Err(AssetError::NoSources);
        }
        Ok(SourceId(rng.random_range(0..self.animations.len())))
    }

    /// Decodes every animation up front. Returns the total frame count.
    pub fn preload(&mut self) -> Result<usize, AssetError> {
        let mut total = 0;
        for index in 0..self.animations.len() {
            total += self.raw_frames(SourceId(index))?.len();
        }
        Ok(total)
    }

    /// Frames of `source` resized to `size`×`size`.
    pub fn frames(&mut self, source: SourceId, size: u32) -> Result<FrameSet, AssetError> {
        if let Some(frames) = self.resized.get(&(source, size)) {
            return Ok(Arc::clone(frames));
        }

        let raw = self.raw_frames(source)?;
        let resized: FrameSet = raw.iter().map(|frame| resize_square(frame, size)).collect();
        self.resized.insert((source, size), Arc::clone(&resized));
        Ok(resized)
    }

    /// The rotating-head image resized to `size`×`size`.
    pub fn head(&mut self, size: u32) -> Result<Arc<RgbaImage>, AssetError> {
        if let Some(head) = self.head_resized.get(&size) {
            return Ok(Arc::clone(head));
        }

        let raw = match self.head_raw.clone() {
            Some(raw) => raw,
            None => {
                let decoded = Arc::new(decode_still(&self.head_path)?);
                self.head_raw = Some(Arc::clone(&decoded));
                decoded
            }
        };

        let resized = Arc::new(resize_square(&raw, size));
        self.head_resized.insert(size, Arc::clone(&resized));
        Ok(resized)
    }

    fn raw_frames(&mut self, source: SourceId) -> Result<FrameSet, AssetError> {
        if let Some(frames) = self.raw.get(&source) {
            return Ok(Arc::clone(frames));
        }

        let path = self
            .animations
            .get(source.0)
            .ok_or(AssetError::UnknownSource(source.0))?;
        let frames: FrameSet = decode_frames(path)?.into();
        info!(
            "[RICKROLL][ASSETS] Decoded {} frame(s) from {}",
            frames.len(),
            path.display()
        );
        self.raw.insert(source, Arc::clone(&frames));
        Ok(frames)
    }
}

fn resize_square(frame: &RgbaImage, size: u32) -> RgbaImage {
    image::imageops::resize(frame, size, size, FilterType::Lanczos3)
}

fn open(path: &Path) -> Result<BufReader<File>, AssetError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| AssetError::Open {
            path: path.to_path_buf(),
            source,
        })
}

fn decode_error(path: &Path) -> impl FnOnce(image::ImageError) -> AssetError + '_ {
    move |source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    }
}

fn is_gif(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gif"))
}

/// Every frame of a GIF, or the single frame of any other image format.
fn decode_frames(path: &Path) -> Result<Vec<RgbaImage>, AssetError> {
    if !is_gif(path) {
        return decode_still(path).map(|frame| vec![frame]);
    }

    let decoder = GifDecoder::new(open(path)?).map_err(decode_error(path))?;
    let frames: Vec<RgbaImage> = decoder
        .into_frames()
        .collect_frames()
        .map_err(decode_error(path))?
        .into_iter()
        .map(|frame| frame.into_buffer())
        .collect();

    if frames.is_empty() {
        return Err(AssetError::Empty(path.to_path_buf()));
    }
    Ok(frames)
}

fn decode_still(path: &Path) -> Result<RgbaImage, AssetError> {
    let reader = ImageReader::new(open(path)?)
        .with_guessed_format()
        .map_err(|source| AssetError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(reader.decode().map_err(decode_error(path))?.to_rgba8())
}
