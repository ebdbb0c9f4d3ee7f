use std::{fs::File, io::BufReader, path::Path};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::{audio::TrackPlayer, error::AudioError};

/// Default output device through rodio. The stream must outlive the sink, so
/// both live here.
pub struct RodioPlayer {
    _stream: OutputStream,
    _handle: OutputStreamHandle,
    sink: Sink,
}

impl RodioPlayer {
    pub fn open_default() -> Result<Self, AudioError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| AudioError::Output(e.to_string()))?;
        let sink = Sink::try_new(&handle).map_err(|e| AudioError::Output(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            _handle: handle,
            sink,
        })
    }
}

impl TrackPlayer for RodioPlayer {
    fn play(&mut self, track: &Path) -> Result<(), AudioError> {
        let file = File::open(track).map_err(|source| AudioError::Open {
            path: track.to_path_buf(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| AudioError::Decode {
            path: track.to_path_buf(),
            reason: e.to_string(),
        })?;

        self.sink.append(source);
        self.sink.play();
        Ok(())
    }

    fn is_busy(&self) -> bool {
        !self.sink.empty()
    }
}
