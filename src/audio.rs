//! Sequential playlist playback on a background thread, plus the phase flag
//! it flips for the UI.

use std::{
    io,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::{error::AudioError, info, warn};

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Normal,
    Heightened,
}

/// Single-writer flag shared between the audio thread and the UI loop. The UI
/// may read a stale value for one tick.
#[derive(Debug, Clone, Default)]
pub struct PhaseFlag(Arc<AtomicBool>);

impl PhaseFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_heightened(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_heightened(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        if self.is_heightened() {
            Phase::Heightened
        } else {
            Phase::Normal
        }
    }
}

/// Output device able to play one track at a time.
pub trait TrackPlayer {
    /// Starts `track`, replacing nothing: the caller waits for idle first.
    fn play(&mut self, track: &Path) -> Result<(), AudioError>;

    fn is_busy(&self) -> bool;
}

pub struct AudioSequencer {
    playlist: Vec<PathBuf>,
    poll: Duration,
}

impl AudioSequencer {
    pub fn new(playlist: Vec<PathBuf>, poll: Duration) -> Self {
        Self { playlist, poll }
    }

    /// Plays the playlist in order, blocking until each track finishes.
    /// `on_track_started` receives the playlist index of every track that
    /// actually started. Returns how many tracks played.
    pub fn play_all<P, F>(&self, player: &mut P, mut on_track_started: F) -> usize
    where
        P: TrackPlayer + ?Sized,
        F: FnMut(usize),
    {
        let mut played = 0;

        for (index, track) in self.playlist.iter().enumerate() {
            if let Err(e) = player.play(track) {
                warn!("[RICKROLL][AUDIO] Skipping track {}: {}", index, e);
                continue;
            }

            info!("[RICKROLL][AUDIO] Playing track {}: {}", index, track.display());
            played += 1;
            on_track_started(index);

            while player.is_busy() {
                thread::sleep(self.poll);
            }
        }

        played
    }

    /// Runs [`play_all`](Self::play_all) on a dedicated thread. The player is
    /// built on that thread because output streams are not `Send`.
    pub fn spawn<P, M, F>(self, make_player: M, on_track_started: F) -> io::Result<JoinHandle<()>>
    where
        P: TrackPlayer,
        M: FnOnce() -> Result<P, AudioError> + Send + 'static,
        F: FnMut(usize) + Send + 'static,
    {
        thread::Builder::new()
            .name("rickroll-audio".to_string())
            .spawn(move || {
                let mut player = match make_player() {
                    Ok(player) => player,
                    Err(e) => {
                        warn!("[RICKROLL][AUDIO] No audio output, music disabled: {}", e);
                        return;
                    }
                };

                let played = self.play_all(&mut player, on_track_started);
                info!("[RICKROLL][AUDIO] Playlist finished ({} track(s) played)", played);
            })
    }
}


#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::{fakes::ScriptedPlayer, *};

    fn playlist() -> Vec<PathBuf> {
        vec![
            PathBuf::from("rickroll.mp3"),
            PathBuf::from("rickroll2.mp3"),
            PathBuf::from("rickroll3.mp3"),
        ]
    }

    #[test]
    fn plays_tracks_in_order_waiting_for_each() {
        let sequencer = AudioSequencer::new(playlist(), Duration::ZERO);
        let mut player = ScriptedPlayer::new(3);
        let mut started = Vec::new();

        let played = sequencer.play_all(&mut player, |index| started.push(index));

        assert_eq!(played, 3);
        assert_eq!(started, vec![0, 1, 2]);
        assert_eq!(player.played, playlist());
    }

    #[test]
    fn failing_tracks_are_skipped() {
        let sequencer = AudioSequencer::new(playlist(), Duration::ZERO);
        let mut player = ScriptedPlayer::new(1);
        player.failing.insert(PathBuf::from("rickroll2.mp3"));
        let mut started = Vec::new();

        let played = sequencer.play_all(&mut player, |index| started.push(index));

        assert_eq!(played, 2);
        assert_eq!(started, vec![0, 2]);
    }

    #[test]
    fn second_track_flips_the_phase_flag() {
        let phase = PhaseFlag::new();
        let sequencer = AudioSequencer::new(playlist(), Duration::ZERO);
        let mut player = ScriptedPlayer::new(0);
        let mut seen = Vec::new();

        let writer = phase.clone();
        sequencer.play_all(&mut player, |index| {
            if index == 1 {
                writer.mark_heightened();
            }
            seen.push(writer.phase());
        });

        assert_eq!(seen, vec![Phase::Normal, Phase::Heightened, Phase::Heightened]);
        assert!(phase.is_heightened());
    }

    #[test]
    fn spawn_runs_off_thread_and_reports_progress() {
        let (tx, rx) = mpsc::channel();
        let sequencer = AudioSequencer::new(playlist(), Duration::from_millis(1));

        let handle = sequencer
            .spawn(|| Ok(ScriptedPlayer::new(2)), move |index| {
                let _ = tx.send(index);
            })
            .unwrap();
        handle.join().unwrap();

        assert_eq!(rx.iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn spawn_without_output_device_is_silent() {
        let sequencer = AudioSequencer::new(playlist(), Duration::ZERO);
        let handle = sequencer
            .spawn(
                || -> Result<ScriptedPlayer, AudioError> {
                    Err(AudioError::Output("no device".into()))
                },
                |_| panic!("no track can start without a player"),
            )
            .unwrap();
        handle.join().unwrap();
    }
}
