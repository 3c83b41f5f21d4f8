//! Ambient audio playback.
//!
//! The card only needs "restart from the top and play" and "stop".
//! Decoding is delegated to an external player program, the same way the
//! system file manager is delegated to for opening folders: spawn it, keep
//! the child handle, kill it to stop.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

use thiserror::Error;

/// File name of the built-in track.
pub const DEFAULT_TRACK: &str = "i_hear_a_symphony.m4a";

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("audio track not found: {0}")]
    MissingTrack(PathBuf),
    #[error("could not start `{player}`: {source}")]
    Spawn {
        player: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{player}` stopped playing: {status}")]
    Exited { player: String, status: ExitStatus },
}

/// Something that can play the card's track.
pub trait Playback {
    /// Stop whatever is playing, rewind, and start again.
    fn restart(&mut self) -> Result<(), PlaybackError>;

    /// Stop playback. Idempotent.
    fn stop(&mut self);

    /// Called periodically. A track that ended on its own is restarted so
    /// the music loops; a player that gave up is an error.
    fn keep_looping(&mut self) -> Result<(), PlaybackError> {
        Ok(())
    }
}

// ============================================================================
// EXTERNAL PLAYER
// ============================================================================

/// Plays the track through an external command-line player.
#[derive(Debug)]
pub struct CommandPlayer {
    program: String,
    track: PathBuf,
    child: Option<Child>,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>, track: impl Into<PathBuf>) -> Self {
        CommandPlayer {
            program: program.into(),
            track: track.into(),
            child: None,
        }
    }

    /// Arguments the known players need to play quietly without a window.
    fn args(&self) -> Vec<String> {
        let track = self.track.display().to_string();
        match program_name(&self.program) {
            "ffplay" => vec![
                "-nodisp".into(),
                "-autoexit".into(),
                "-loglevel".into(),
                "quiet".into(),
                track,
            ],
            "mpv" => vec!["--no-video".into(), "--really-quiet".into(), track],
            _ => vec![track],
        }
    }

    fn spawn(&mut self) -> Result<(), PlaybackError> {
        if !self.track.is_file() {
            return Err(PlaybackError::MissingTrack(self.track.clone()));
        }
        let child = Command::new(&self.program)
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| PlaybackError::Spawn {
                player: self.program.clone(),
                source,
            })?;
        tracing::debug!(pid = child.id(), player = %self.program, "audio player started");
        self.child = Some(child);
        Ok(())
    }
}

impl Playback for CommandPlayer {
    fn restart(&mut self) -> Result<(), PlaybackError> {
        self.stop();
        self.spawn()
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            // Best-effort: the player may already have exited.
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn keep_looping(&mut self) -> Result<(), PlaybackError> {
        let status = match self.child.as_mut().map(Child::try_wait) {
            Some(Ok(Some(status))) => status,
            _ => return Ok(()),
        };
        self.child = None;
        if !status.success() {
            return Err(PlaybackError::Exited {
                player: self.program.clone(),
                status,
            });
        }
        tracing::debug!("audio track ended, looping");
        self.spawn()
    }
}

impl Drop for CommandPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn program_name(program: &str) -> &str {
    Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(program)
}

// ============================================================================
// SILENCE
// ============================================================================

/// Playback that always succeeds and makes no sound.
#[derive(Debug, Default)]
pub struct Silent;

impl Playback for Silent {
    fn restart(&mut self) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn stop(&mut self) {}
}

// ============================================================================
// DEFAULTS
// ============================================================================

/// Player program used when none is configured.
pub fn default_player() -> &'static str {
    if cfg!(target_os = "macos") { "afplay" } else { "ffplay" }
}

/// Resolve the track path: explicit path wins, then the built-in track in
/// the working directory, then in the user's music folder.
///
/// Falls back to the working-directory path even when it does not exist;
/// playback then fails and the card offers a manual start.
pub fn resolve_track(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    let local = PathBuf::from(DEFAULT_TRACK);
    if local.is_file() {
        return local;
    }
    dirs::audio_dir()
        .map(|dir| dir.join(DEFAULT_TRACK))
        .filter(|p| p.is_file())
        .unwrap_or(local)
}

// ============================================================================
// TESTS
// ============================================================================
