//! Sound cues and the audio seam used by the game loop.
//!
//! The core never touches an audio engine.  It talks to [`AudioBridge`], and
//! the default implementation, [`AudioQueue`], records commands for the Bevy
//! playback adapter to drain each frame.  A cue whose file never loaded is
//! unavailable and every call for it is a silent no-op.

use crate::error::FieldError;
use bevy::prelude::*;
use std::collections::HashSet;

/// Every sound the game can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Looping sleigh bells while the player moves.
    Movement,
    Scan,
    Success,
    /// Background music, started by the first click.
    Music,
}

impl SoundCue {
    pub const ALL: [SoundCue; 4] = [
        SoundCue::Movement,
        SoundCue::Scan,
        SoundCue::Success,
        SoundCue::Music,
    ];

    /// File name under `assets/sounds/`.
    pub fn file_name(self) -> &'static str {
        match self {
            SoundCue::Movement => "sleigh_bells.ogg",
            SoundCue::Scan => "scan.ogg",
            SoundCue::Success => "success.ogg",
            SoundCue::Music => "music.ogg",
        }
    }
}

/// Fire-and-forget audio operations.  Implementations must never fail loudly.
pub trait AudioBridge {
    fn play_once(&mut self, cue: SoundCue);
    fn play_looping(&mut self, cue: SoundCue);
    fn stop(&mut self, cue: SoundCue);
    fn is_playing(&self, cue: SoundCue) -> bool;
}

/// A queued command for the playback adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCommand {
    PlayOnce(SoundCue),
    PlayLooping(SoundCue),
    Stop(SoundCue),
}

/// Command outbox plus a mirror of what is currently audible.
#[derive(Resource, Debug, Clone, Default)]
pub struct AudioQueue {
    available: HashSet<SoundCue>,
    playing: HashSet<SoundCue>,
    commands: Vec<SoundCommand>,
}

impl AudioQueue {
    /// A queue where every listed cue has a loaded asset.
    pub fn with_available(cues: impl IntoIterator<Item = SoundCue>) -> Self {
        Self {
            available: cues.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn set_available(&mut self, cue: SoundCue, available: bool) {
        if available {
            self.available.insert(cue);
        } else {
            self.available.remove(&cue);
        }
    }

    pub fn is_available(&self, cue: SoundCue) -> bool {
        self.available.contains(&cue)
    }

    fn check(&self, cue: SoundCue) -> Result<(), FieldError> {
        if self.is_available(cue) {
            Ok(())
        } else {
            Err(FieldError::AssetUnavailable { cue })
        }
    }

    /// The adapter reports that a one-shot finished or a sink disappeared.
    pub fn mark_finished(&mut self, cue: SoundCue) {
        self.playing.remove(&cue);
    }

    /// Hand the queued commands to the adapter.
    pub fn drain_commands(&mut self) -> Vec<SoundCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl AudioBridge for AudioQueue {
    fn play_once(&mut self, cue: SoundCue) {
        if let Err(e) = self.check(cue) {
            trace!("{e}");
            return;
        }
        if self.playing.insert(cue) {
            self.commands.push(SoundCommand::PlayOnce(cue));
        }
    }

    fn play_looping(&mut self, cue: SoundCue) {
        if let Err(e) = self.check(cue) {
            trace!("{e}");
            return;
        }
        if self.playing.insert(cue) {
            self.commands.push(SoundCommand::PlayLooping(cue));
        }
    }

    fn stop(&mut self, cue: SoundCue) {
        if self.playing.remove(&cue) {
            self.commands.push(SoundCommand::Stop(cue));
        }
    }

    fn is_playing(&self, cue: SoundCue) -> bool {
        self.playing.contains(&cue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_cue_is_silent_no_op() {
        let mut queue = AudioQueue::default();
        queue.play_once(SoundCue::Scan);
        queue.play_looping(SoundCue::Movement);
        assert!(!queue.is_playing(SoundCue::Scan));
        assert!(queue.drain_commands().is_empty());
    }

    #[test]
    fn play_while_playing_is_ignored() {
        let mut queue = AudioQueue::with_available(SoundCue::ALL);
        queue.play_once(SoundCue::Scan);
        queue.play_once(SoundCue::Scan);
        assert_eq!(queue.drain_commands(), vec![SoundCommand::PlayOnce(SoundCue::Scan)]);

        queue.mark_finished(SoundCue::Scan);
        queue.play_once(SoundCue::Scan);
        assert_eq!(queue.drain_commands(), vec![SoundCommand::PlayOnce(SoundCue::Scan)]);
    }

    #[test]
    fn stop_only_emits_for_playing_cues() {
        let mut queue = AudioQueue::with_available(SoundCue::ALL);
        queue.stop(SoundCue::Movement);
        assert!(queue.drain_commands().is_empty());

        queue.play_looping(SoundCue::Movement);
        queue.stop(SoundCue::Movement);
        assert_eq!(
            queue.drain_commands(),
            vec![
                SoundCommand::PlayLooping(SoundCue::Movement),
                SoundCommand::Stop(SoundCue::Movement),
            ]
        );
        assert!(!queue.is_playing(SoundCue::Movement));
    }
}
