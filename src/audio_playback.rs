//! Bevy audio adapter.
//!
//! Loads one [`AudioSource`] per [`SoundCue`] whose file exists under
//! `assets/sounds/`, marks the rest unavailable in the [`AudioQueue`], and each
//! frame turns queued [`SoundCommand`]s into `AudioPlayer` entities.

use crate::audio::{AudioBridge, AudioQueue, SoundCommand, SoundCue};
use crate::constants::SOUND_DIR;
use crate::plugin::FieldSet;
use bevy::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Loaded handles for every available cue.
#[derive(Resource, Debug, Clone, Default)]
pub struct SoundBank {
    handles: HashMap<SoundCue, Handle<AudioSource>>,
}

impl SoundBank {
    pub fn get(&self, cue: SoundCue) -> Option<&Handle<AudioSource>> {
        self.handles.get(&cue)
    }
}

/// Tags a playing sound entity with its cue.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSound(pub SoundCue);

pub struct AudioPlaybackPlugin;

impl Plugin for AudioPlaybackPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_sound_bank)
            .add_systems(Update, audio_playback_system.in_set(FieldSet::Present));
    }
}

pub fn setup_sound_bank(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut queue: ResMut<AudioQueue>,
) {
    let mut bank = SoundBank::default();
    for cue in SoundCue::ALL {
        let file = cue.file_name();
        let on_disk = format!("{SOUND_DIR}/{file}");
        if Path::new(&on_disk).exists() {
            bank.handles
                .insert(cue, asset_server.load(format!("sounds/{file}")));
            queue.set_available(cue, true);
        } else {
            warn!("Sound {on_disk} not found; {cue:?} will be silent");
            queue.set_available(cue, false);
        }
    }
    commands.insert_resource(bank);
}

/// Reconcile finished sounds, then execute queued commands.
pub fn audio_playback_system(
    mut commands: Commands,
    bank: Option<Res<SoundBank>>,
    mut queue: ResMut<AudioQueue>,
    active: Query<(Entity, &ActiveSound)>,
) {
    let Some(bank) = bank else {
        return;
    };
    let pending = queue.drain_commands();

    // One-shots despawn themselves when done; forget any cue with no entity
    // left, unless it was only just requested.
    let alive: HashSet<SoundCue> = active.iter().map(|(_, sound)| sound.0).collect();
    let requested: HashSet<SoundCue> = pending
        .iter()
        .filter_map(|command| match command {
            SoundCommand::PlayOnce(cue) | SoundCommand::PlayLooping(cue) => Some(*cue),
            SoundCommand::Stop(_) => None,
        })
        .collect();
    for cue in SoundCue::ALL {
        if queue.is_playing(cue) && !alive.contains(&cue) && !requested.contains(&cue) {
            queue.mark_finished(cue);
        }
    }

    let mut spawned: HashMap<SoundCue, Vec<Entity>> = HashMap::new();
    for command in pending {
        match command {
            SoundCommand::PlayOnce(cue) | SoundCommand::PlayLooping(cue) => {
                let Some(handle) = bank.get(cue) else {
                    continue;
                };
                let settings = if matches!(command, SoundCommand::PlayLooping(_)) {
                    PlaybackSettings::LOOP
                } else {
                    PlaybackSettings::DESPAWN
                };
                let entity = commands
                    .spawn((AudioPlayer::new(handle.clone()), settings, ActiveSound(cue)))
                    .id();
                spawned.entry(cue).or_default().push(entity);
            }
            SoundCommand::Stop(cue) => {
                for (entity, sound) in active.iter() {
                    if sound.0 == cue {
                        commands.entity(entity).despawn();
                    }
                }
                for entity in spawned.remove(&cue).unwrap_or_default() {
                    commands.entity(entity).despawn();
                }
            }
        }
    }
}
