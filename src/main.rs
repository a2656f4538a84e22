use bevy::prelude::*;
use bevy::window::WindowResolution;
use coalfield::config::{self, FieldVariant, GameConfig};
use coalfield::plugin::{spawn_field_session, FieldPlugin};
use std::env;

fn main() {
    // Variant switch, e.g. COALFIELD_VARIANT=asteroid
    let variant = match env::var("COALFIELD_VARIANT") {
        Ok(name) => FieldVariant::from_name(&name).unwrap_or_else(|| {
            eprintln!("⚠ Unknown COALFIELD_VARIANT '{name}'; using the coal field");
            FieldVariant::CoalField
        }),
        Err(_) => FieldVariant::CoalField,
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Coalfield".into(),
                resolution: WindowResolution::new(1280, 720),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.04, 0.02, 0.08)))
        // Insert the preset first; load_game_config overlays assets/field.toml
        // (if present) before the session is spawned from it.
        .insert_resource(GameConfig::preset(variant))
        .add_plugins(FieldPlugin)
        .add_systems(
            Startup,
            config::load_game_config.before(spawn_field_session),
        )
        .run();
}
