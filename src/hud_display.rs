//! Bevy UI adapter for [`HudState`](crate::hud::HudState).
//!
//! Layout:
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ [█████████░░░]       Find the small …       │
//! │                                             │
//! │                 Present                     │  ← follows the target
//! │        Congratulations! You found "F2"!     │
//! │                                             │
//! │   Mouse / A, D: steer   W, S: fly   …       │
//! └─────────────────────────────────────────────┘
//! ```

use crate::plugin::{spawn_field_session, FieldSet};
use crate::session::FieldSession;
use bevy::prelude::*;

/// Pixels the label sits above the projected target centre.
const LABEL_LIFT: f32 = 36.0;
const METER_WIDTH: f32 = 220.0;

/// Which HUD element a UI node displays.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudElement {
    Status,
    MeterFill,
    Label,
    Notification,
    ControlsHint,
}

pub struct HudDisplayPlugin;

impl Plugin for HudDisplayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_hud.after(spawn_field_session))
            .add_systems(Update, sync_hud_system.in_set(FieldSet::Present));
    }
}

fn meter_color() -> Color {
    Color::srgb(0.55, 0.35, 1.0)
}

fn status_color() -> Color {
    Color::srgb(0.95, 0.95, 1.0)
}

fn label_color() -> Color {
    Color::srgb(0.4, 1.0, 0.5)
}

fn hint_color() -> Color {
    Color::srgba(0.85, 0.85, 0.95, 0.7)
}

// ── Startup ───────────────────────────────────────────────────────────────────

pub fn setup_hud(mut commands: Commands, session: Res<FieldSession>) {
    let hud = &session.hud;

    // ── Meter bar ─────────────────────────────────────────────────────────────
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(16.0),
                top: Val::Px(16.0),
                width: Val::Px(METER_WIDTH),
                height: Val::Px(14.0),
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.5)),
            BorderColor::all(meter_color()),
        ))
        .with_children(|bar| {
            bar.spawn((
                Node {
                    width: Val::Percent(hud.meter_percent),
                    height: Val::Percent(100.0),
                    ..default()
                },
                BackgroundColor(meter_color()),
                HudElement::MeterFill,
            ));
        });

    // ── Status line ───────────────────────────────────────────────────────────
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            width: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            ..default()
        })
        .with_children(|row| {
            row.spawn((
                Text::new(hud.status()),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(status_color()),
                HudElement::Status,
            ));
        });

    // ── Target label (hidden until found) ────────────────────────────────────
    commands.spawn((
        Text::new(hud.label_text.clone()),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(label_color()),
        Node {
            position_type: PositionType::Absolute,
            ..default()
        },
        Visibility::Hidden,
        HudElement::Label,
    ));

    // ── Notification banner ───────────────────────────────────────────────────
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            top: Val::Percent(40.0),
            width: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            ..default()
        })
        .with_children(|row| {
            row.spawn((
                Text::new(""),
                TextFont {
                    font_size: 34.0,
                    ..default()
                },
                TextColor(label_color()),
                Visibility::Hidden,
                HudElement::Notification,
            ));
        });

    // ── Controls hint ─────────────────────────────────────────────────────────
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(16.0),
            width: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            ..default()
        })
        .with_children(|row| {
            row.spawn((
                Text::new(session.text.controls_hint.clone()),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(hint_color()),
                HudElement::ControlsHint,
            ));
        });
}

// ── Present ───────────────────────────────────────────────────────────────────

fn set_text(text: Option<Mut<Text>>, value: &str) {
    if let Some(mut text) = text {
        if text.0 != value {
            text.0 = value.to_string();
        }
    }
}

fn set_visible(visibility: &mut Visibility, visible: bool) {
    let wanted = if visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    if *visibility != wanted {
        *visibility = wanted;
    }
}

/// Copy the session's [`HudState`](crate::hud::HudState) onto the UI nodes.
pub fn sync_hud_system(
    session: Option<Res<FieldSession>>,
    mut elements: Query<(&HudElement, Option<&mut Text>, &mut Node, &mut Visibility)>,
) {
    let Some(session) = session else {
        return;
    };
    let hud = &session.hud;

    for (element, text, mut node, mut visibility) in elements.iter_mut() {
        match element {
            HudElement::Status => set_text(text, hud.status()),
            HudElement::MeterFill => {
                let width = Val::Percent(hud.meter_percent.clamp(0.0, 100.0));
                if node.width != width {
                    node.width = width;
                }
            }
            HudElement::Label => {
                set_text(text, &hud.label_text);
                match hud.label_anchor.filter(|_| hud.label_visible) {
                    Some(anchor) => {
                        node.left = Val::Px(anchor.x);
                        node.top = Val::Px(anchor.y - LABEL_LIFT);
                        set_visible(&mut visibility, true);
                    }
                    None => set_visible(&mut visibility, false),
                }
            }
            HudElement::Notification => match &hud.notification {
                Some(message) => {
                    set_text(text, message);
                    set_visible(&mut visibility, true);
                }
                None => set_visible(&mut visibility, false),
            },
            HudElement::ControlsHint => {
                set_visible(&mut visibility, hud.controls_hint_visible)
            }
        }
    }
}
