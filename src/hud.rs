// In-garden HUD: completion hearts, zone name, restart and language toggle.
use bevy::prelude::*;

use crate::AdventureSet;
use crate::i18n::Locale;
use crate::progress::{GameProgress, Screen, ZONE_COUNT};

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Screen::Garden), spawn_hud)
            .add_systems(
                Update,
                (hud_buttons, update_hud)
                    .chain()
                    .run_if(in_state(Screen::Garden))
                    .in_set(AdventureSet::Present),
            );
    }
}

const PINK: Color = Color::srgb_u8(0xFF, 0x6B, 0x9D);
const HEART_EMPTY: Color = Color::srgba(1.0, 1.0, 1.0, 0.25);

#[derive(Component)]
struct HudRoot;

#[derive(Component)]
struct Heart(usize);

#[derive(Component)]
struct ZoneName;

#[derive(Component, Clone, Copy)]
enum HudButton {
    Restart,
    Language,
}

#[derive(Component)]
struct HudButtonLabel(HudButton);

fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            HudRoot,
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(16.0),
                width: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Val::Px(6.0),
                ..default()
            },
            DespawnOnExit(Screen::Garden),
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        column_gap: Val::Px(10.0),
                        padding: UiRect::axes(Val::Px(24.0), Val::Px(8.0)),
                        border: UiRect::all(Val::Px(1.0)),
                        ..default()
                    },
                    BorderColor::all(PINK.with_alpha(0.2)),
                    BackgroundColor(Color::srgba(0.18, 0.12, 0.24, 0.75)),
                ))
                .with_children(|row| {
                    for index in 0..ZONE_COUNT {
                        row.spawn((
                            Heart(index),
                            Node {
                                width: Val::Px(18.0),
                                height: Val::Px(18.0),
                                ..default()
                            },
                            BackgroundColor(HEART_EMPTY),
                        ));
                    }
                });
            parent.spawn((
                ZoneName,
                Text::new(""),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgba(0.97, 0.65, 0.76, 0.7)),
            ));
        });

    // Corner buttons.
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(16.0),
                right: Val::Px(16.0),
                column_gap: Val::Px(8.0),
                ..default()
            },
            DespawnOnExit(Screen::Garden),
        ))
        .with_children(|parent| {
            spawn_button(parent, HudButton::Language);
            spawn_button(parent, HudButton::Restart);
        });
}

fn spawn_button(parent: &mut ChildSpawnerCommands, marker: HudButton) {
    parent
        .spawn((
            marker,
            Button,
            Node {
                padding: UiRect::axes(Val::Px(12.0), Val::Px(6.0)),
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
            BorderColor::all(PINK.with_alpha(0.4)),
            BackgroundColor(Color::srgba(0.18, 0.12, 0.24, 0.75)),
        ))
        .with_children(|btn| {
            btn.spawn((
                HudButtonLabel(marker),
                Text::new(""),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

fn hud_buttons(
    query: Query<(&Interaction, &HudButton), Changed<Interaction>>,
    mut progress: ResMut<GameProgress>,
    mut locale: ResMut<Locale>,
) {
    for (interaction, button) in &query {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match button {
            HudButton::Restart => progress.reset_to_start(),
            HudButton::Language => {
                locale.language = locale.language.next();
                info!(language = locale.language.code(), "language changed");
            }
        }
    }
}

fn update_hud(
    progress: Res<GameProgress>,
    locale: Res<Locale>,
    mut root: Query<&mut Visibility, With<HudRoot>>,
    mut hearts: Query<(&Heart, &mut BackgroundColor)>,
    mut zone_name: Query<&mut Text, (With<ZoneName>, Without<HudButtonLabel>)>,
    mut labels: Query<(&HudButtonLabel, &mut Text), Without<ZoneName>>,
    added: Query<(), Added<HudRoot>>,
) {
    // Fresh entities need one pass even if nothing changed.
    let fresh = !added.is_empty();
    if !progress.is_changed() && !locale.is_changed() && !fresh {
        return;
    }

    if let Ok(mut visibility) = root.single_mut() {
        *visibility = if progress.show_fail {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        };
    }
    for (heart, mut color) in &mut hearts {
        color.0 = if progress.zones_completed[heart.0] {
            PINK
        } else {
            HEART_EMPTY
        };
    }

    let texts = locale.texts();
    if let Ok(mut text) = zone_name.single_mut() {
        **text = texts.zones[progress.current_zone].to_string();
    }
    for (label, mut text) in &mut labels {
        **text = match label.0 {
            HudButton::Restart => texts.restart.to_string(),
            HudButton::Language => locale.language.next().code().to_string(),
        };
    }
}
