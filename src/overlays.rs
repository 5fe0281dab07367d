// Fail screen and the typewriter dialog box.
use bevy::prelude::*;

use crate::AdventureSet;
use crate::i18n::Locale;
use crate::progress::{GameProgress, Screen};

pub struct OverlaysPlugin;

impl Plugin for OverlaysPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Screen::Garden), (spawn_fail_screen, spawn_dialog_box))
            .add_systems(OnExit(Screen::Garden), |mut commands: Commands| {
                commands.remove_resource::<Typewriter>();
            })
            .add_systems(
                Update,
                (
                    fail_screen_buttons,
                    update_fail_screen,
                    dialog_click,
                    type_dialog,
                )
                    .chain()
                    .run_if(in_state(Screen::Garden))
                    .in_set(AdventureSet::Present),
            );
    }
}

/// Seconds between revealed characters.
const CHAR_INTERVAL: f32 = 0.035;
/// Seconds a fully shown message stays up.
const AUTO_DISMISS: f32 = 5.0;

const PINK: Color = Color::srgb_u8(0xFF, 0x6B, 0x9D);
const LIGHT_PINK: Color = Color::srgb_u8(0xF8, 0xA5, 0xC2);

/// Reveals a message one character at a time.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Typewriter {
    text: String,
    len: usize,
    shown: usize,
    elapsed: f32,
    idle: f32,
}

impl Typewriter {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            len: text.chars().count(),
            text,
            shown: 0,
            elapsed: 0.0,
            idle: 0.0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_complete(&self) -> bool {
        self.shown >= self.len
    }

    pub fn visible(&self) -> String {
        self.text.chars().take(self.shown).collect()
    }

    /// Returns `true` once the message has been fully shown long enough.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.is_complete() {
            self.idle += dt;
            return self.idle >= AUTO_DISMISS;
        }
        self.elapsed += dt;
        self.shown = ((self.elapsed / CHAR_INTERVAL) as usize).min(self.len);
        false
    }

    /// First click shows everything; a click on a full message dismisses it.
    pub fn click(&mut self) -> bool {
        if self.is_complete() {
            return true;
        }
        self.shown = self.len;
        self.idle = 0.0;
        false
    }
}

#[derive(Component)]
struct FailScreen;

#[derive(Component)]
struct FailMessage;

#[derive(Component)]
struct FailButtonLabel;

#[derive(Component)]
struct TryAgain;

#[derive(Component)]
struct DialogBox;

#[derive(Component)]
struct DialogText;

fn spawn_fail_screen(mut commands: Commands) {
    commands
        .spawn((
            FailScreen,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(24.0),
                position_type: PositionType::Absolute,
                ..default()
            },
            BackgroundColor(Color::srgba(0.1, 0.04, 0.12, 0.9)),
            GlobalZIndex(150),
            Visibility::Hidden,
            DespawnOnExit(Screen::Garden),
        ))
        .with_children(|parent| {
            parent.spawn((
                FailMessage,
                Text::new(""),
                TextFont {
                    font_size: 30.0,
                    ..default()
                },
                TextColor(LIGHT_PINK),
            ));
            parent
                .spawn((
                    TryAgain,
                    Button,
                    Node {
                        padding: UiRect::axes(Val::Px(32.0), Val::Px(12.0)),
                        border: UiRect::all(Val::Px(2.0)),
                        ..default()
                    },
                    BorderColor::all(PINK),
                    BackgroundColor(PINK.with_alpha(0.2)),
                ))
                .with_children(|btn| {
                    btn.spawn((
                        FailButtonLabel,
                        Text::new(""),
                        TextFont {
                            font_size: 22.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                    ));
                });
        });
}

fn fail_screen_buttons(
    query: Query<&Interaction, (Changed<Interaction>, With<TryAgain>)>,
    mut progress: ResMut<GameProgress>,
) {
    for interaction in &query {
        if *interaction == Interaction::Pressed && progress.show_fail {
            progress.dismiss_fail();
        }
    }
}

fn update_fail_screen(
    progress: Res<GameProgress>,
    locale: Res<Locale>,
    mut screen: Query<&mut Visibility, With<FailScreen>>,
    mut message: Query<&mut Text, (With<FailMessage>, Without<FailButtonLabel>)>,
    mut label: Query<&mut Text, (With<FailButtonLabel>, Without<FailMessage>)>,
) {
    if !progress.is_changed() && !locale.is_changed() {
        return;
    }
    let Ok(mut visibility) = screen.single_mut() else {
        return;
    };
    if !progress.show_fail {
        *visibility = Visibility::Hidden;
        return;
    }
    *visibility = Visibility::Inherited;
    if let Ok(mut text) = message.single_mut() {
        **text = progress.fail_message.clone();
    }
    if let Ok(mut text) = label.single_mut() {
        **text = locale.texts().fail_button.to_string();
    }
}

fn spawn_dialog_box(mut commands: Commands) {
    commands
        .spawn((
            DialogBox,
            Button,
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(24.0),
                left: Val::Percent(50.0),
                width: Val::Px(700.0),
                max_width: Val::Vw(90.0),
                margin: UiRect::left(Val::Px(-350.0)),
                padding: UiRect::axes(Val::Px(28.0), Val::Px(20.0)),
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
            BorderColor::all(PINK.with_alpha(0.25)),
            BackgroundColor(Color::srgba(0.12, 0.06, 0.14, 0.88)),
            GlobalZIndex(120),
            Visibility::Hidden,
            DespawnOnExit(Screen::Garden),
        ))
        .with_children(|parent| {
            parent.spawn((
                DialogText,
                Text::new(""),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(LIGHT_PINK),
            ));
        });
}

fn dialog_click(
    query: Query<&Interaction, (Changed<Interaction>, With<DialogBox>)>,
    typewriter: Option<ResMut<Typewriter>>,
    mut progress: ResMut<GameProgress>,
) {
    let Some(mut typewriter) = typewriter else {
        return;
    };
    for interaction in &query {
        if *interaction == Interaction::Pressed && typewriter.click() {
            progress.set_dialog(None);
        }
    }
}

fn type_dialog(
    mut commands: Commands,
    time: Res<Time>,
    mut progress: ResMut<GameProgress>,
    typewriter: Option<ResMut<Typewriter>>,
    mut dialog: Query<&mut Visibility, With<DialogBox>>,
    mut text: Query<&mut Text, With<DialogText>>,
) {
    let Ok(mut visibility) = dialog.single_mut() else {
        return;
    };

    let Some(message) = progress.dialog_message.clone() else {
        if typewriter.is_some() {
            commands.remove_resource::<Typewriter>();
        }
        *visibility = Visibility::Hidden;
        return;
    };

    let mut typewriter = match typewriter {
        Some(typewriter) if typewriter.text() == message => typewriter,
        _ => {
            // New message: start typing it next frame.
            commands.insert_resource(Typewriter::new(message));
            return;
        }
    };

    if typewriter.advance(time.delta_secs()) {
        progress.set_dialog(None);
        return;
    }
    *visibility = Visibility::Inherited;
    if let Ok(mut text) = text.single_mut() {
        let visible = typewriter.visible();
        if text.as_str() != visible {
            **text = visible;
        }
    }
}
