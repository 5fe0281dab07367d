// Title screen with the PIN gate

use bevy::prelude::*;

use crate::config::AdventureConfig;
use crate::i18n::Locale;
use crate::progress::{GameProgress, Screen};

pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Screen::Title), setup_menu)
            .add_systems(OnExit(Screen::Title), |mut commands: Commands| {
                commands.remove_resource::<PinEntry>();
            })
            .add_systems(
                Update,
                (button_visuals, keypad_input, keyboard_input, show_pin)
                    .chain()
                    .run_if(in_state(Screen::Title)),
            );
    }
}

const NORMAL_BUTTON: Color = Color::srgba(1.0, 0.42, 0.62, 0.12);
const HOVERED_BUTTON: Color = Color::srgba(1.0, 0.42, 0.62, 0.3);
const PRESSED_BUTTON: Color = Color::srgba(1.0, 0.42, 0.62, 0.5);
const PINK: Color = Color::srgb_u8(0xFF, 0x6B, 0x9D);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinResult {
    Incomplete,
    Accepted,
    Rejected,
}

/// Digits typed so far on the title screen.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct PinEntry {
    digits: String,
    error: bool,
}

impl PinEntry {
    /// Appends a digit; a full-length entry is checked against `pin` and
    /// cleared if it doesn't match.
    pub fn push(&mut self, digit: char, pin: &str) -> PinResult {
        if !digit.is_ascii_digit() || self.digits.len() >= pin.len() {
            return PinResult::Incomplete;
        }
        self.error = false;
        self.digits.push(digit);
        if self.digits.len() < pin.len() {
            return PinResult::Incomplete;
        }
        if self.digits == pin {
            PinResult::Accepted
        } else {
            self.digits.clear();
            self.error = true;
            PinResult::Rejected
        }
    }

    pub fn erase(&mut self) {
        self.digits.pop();
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn has_error(&self) -> bool {
        self.error
    }
}

#[derive(Component, Clone, Copy)]
enum KeypadButton {
    Digit(char),
    Erase,
}

#[derive(Component)]
struct PinDisplay;

#[derive(Component)]
struct PinError;

fn setup_menu(mut commands: Commands, locale: Res<Locale>) {
    let texts = locale.texts();
    commands.insert_resource(PinEntry::default());

    // Root container.
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(18.0),
                ..default()
            },
            BackgroundColor(Color::srgb_u8(0x2d, 0x1f, 0x3d)),
            DespawnOnExit(Screen::Title),
        ))
        .with_children(|parent| {
            text(parent, texts.title, 44.0, PINK);
            text(parent, texts.subtitle, 20.0, Color::srgb_u8(0xF8, 0xA5, 0xC2));
            text(parent, texts.pin_prompt, 18.0, Color::WHITE);

            parent.spawn((
                PinDisplay,
                Text::new("_ _ _ _"),
                TextFont {
                    font_size: 40.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            parent.spawn((
                PinError,
                Text::new(texts.pin_error),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb_u8(0xE5, 0x39, 0x35)),
                Visibility::Hidden,
            ));

            // Keypad.
            parent
                .spawn(Node {
                    display: Display::Grid,
                    grid_template_columns: vec![RepeatedGridTrack::px(3, 64.0)],
                    column_gap: Val::Px(10.0),
                    row_gap: Val::Px(10.0),
                    ..default()
                })
                .with_children(|grid| {
                    for digit in ['1', '2', '3', '4', '5', '6', '7', '8', '9'] {
                        spawn_button(grid, &digit.to_string(), KeypadButton::Digit(digit));
                    }
                    spawn_button(grid, "<", KeypadButton::Erase);
                    spawn_button(grid, "0", KeypadButton::Digit('0'));
                });

            text(parent, texts.footer, 14.0, Color::srgba(1.0, 1.0, 1.0, 0.5));
        });
}

fn text(parent: &mut ChildSpawnerCommands, value: &str, size: f32, color: Color) {
    parent.spawn((
        Text::new(value),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
    ));
}

fn spawn_button(parent: &mut ChildSpawnerCommands, label: &str, marker: KeypadButton) {
    parent
        .spawn((
            marker,
            Button,
            Node {
                width: Val::Px(64.0),
                height: Val::Px(56.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BorderColor::all(PINK.with_alpha(0.5)),
            BackgroundColor(NORMAL_BUTTON),
        ))
        .with_children(|btn| {
            btn.spawn((
                Text::new(label),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

fn button_visuals(
    mut query: Query<
        (&Interaction, &mut BackgroundColor, &mut BorderColor),
        (Changed<Interaction>, With<KeypadButton>),
    >,
) {
    for (interaction, mut bg, mut border) in &mut query {
        match *interaction {
            Interaction::Pressed => {
                *bg = PRESSED_BUTTON.into();
                *border = BorderColor::all(Color::WHITE);
            }
            Interaction::Hovered => {
                *bg = HOVERED_BUTTON.into();
                *border = BorderColor::all(PINK);
            }
            Interaction::None => {
                *bg = NORMAL_BUTTON.into();
                *border = BorderColor::all(PINK.with_alpha(0.5));
            }
        }
    }
}

fn keypad_input(
    query: Query<(&Interaction, &KeypadButton), Changed<Interaction>>,
    mut entry: ResMut<PinEntry>,
    mut progress: ResMut<GameProgress>,
    config: Res<AdventureConfig>,
    locale: Res<Locale>,
) {
    for (interaction, button) in &query {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match *button {
            KeypadButton::Digit(digit) => {
                let result = entry.push(digit, &config.pin);
                settle(result, &mut progress, &locale);
            }
            KeypadButton::Erase => entry.erase(),
        }
    }
}

fn keyboard_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut entry: ResMut<PinEntry>,
    mut progress: ResMut<GameProgress>,
    config: Res<AdventureConfig>,
    locale: Res<Locale>,
) {
    if keyboard.just_pressed(KeyCode::Backspace) {
        entry.erase();
    }
    for key in keyboard.get_just_pressed() {
        if let Some(digit) = digit_for(*key) {
            let result = entry.push(digit, &config.pin);
            settle(result, &mut progress, &locale);
        }
    }
}

fn digit_for(key: KeyCode) -> Option<char> {
    let digit = match key {
        KeyCode::Digit0 | KeyCode::Numpad0 => '0',
        KeyCode::Digit1 | KeyCode::Numpad1 => '1',
        KeyCode::Digit2 | KeyCode::Numpad2 => '2',
        KeyCode::Digit3 | KeyCode::Numpad3 => '3',
        KeyCode::Digit4 | KeyCode::Numpad4 => '4',
        KeyCode::Digit5 | KeyCode::Numpad5 => '5',
        KeyCode::Digit6 | KeyCode::Numpad6 => '6',
        KeyCode::Digit7 | KeyCode::Numpad7 => '7',
        KeyCode::Digit8 | KeyCode::Numpad8 => '8',
        KeyCode::Digit9 | KeyCode::Numpad9 => '9',
        _ => return None,
    };
    Some(digit)
}

fn settle(result: PinResult, progress: &mut GameProgress, locale: &Locale) {
    match result {
        PinResult::Incomplete => {}
        PinResult::Rejected => debug!("wrong pin"),
        PinResult::Accepted if !progress.game_started => {
            progress.start_game();
            progress.set_dialog(Some(locale.texts().welcome.to_string()));
        }
        PinResult::Accepted => {}
    }
}

fn show_pin(
    entry: Res<PinEntry>,
    mut display: Query<&mut Text, With<PinDisplay>>,
    mut error: Query<&mut Visibility, With<PinError>>,
) {
    if !entry.is_changed() {
        return;
    }
    if let Ok(mut text) = display.single_mut() {
        **text = pin_mask(entry.len(), 4);
    }
    if let Ok(mut visibility) = error.single_mut() {
        *visibility = if entry.has_error() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

/// `*` per typed digit, `_` for the rest.
fn pin_mask(typed: usize, total: usize) -> String {
    (0..total)
        .map(|i| if i < typed { "*" } else { "_" })
        .collect::<Vec<_>>()
        .join(" ")
}
