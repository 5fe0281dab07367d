// Prize reveal: elements fade in on a fixed timeline once the game is won.

use bevy::prelude::*;

use crate::i18n::Locale;
use crate::progress::{GameProgress, Screen};

pub struct PrizePlugin;

impl Plugin for PrizePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Screen::Prize), spawn_reveal)
            .add_systems(OnExit(Screen::Prize), |mut commands: Commands| {
                commands.remove_resource::<RevealTimer>();
            })
            .add_systems(
                Update,
                (fade_reveal, restart_button).run_if(in_state(Screen::Prize)),
            );
    }
}

/// Reveal phases and the second each one begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RevealPhase {
    Glow,
    Heart,
    Text,
    Cards,
    Done,
}

impl RevealPhase {
    const TIMELINE: [(RevealPhase, f32); 5] = [
        (RevealPhase::Glow, 0.0),
        (RevealPhase::Heart, 1.2),
        (RevealPhase::Text, 3.6),
        (RevealPhase::Cards, 5.6),
        (RevealPhase::Done, 7.2),
    ];

    pub fn starts_at(self) -> f32 {
        Self::TIMELINE
            .iter()
            .find(|(phase, _)| *phase == self)
            .map_or(0.0, |(_, at)| *at)
    }

    /// Latest phase that has begun by `t` seconds.
    pub fn at(t: f32) -> Self {
        Self::TIMELINE
            .iter()
            .rev()
            .find(|(_, at)| t >= *at)
            .map_or(RevealPhase::Glow, |(phase, _)| *phase)
    }
}

const FADE: f32 = 0.6;

/// Opacity of something that starts fading in at `start`.
pub fn fade_alpha(t: f32, start: f32) -> f32 {
    ((t - start) / FADE).clamp(0.0, 1.0)
}

#[derive(Resource)]
struct RevealTimer(f32);

/// Fades in with `phase`; `color` is the fully opaque colour.
#[derive(Component)]
struct Reveal {
    phase: RevealPhase,
    color: Color,
}

#[derive(Component)]
struct RestartButton;

const PINK: Color = Color::srgb_u8(0xFF, 0x6B, 0x9D);
const LIGHT_PINK: Color = Color::srgb_u8(0xF8, 0xA5, 0xC2);
const GOLD: Color = Color::srgb_u8(0xFF, 0xD7, 0x00);

fn spawn_reveal(mut commands: Commands, locale: Res<Locale>) {
    let texts = locale.texts();
    commands.insert_resource(RevealTimer(0.0));

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(20.0),
                position_type: PositionType::Absolute,
                ..default()
            },
            BackgroundColor(Color::NONE),
            Reveal {
                phase: RevealPhase::Glow,
                color: Color::srgba(0.18, 0.12, 0.24, 0.85),
            },
            GlobalZIndex(100),
            DespawnOnExit(Screen::Prize),
        ))
        .with_children(|parent| {
            // Heart.
            parent.spawn((
                Node {
                    width: Val::Px(96.0),
                    height: Val::Px(96.0),
                    ..default()
                },
                BackgroundColor(Color::NONE),
                Reveal {
                    phase: RevealPhase::Heart,
                    color: PINK,
                },
            ));
            text(parent, texts.prize_title, 44.0, PINK, RevealPhase::Text);
            text(parent, texts.prize_message, 20.0, Color::WHITE, RevealPhase::Text);
            text(parent, texts.prize_signature, 20.0, LIGHT_PINK, RevealPhase::Text);

            parent
                .spawn(Node {
                    column_gap: Val::Px(20.0),
                    ..default()
                })
                .with_children(|row| {
                    for (title, detail) in texts.prize_vouchers {
                        row.spawn((
                            Node {
                                width: Val::Px(260.0),
                                flex_direction: FlexDirection::Column,
                                padding: UiRect::all(Val::Px(16.0)),
                                row_gap: Val::Px(8.0),
                                border: UiRect::all(Val::Px(2.0)),
                                ..default()
                            },
                            BorderColor::all(GOLD),
                            BackgroundColor(Color::NONE),
                            Reveal {
                                phase: RevealPhase::Cards,
                                color: Color::srgba(1.0, 0.84, 0.0, 0.12),
                            },
                        ))
                        .with_children(|card| {
                            text(card, texts.voucher, 12.0, GOLD, RevealPhase::Cards);
                            text(card, title, 22.0, Color::WHITE, RevealPhase::Cards);
                            text(card, detail, 14.0, LIGHT_PINK, RevealPhase::Cards);
                        });
                    }
                });

            text(parent, texts.screenshot, 16.0, LIGHT_PINK, RevealPhase::Done);
            parent
                .spawn((
                    RestartButton,
                    Button,
                    Node {
                        padding: UiRect::axes(Val::Px(20.0), Val::Px(8.0)),
                        border: UiRect::all(Val::Px(1.0)),
                        ..default()
                    },
                    BorderColor::all(PINK),
                    BackgroundColor(Color::NONE),
                    Reveal {
                        phase: RevealPhase::Done,
                        color: PINK.with_alpha(0.2),
                    },
                ))
                .with_children(|btn| {
                    text(btn, texts.restart, 16.0, Color::WHITE, RevealPhase::Done);
                });
        });
}

fn text(
    parent: &mut ChildSpawnerCommands,
    value: &str,
    size: f32,
    color: Color,
    phase: RevealPhase,
) {
    parent.spawn((
        Text::new(value),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color.with_alpha(0.0)),
        Reveal { phase, color },
    ));
}

fn fade_reveal(
    time: Res<Time>,
    mut timer: Option<ResMut<RevealTimer>>,
    mut texts: Query<(&Reveal, &mut TextColor)>,
    mut backgrounds: Query<(&Reveal, &mut BackgroundColor)>,
) {
    let Some(timer) = timer.as_mut() else {
        return;
    };
    let before = timer.0;
    timer.0 += time.delta_secs();
    let t = timer.0;

    if RevealPhase::at(before) != RevealPhase::at(t) {
        debug!(phase = ?RevealPhase::at(t), "prize reveal phase");
    }
    // Everything is opaque a fade after the last phase.
    if before > RevealPhase::Done.starts_at() + FADE {
        return;
    }

    for (reveal, mut color) in &mut texts {
        let alpha = fade_alpha(t, reveal.phase.starts_at());
        color.0 = reveal.color.with_alpha(reveal.color.alpha() * alpha);
    }
    for (reveal, mut bg) in &mut backgrounds {
        let alpha = fade_alpha(t, reveal.phase.starts_at());
        bg.0 = reveal.color.with_alpha(reveal.color.alpha() * alpha);
    }
}

fn restart_button(
    query: Query<&Interaction, (Changed<Interaction>, With<RestartButton>)>,
    timer: Option<Res<RevealTimer>>,
    mut progress: ResMut<GameProgress>,
) {
    let ready = timer.is_some_and(|t| RevealPhase::at(t.0) == RevealPhase::Done);
    for interaction in &query {
        if *interaction == Interaction::Pressed && ready {
            progress.reset_to_start();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_follow_the_timeline() {
        assert_eq!(RevealPhase::at(0.0), RevealPhase::Glow);
        assert_eq!(RevealPhase::at(1.19), RevealPhase::Glow);
        assert_eq!(RevealPhase::at(1.2), RevealPhase::Heart);
        assert_eq!(RevealPhase::at(4.0), RevealPhase::Text);
        assert_eq!(RevealPhase::at(6.0), RevealPhase::Cards);
        assert_eq!(RevealPhase::at(100.0), RevealPhase::Done);
    }

    #[test]
    fn phase_order_matches_start_times() {
        let mut previous = -1.0;
        for (phase, at) in RevealPhase::TIMELINE {
            assert_eq!(phase.starts_at(), at);
            assert!(at > previous);
            previous = at;
        }
    }

    #[test]
    fn fade_ramps_from_start() {
        assert_eq!(fade_alpha(1.0, 2.0), 0.0);
        assert_eq!(fade_alpha(2.0, 2.0), 0.0);
        assert!((fade_alpha(2.3, 2.0) - 0.5).abs() < 1e-5);
        assert_eq!(fade_alpha(10.0, 2.0), 1.0);
    }
}
