// Mood sorting: ten timed scenarios, answer angry or sleeping.
use bevy::prelude::*;

use super::data::{Mood, SORTING_SCENARIOS};
use super::{
    FAIL_RED, FailReason, LIGHT_PINK, PINK, PuzzleKind, PuzzleSession, Resolution,
    SUCCESS_GREEN, spawn_button, spawn_label, spawn_overlay,
};
use crate::AdventureSet;
use crate::i18n::{Locale, fill};
use crate::progress::ActivePuzzle;

const KIND: PuzzleKind = PuzzleKind::Sorting;

const ANSWER_TIME: f32 = 5.0;
const FEEDBACK_TIME: f32 = 0.7;
const RESULT_DELAY: f32 = 2.5;
pub const REQUIRED_SCORE: usize = 8;

pub struct SortingPlugin;

impl Plugin for SortingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(ActivePuzzle::Open(KIND)), start_round)
            .add_systems(OnExit(ActivePuzzle::Open(KIND)), |mut commands: Commands| {
                commands.remove_resource::<SortingRound>();
            })
            .add_systems(
                Update,
                (choose_mood, advance_round, render_round)
                    .chain()
                    .run_if(in_state(ActivePuzzle::Open(KIND)))
                    .in_set(AdventureSet::Simulate),
            );
    }
}

#[derive(Resource, Debug, Clone)]
pub struct SortingRound {
    current: usize,
    score: usize,
    time_left: f32,
    /// Whether the last answer was right, shown until the countdown ends.
    feedback: Option<(bool, f32)>,
    finished: bool,
}

impl Default for SortingRound {
    fn default() -> Self {
        Self {
            current: 0,
            score: 0,
            time_left: ANSWER_TIME,
            feedback: None,
            finished: false,
        }
    }
}

impl SortingRound {
    pub fn score(&self) -> usize {
        self.score
    }

    /// Answers the scenario on screen. Ignored during feedback.
    pub fn choose(&mut self, mood: Mood) -> bool {
        if self.finished || self.feedback.is_some() {
            return false;
        }
        let correct = SORTING_SCENARIOS[self.current].answer == mood;
        if correct {
            self.score += 1;
        }
        self.feedback = Some((correct, FEEDBACK_TIME));
        true
    }

    pub fn advance(&mut self, dt: f32) -> Option<Resolution> {
        if self.finished {
            return None;
        }
        let Some((_, remaining)) = self.feedback.as_mut() else {
            self.time_left -= dt;
            if self.time_left <= 0.0 {
                self.time_left = 0.0;
                self.feedback = Some((false, FEEDBACK_TIME));
            }
            return None;
        };

        *remaining -= dt;
        if *remaining > 0.0 {
            return None;
        }
        self.feedback = None;
        self.current += 1;
        if self.current < SORTING_SCENARIOS.len() {
            self.time_left = ANSWER_TIME;
            return None;
        }

        self.finished = true;
        if self.score >= REQUIRED_SCORE {
            Some(Resolution::success(RESULT_DELAY))
        } else {
            Some(Resolution::failure(FailReason::LowScore, RESULT_DELAY))
        }
    }

    fn view(&self) -> SortingView {
        SortingView {
            current: self.current,
            score: self.score,
            seconds_left: self.time_left.ceil() as u32,
            feedback: self.feedback.map(|(correct, _)| correct),
            finished: self.finished,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SortingView {
    current: usize,
    score: usize,
    seconds_left: u32,
    feedback: Option<bool>,
    finished: bool,
}

#[derive(Component)]
struct SortingPanel;

#[derive(Component)]
struct MoodButton(Mood);

fn start_round(mut commands: Commands) {
    commands.insert_resource(SortingRound::default());
    spawn_overlay(&mut commands, KIND).with_children(|parent| {
        parent.spawn((
            SortingPanel,
            Node {
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Val::Px(14.0),
                max_width: Val::Px(560.0),
                ..default()
            },
        ));
    });
}

fn choose_mood(
    buttons: Query<(&Interaction, &MoodButton), Changed<Interaction>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    round: Option<ResMut<SortingRound>>,
) {
    let Some(mut round) = round else {
        return;
    };
    let mut choice = buttons
        .iter()
        .find(|(interaction, _)| **interaction == Interaction::Pressed)
        .map(|(_, button)| button.0);
    if keyboard.just_pressed(KeyCode::ArrowLeft) {
        choice = Some(Mood::Angry);
    } else if keyboard.just_pressed(KeyCode::ArrowRight) {
        choice = Some(Mood::Sleeping);
    }
    if let Some(mood) = choice {
        round.choose(mood);
    }
}

fn advance_round(
    round: Option<ResMut<SortingRound>>,
    session: Option<ResMut<PuzzleSession>>,
    time: Res<Time>,
) {
    let (Some(mut round), Some(mut session)) = (round, session) else {
        return;
    };
    if let Some(resolution) = round.advance(time.delta_secs()) {
        info!(score = round.score(), "sorting round finished");
        session.resolve(resolution);
    }
}

fn render_round(
    mut commands: Commands,
    mut last: Local<Option<SortingView>>,
    round: Option<Res<SortingRound>>,
    panel: Query<Entity, With<SortingPanel>>,
    locale: Res<Locale>,
) {
    let Some(round) = round else {
        return;
    };
    let Ok(panel) = panel.single() else {
        return;
    };
    let view = round.view();
    // A freshly opened round always draws, whatever the last one showed.
    if !round.is_added() && *last == Some(view) && !locale.is_changed() {
        return;
    }
    *last = Some(view);

    let texts = locale.texts();
    let total = SORTING_SCENARIOS.len();
    let score_line = format!("{}: {}/{}", texts.sorting_score, view.score, total);
    commands.entity(panel).despawn_related::<Children>();
    commands.entity(panel).with_children(|parent| {
        if view.finished {
            let (headline, color) = if view.score >= REQUIRED_SCORE {
                (texts.sorting_success, PINK)
            } else {
                (texts.sorting_result_fail, FAIL_RED)
            };
            spawn_label(parent, headline, 32.0, color);
            spawn_label(parent, score_line, 20.0, LIGHT_PINK);
            return;
        }

        spawn_label(parent, score_line, 16.0, LIGHT_PINK);
        spawn_label(
            parent,
            fill(texts.sorting_need, &[("n", &REQUIRED_SCORE)]),
            14.0,
            LIGHT_PINK,
        );
        spawn_label(parent, texts.sorting_prompt, 20.0, PINK);
        spawn_label(parent, SORTING_SCENARIOS[view.current].text, 26.0, Color::WHITE);

        match view.feedback {
            Some(true) => spawn_label(parent, "+1", 28.0, SUCCESS_GREEN),
            Some(false) => spawn_label(parent, "x", 28.0, FAIL_RED),
            None => spawn_label(parent, format!("{}s", view.seconds_left), 18.0, LIGHT_PINK),
        }

        parent
            .spawn(Node {
                column_gap: Val::Px(24.0),
                ..default()
            })
            .with_children(|row| {
                spawn_button(row, texts.sorting_angry, 180.0, MoodButton(Mood::Angry));
                spawn_button(row, texts.sorting_sleeping, 180.0, MoodButton(Mood::Sleeping));
            });
    });
}
