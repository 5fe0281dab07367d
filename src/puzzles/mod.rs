// Puzzle lifecycle: activation, the per-activation session guard and
// outcome delivery back into the progress store.
pub mod data;
mod driving;
mod memory;
mod sorting;
mod trivia;

use bevy::prelude::*;
use strum::{EnumCount, EnumIter, IntoEnumIterator};

use crate::AdventureSet;
use crate::i18n::{Locale, Texts};
use crate::progress::{ActivePuzzle, GameProgress};

pub struct PuzzlesPlugin;

impl Plugin for PuzzlesPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<PuzzleFinished>()
            .add_plugins((
                trivia::TriviaPlugin,
                driving::DrivingPlugin,
                memory::MemoryPlugin,
                sorting::SortingPlugin,
            ))
            .add_systems(
                Update,
                (tick_puzzle_session, apply_puzzle_outcomes)
                    .chain()
                    .in_set(AdventureSet::Resolve),
            )
            .add_systems(Update, puzzle_button_visuals.in_set(AdventureSet::Present));

        for kind in PuzzleKind::iter() {
            app.add_systems(
                OnEnter(ActivePuzzle::Open(kind)),
                move |mut commands: Commands| {
                    info!(puzzle = ?kind, "puzzle opened");
                    commands.insert_resource(PuzzleSession::new(kind));
                },
            )
            .add_systems(OnExit(ActivePuzzle::Open(kind)), close_session);
        }
    }
}

/// The four mini-games, one per gated zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum PuzzleKind {
    Trivia,
    Driving,
    Memory,
    Sorting,
}

impl PuzzleKind {
    /// 1-based zone ordinal this puzzle unlocks.
    pub const fn ordinal(self) -> usize {
        match self {
            PuzzleKind::Trivia => 1,
            PuzzleKind::Driving => 2,
            PuzzleKind::Memory => 3,
            PuzzleKind::Sorting => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    WrongAnswer,
    Crashed,
    TooManyMismatches,
    LowScore,
}

impl FailReason {
    pub fn message(self, texts: &Texts) -> &'static str {
        match self {
            FailReason::WrongAnswer => texts.trivia_fail,
            FailReason::Crashed => texts.driving_fail,
            FailReason::TooManyMismatches => texts.memory_fail,
            FailReason::LowScore => texts.sorting_fail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleOutcome {
    Success,
    Failure(FailReason),
}

/// An outcome together with how long the puzzle keeps showing its result
/// before the outcome is delivered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub outcome: PuzzleOutcome,
    pub delay: f32,
}

impl Resolution {
    pub fn success(delay: f32) -> Self {
        Self {
            outcome: PuzzleOutcome::Success,
            delay,
        }
    }

    pub fn failure(reason: FailReason, delay: f32) -> Self {
        Self {
            outcome: PuzzleOutcome::Failure(reason),
            delay,
        }
    }
}

/// Delivered once per activation when its outcome comes due.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PuzzleFinished {
    pub puzzle: PuzzleKind,
    pub outcome: PuzzleOutcome,
}

/// Guard for one activation of one puzzle.
///
/// Only the first `resolve` counts. The outcome is held until its delay has
/// run out, and dropping the session (on puzzle exit) drops it with it.
#[derive(Resource, Debug)]
pub struct PuzzleSession {
    kind: PuzzleKind,
    resolved: bool,
    pending: Option<(PuzzleOutcome, f32)>,
}

impl PuzzleSession {
    pub fn new(kind: PuzzleKind) -> Self {
        Self {
            kind,
            resolved: false,
            pending: None,
        }
    }

    /// Schedules `resolution`. Returns `false` if this session already has one.
    pub fn resolve(&mut self, resolution: Resolution) -> bool {
        if self.resolved {
            debug!(puzzle = ?self.kind, "session already resolved");
            return false;
        }
        self.resolved = true;
        self.pending = Some((resolution.outcome, resolution.delay.max(0.0)));
        true
    }

    /// Counts down the pending delay; yields the outcome once it runs out.
    pub fn tick(&mut self, dt: f32) -> Option<PuzzleOutcome> {
        let (_, remaining) = self.pending.as_mut()?;
        *remaining -= dt;
        if *remaining > 0.0 {
            return None;
        }
        self.pending.take().map(|(outcome, _)| outcome)
    }
}

fn close_session(mut commands: Commands, session: Option<Res<PuzzleSession>>) {
    if let Some(session) = session {
        if session.pending.is_some() {
            debug!(puzzle = ?session.kind, "pending outcome cancelled");
        }
        commands.remove_resource::<PuzzleSession>();
    }
}

fn tick_puzzle_session(
    session: Option<ResMut<PuzzleSession>>,
    progress: Res<GameProgress>,
    time: Res<Time>,
    mut finished: MessageWriter<PuzzleFinished>,
) {
    let Some(mut session) = session else {
        return;
    };
    // The store moved on before the state machine caught up.
    if progress.active_puzzle != Some(session.kind) {
        return;
    }
    if let Some(outcome) = session.tick(time.delta_secs()) {
        finished.write(PuzzleFinished {
            puzzle: session.kind,
            outcome,
        });
    }
}

fn apply_puzzle_outcomes(
    mut finished: MessageReader<PuzzleFinished>,
    mut progress: ResMut<GameProgress>,
    locale: Res<Locale>,
) {
    for message in finished.read() {
        apply_outcome(&mut progress, message, locale.texts());
    }
}

/// Applies one delivered outcome to the store. Outcomes for a puzzle that is
/// no longer active are dropped.
pub fn apply_outcome(progress: &mut GameProgress, finished: &PuzzleFinished, texts: &Texts) -> bool {
    if progress.active_puzzle != Some(finished.puzzle) {
        warn!(puzzle = ?finished.puzzle, "outcome for inactive puzzle dropped");
        return false;
    }
    match finished.outcome {
        PuzzleOutcome::Success => progress.complete_zone(finished.puzzle.ordinal()),
        PuzzleOutcome::Failure(reason) => progress.trigger_fail(reason.message(texts)),
    }
    true
}

pub(crate) const OVERLAY_BG: Color = Color::srgba(0.1, 0.05, 0.15, 0.92);
pub(crate) const PINK: Color = Color::srgb_u8(0xFF, 0x6B, 0x9D);
pub(crate) const LIGHT_PINK: Color = Color::srgb_u8(0xF8, 0xA5, 0xC2);
pub(crate) const SUCCESS_GREEN: Color = Color::srgb_u8(0x4C, 0xAF, 0x50);
pub(crate) const FAIL_RED: Color = Color::srgb_u8(0xE5, 0x39, 0x35);

const NORMAL_BUTTON: Color = Color::srgba(1.0, 0.42, 0.62, 0.15);
const HOVERED_BUTTON: Color = Color::srgba(1.0, 0.42, 0.62, 0.3);
const PRESSED_BUTTON: Color = Color::srgba(1.0, 0.42, 0.62, 0.5);

/// Marks a puzzle button whose background follows its interaction state.
#[derive(Component)]
pub(crate) struct PuzzleButton;

/// Marks a button whose colour is fixed by puzzle state instead.
#[derive(Component)]
pub(crate) struct Tinted;

/// Full-screen overlay root, torn down when the puzzle closes.
pub(crate) fn spawn_overlay<'a>(
    commands: &'a mut Commands,
    kind: PuzzleKind,
) -> EntityCommands<'a> {
    commands.spawn((
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            row_gap: Val::Px(16.0),
            position_type: PositionType::Absolute,
            ..default()
        },
        BackgroundColor(OVERLAY_BG),
        GlobalZIndex(50),
        DespawnOnExit(ActivePuzzle::Open(kind)),
    ))
}

pub(crate) fn spawn_label(
    parent: &mut ChildSpawnerCommands,
    text: impl Into<String>,
    size: f32,
    color: Color,
) {
    parent.spawn((
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
    ));
}

pub(crate) fn spawn_button<'a>(
    parent: &'a mut ChildSpawnerCommands,
    label: impl Into<String>,
    width: f32,
    marker: impl Bundle,
) -> EntityCommands<'a> {
    let mut button = parent.spawn((
        marker,
        PuzzleButton,
        Button,
        Node {
            width: Val::Px(width),
            min_height: Val::Px(48.0),
            padding: UiRect::all(Val::Px(8.0)),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            border: UiRect::all(Val::Px(2.0)),
            ..default()
        },
        BorderColor::all(PINK),
        BackgroundColor(NORMAL_BUTTON),
    ));
    let label = label.into();
    button.with_children(|btn| {
        spawn_label(btn, label, 20.0, Color::WHITE);
    });
    button
}

fn puzzle_button_visuals(
    mut query: Query<
        (&Interaction, &mut BackgroundColor),
        (Changed<Interaction>, With<PuzzleButton>, Without<Tinted>),
    >,
) {
    for (interaction, mut bg) in &mut query {
        *bg = match *interaction {
            Interaction::Pressed => PRESSED_BUTTON.into(),
            Interaction::Hovered => HOVERED_BUTTON.into(),
            Interaction::None => NORMAL_BUTTON.into(),
        };
    }
}
