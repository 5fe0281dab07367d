// Shared game progression store and the screen states derived from it.
use bevy::prelude::*;

use crate::puzzles::PuzzleKind;

pub struct ProgressPlugin;

impl Plugin for ProgressPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameProgress>()
            .init_state::<Screen>()
            .init_state::<ActivePuzzle>()
            .add_systems(Last, sync_states);
    }
}

/// Number of gated zones, one puzzle each.
pub const ZONE_COUNT: usize = 4;
/// Terminal zone index shown once every puzzle is solved.
pub const PRIZE_ZONE: usize = ZONE_COUNT + 1;

/// Top-level screen, mirrored from [`GameProgress`].
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum Screen {
    #[default]
    Title,
    Garden,
    Prize,
}

/// Which puzzle overlay is mounted, mirrored from [`GameProgress`].
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum ActivePuzzle {
    #[default]
    None,
    Open(PuzzleKind),
}

/// The single mutable record every other part of the game reads.
///
/// Fields are public for reading; all writes go through the transition
/// methods so each change replaces related fields together.
#[derive(Resource, Debug, Clone, PartialEq, Default)]
pub struct GameProgress {
    pub current_zone: usize,
    pub zones_completed: [bool; ZONE_COUNT],
    pub active_puzzle: Option<PuzzleKind>,
    pub game_started: bool,
    pub game_won: bool,
    pub show_fail: bool,
    pub fail_message: String,
    pub dialog_message: Option<String>,
    /// Bumped whenever the avatar must return to the spawn point.
    pub spawn_epoch: u32,
}

impl GameProgress {
    pub fn start_game(&mut self) {
        info!("game started");
        self.game_started = true;
        self.current_zone = 0;
        self.spawn_epoch = self.spawn_epoch.wrapping_add(1);
    }

    pub fn set_zone(&mut self, zone: usize) {
        debug_assert!(zone <= PRIZE_ZONE, "zone index {zone} out of range");
        if self.current_zone != zone {
            debug!(from = self.current_zone, to = zone, "zone changed");
            self.current_zone = zone;
        }
    }

    /// Opens `puzzle` unless another one already owns the slot.
    pub fn activate_puzzle(&mut self, puzzle: PuzzleKind) -> bool {
        if let Some(active) = self.active_puzzle {
            debug!(?active, requested = ?puzzle, "puzzle slot busy, activation ignored");
            return false;
        }
        info!(?puzzle, "puzzle activated");
        self.active_puzzle = Some(puzzle);
        true
    }

    /// Marks zone `ordinal` (1-based) as solved and frees the puzzle slot.
    pub fn complete_zone(&mut self, ordinal: usize) {
        debug_assert!(
            (1..=ZONE_COUNT).contains(&ordinal),
            "zone ordinal {ordinal} out of range"
        );
        self.zones_completed[ordinal - 1] = true;
        self.active_puzzle = None;
        self.current_zone = (ordinal + 1).min(PRIZE_ZONE);
        info!(ordinal, "zone completed");
        if ordinal == ZONE_COUNT {
            self.win_game();
        }
    }

    pub fn win_game(&mut self) {
        info!("game won");
        self.game_won = true;
        self.active_puzzle = None;
        self.current_zone = PRIZE_ZONE;
    }

    /// Shows the fail overlay. Completion flags are left alone until the
    /// overlay is dismissed.
    pub fn trigger_fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(%message, "puzzle failed");
        self.show_fail = true;
        self.fail_message = message;
        self.active_puzzle = None;
    }

    /// Soft reset: back to the start of the garden, still in the game.
    pub fn dismiss_fail(&mut self) {
        info!("fail dismissed, returning to start");
        self.show_fail = false;
        self.fail_message.clear();
        self.current_zone = 0;
        self.zones_completed = [false; ZONE_COUNT];
        self.spawn_epoch = self.spawn_epoch.wrapping_add(1);
    }

    /// Full reset back to the title screen.
    pub fn reset_to_start(&mut self) {
        info!("reset to title");
        *self = Self {
            spawn_epoch: self.spawn_epoch.wrapping_add(1),
            ..Self::default()
        };
    }

    pub fn set_dialog(&mut self, message: Option<String>) {
        self.dialog_message = message;
    }

    /// Player, camera and triggers only advance while this holds.
    pub fn simulation_running(&self) -> bool {
        self.game_started && self.active_puzzle.is_none() && !self.show_fail
    }

    pub fn is_zone_completed(&self, ordinal: usize) -> bool {
        ordinal >= 1 && self.zones_completed.get(ordinal - 1).copied().unwrap_or(false)
    }

    pub fn completed_count(&self) -> usize {
        self.zones_completed.iter().filter(|done| **done).count()
    }

    fn screen(&self) -> Screen {
        if !self.game_started {
            Screen::Title
        } else if self.game_won {
            Screen::Prize
        } else {
            Screen::Garden
        }
    }
}

/// Run condition for the per-frame simulation systems.
pub fn simulation_running(progress: Res<GameProgress>) -> bool {
    progress.simulation_running()
}

fn sync_states(
    progress: Res<GameProgress>,
    screen: Res<State<Screen>>,
    puzzle: Res<State<ActivePuzzle>>,
    mut next_screen: ResMut<NextState<Screen>>,
    mut next_puzzle: ResMut<NextState<ActivePuzzle>>,
) {
    if !progress.is_changed() {
        return;
    }

    let wanted_screen = progress.screen();
    if **screen != wanted_screen {
        next_screen.set(wanted_screen);
    }

    let wanted_puzzle = match progress.active_puzzle {
        Some(kind) => ActivePuzzle::Open(kind),
        None => ActivePuzzle::None,
    };
    if **puzzle != wanted_puzzle {
        next_puzzle.set(wanted_puzzle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> GameProgress {
        let mut progress = GameProgress::default();
        progress.start_game();
        progress
    }

    #[test]
    fn complete_zone_unlocks_and_advances() {
        let mut progress = started();
        assert!(progress.activate_puzzle(PuzzleKind::Trivia));

        progress.complete_zone(1);

        assert_eq!(progress.zones_completed, [true, false, false, false]);
        assert_eq!(progress.current_zone, 2);
        assert_eq!(progress.active_puzzle, None);
        assert!(!progress.game_won);
    }

    #[test]
    fn completing_last_zone_wins() {
        let mut progress = started();
        for ordinal in 1..=ZONE_COUNT {
            progress.complete_zone(ordinal);
        }
        assert!(progress.game_won);
        assert_eq!(progress.current_zone, PRIZE_ZONE);
        assert_eq!(progress.screen(), Screen::Prize);
    }

    #[test]
    fn second_activation_is_ignored() {
        let mut progress = started();
        assert!(progress.activate_puzzle(PuzzleKind::Trivia));
        assert!(!progress.activate_puzzle(PuzzleKind::Driving));
        assert_eq!(progress.active_puzzle, Some(PuzzleKind::Trivia));
    }

    #[test]
    fn fail_then_dismiss_soft_resets() {
        let mut progress = started();
        progress.complete_zone(1);
        progress.complete_zone(2);
        progress.activate_puzzle(PuzzleKind::Memory);

        progress.trigger_fail("X");
        assert!(progress.show_fail);
        assert_eq!(progress.fail_message, "X");
        assert_eq!(progress.active_puzzle, None);
        // Progress survives until the overlay goes away.
        assert_eq!(progress.zones_completed, [true, true, false, false]);
        assert!(!progress.simulation_running());

        let epoch = progress.spawn_epoch;
        progress.dismiss_fail();
        assert!(!progress.show_fail);
        assert_eq!(progress.zones_completed, [false; ZONE_COUNT]);
        assert_eq!(progress.current_zone, 0);
        assert!(progress.game_started);
        assert_ne!(progress.spawn_epoch, epoch);
    }

    #[test]
    fn reset_then_start_restores_initial_progress() {
        let mut progress = started();
        progress.complete_zone(1);
        progress.activate_puzzle(PuzzleKind::Driving);
        progress.set_dialog(Some("hello".into()));

        progress.reset_to_start();
        assert!(!progress.game_started);
        assert_eq!(progress.screen(), Screen::Title);

        progress.start_game();
        assert_eq!(progress.zones_completed, [false, false, false, false]);
        assert_eq!(progress.current_zone, 0);
        assert_eq!(progress.active_puzzle, None);
        assert!(!progress.show_fail);
        assert!(!progress.game_won);
    }

    #[test]
    fn simulation_pauses_for_title_puzzle_and_fail() {
        let mut progress = GameProgress::default();
        assert!(!progress.simulation_running());
        progress.start_game();
        assert!(progress.simulation_running());
        progress.activate_puzzle(PuzzleKind::Sorting);
        assert!(!progress.simulation_running());
        progress.trigger_fail("too slow");
        assert!(!progress.simulation_running());
        progress.dismiss_fail();
        assert!(progress.simulation_running());
    }

    #[test]
    fn completion_queries_are_one_based() {
        let mut progress = started();
        progress.complete_zone(2);
        assert!(!progress.is_zone_completed(0));
        assert!(!progress.is_zone_completed(1));
        assert!(progress.is_zone_completed(2));
        assert!(!progress.is_zone_completed(9));
        assert_eq!(progress.completed_count(), 1);
    }
}
