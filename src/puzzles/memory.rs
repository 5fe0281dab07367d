// Memory pairs: flip two cards at a time, too many misses ends the game.
use bevy::prelude::*;
use rand::Rng;
use rand::seq::SliceRandom;

use super::data::MEMORY_CARDS;
use super::{
    FailReason, LIGHT_PINK, PINK, PuzzleKind, PuzzleSession, Resolution, SUCCESS_GREEN,
    Tinted, spawn_button, spawn_label, spawn_overlay,
};
use crate::AdventureSet;
use crate::i18n::Locale;
use crate::progress::ActivePuzzle;

const KIND: PuzzleKind = PuzzleKind::Memory;

const MAX_MISMATCHES: u32 = 6;
const MATCH_DELAY: f32 = 0.5;
const FLIP_BACK_DELAY: f32 = 1.0;
const FAIL_DELAY: f32 = 0.8;
const SUCCESS_DELAY: f32 = 2.0;

pub struct MemoryPlugin;

impl Plugin for MemoryPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(ActivePuzzle::Open(KIND)), deal_board)
            .add_systems(OnExit(ActivePuzzle::Open(KIND)), |mut commands: Commands| {
                commands.remove_resource::<MemoryBoard>();
            })
            .add_systems(
                Update,
                (flip_cards, advance_board, render_board)
                    .chain()
                    .run_if(in_state(ActivePuzzle::Open(KIND)))
                    .in_set(AdventureSet::Simulate),
            );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    /// Index into the face labels; each appears twice.
    pub face: usize,
    pub face_up: bool,
    pub matched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Match,
    FlipBack,
}

#[derive(Resource, Debug, Clone)]
pub struct MemoryBoard {
    cards: Vec<Card>,
    selected: Vec<usize>,
    mismatches: u32,
    wait: Option<(Step, f32)>,
    finished: bool,
}

impl MemoryBoard {
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut faces: Vec<usize> = (0..MEMORY_CARDS.len()).flat_map(|f| [f, f]).collect();
        faces.shuffle(rng);
        Self::with_layout(faces)
    }

    pub fn with_layout(faces: Vec<usize>) -> Self {
        Self {
            cards: faces
                .into_iter()
                .map(|face| Card {
                    face,
                    face_up: false,
                    matched: false,
                })
                .collect(),
            selected: Vec::with_capacity(2),
            mismatches: 0,
            wait: None,
            finished: false,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn mismatches(&self) -> u32 {
        self.mismatches
    }

    pub fn matched_pairs(&self) -> usize {
        self.cards.iter().filter(|c| c.matched).count() / 2
    }

    pub fn pair_count(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn is_solved(&self) -> bool {
        self.cards.iter().all(|c| c.matched)
    }

    /// Turns card `index` face up. Returns `None` when the flip is ignored
    /// (board locked, card already showing) or doesn't finish the game.
    pub fn flip(&mut self, index: usize) -> Option<Resolution> {
        if self.finished || self.wait.is_some() || self.selected.len() == 2 {
            return None;
        }
        let card = self.cards.get_mut(index)?;
        if card.face_up || card.matched {
            return None;
        }
        card.face_up = true;
        self.selected.push(index);
        if self.selected.len() < 2 {
            return None;
        }

        let (a, b) = (self.selected[0], self.selected[1]);
        if self.cards[a].face == self.cards[b].face {
            self.wait = Some((Step::Match, MATCH_DELAY));
            return None;
        }
        self.mismatches += 1;
        if self.mismatches >= MAX_MISMATCHES {
            self.finished = true;
            return Some(Resolution::failure(FailReason::TooManyMismatches, FAIL_DELAY));
        }
        self.wait = Some((Step::FlipBack, FLIP_BACK_DELAY));
        None
    }

    pub fn advance(&mut self, dt: f32) -> Option<Resolution> {
        let (step, remaining) = self.wait.as_mut()?;
        *remaining -= dt;
        if *remaining > 0.0 {
            return None;
        }
        let step = *step;
        self.wait = None;

        for index in std::mem::take(&mut self.selected) {
            let card = &mut self.cards[index];
            match step {
                Step::Match => card.matched = true,
                Step::FlipBack => card.face_up = false,
            }
        }
        if step == Step::Match && self.is_solved() {
            self.finished = true;
            return Some(Resolution::success(SUCCESS_DELAY));
        }
        None
    }
}

#[derive(Component)]
struct MemoryPanel;

#[derive(Component)]
struct CardButton(usize);

fn deal_board(mut commands: Commands) {
    let mut rng = rand::rng();
    commands.insert_resource(MemoryBoard::new(&mut rng));
    spawn_overlay(&mut commands, KIND).with_children(|parent| {
        parent.spawn((
            MemoryPanel,
            Node {
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Val::Px(12.0),
                ..default()
            },
        ));
    });
}

fn flip_cards(
    buttons: Query<(&Interaction, &CardButton), Changed<Interaction>>,
    board: Option<ResMut<MemoryBoard>>,
    session: Option<ResMut<PuzzleSession>>,
) {
    let (Some(mut board), Some(mut session)) = (board, session) else {
        return;
    };
    for (interaction, card) in &buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        if let Some(resolution) = board.flip(card.0) {
            session.resolve(resolution);
        }
    }
}

fn advance_board(
    board: Option<ResMut<MemoryBoard>>,
    session: Option<ResMut<PuzzleSession>>,
    time: Res<Time>,
) {
    let (Some(mut board), Some(mut session)) = (board, session) else {
        return;
    };
    if board.wait.is_none() {
        return;
    }
    let resolution = board.bypass_change_detection().advance(time.delta_secs());
    if board.wait.is_none() {
        board.set_changed();
    }
    if let Some(resolution) = resolution {
        session.resolve(resolution);
    }
}

fn render_board(
    mut commands: Commands,
    board: Option<Res<MemoryBoard>>,
    panel: Query<Entity, With<MemoryPanel>>,
    locale: Res<Locale>,
) {
    let Some(board) = board else {
        return;
    };
    // Countdown ticks alone don't change what's on screen.
    if !board.is_changed() && !locale.is_changed() {
        return;
    }
    let Ok(panel) = panel.single() else {
        return;
    };

    let texts = locale.texts();
    commands.entity(panel).despawn_related::<Children>();
    commands.entity(panel).with_children(|parent| {
        if board.is_solved() {
            spawn_label(parent, texts.memory_success, 32.0, PINK);
            return;
        }
        spawn_label(parent, texts.memory_title, 30.0, PINK);
        spawn_label(
            parent,
            format!(
                "{}: {}/{}    {}: {}/{}",
                texts.memory_pairs,
                board.matched_pairs(),
                board.pair_count(),
                texts.memory_mismatches,
                board.mismatches(),
                MAX_MISMATCHES,
            ),
            16.0,
            LIGHT_PINK,
        );
        parent
            .spawn(Node {
                display: Display::Grid,
                grid_template_columns: vec![RepeatedGridTrack::flex(4, 1.0)],
                column_gap: Val::Px(10.0),
                row_gap: Val::Px(10.0),
                ..default()
            })
            .with_children(|grid| {
                for (index, card) in board.cards().iter().enumerate() {
                    let marker = CardButton(index);
                    if card.matched {
                        spawn_button(grid, MEMORY_CARDS[card.face], 130.0, marker)
                            .insert((Tinted, BackgroundColor(SUCCESS_GREEN.with_alpha(0.4))));
                    } else if card.face_up {
                        spawn_button(grid, MEMORY_CARDS[card.face], 130.0, marker)
                            .insert((Tinted, BackgroundColor(PINK.with_alpha(0.5))));
                    } else {
                        spawn_button(grid, "?", 130.0, marker);
                    }
                }
            });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzles::PuzzleOutcome;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Pairs sit next to each other: 0,0,1,1,...
    fn ordered() -> MemoryBoard {
        MemoryBoard::with_layout((0..MEMORY_CARDS.len()).flat_map(|f| [f, f]).collect())
    }

    #[test]
    fn deal_has_every_face_twice() {
        let board = MemoryBoard::new(&mut StdRng::seed_from_u64(3));
        assert_eq!(board.cards().len(), 12);
        for face in 0..MEMORY_CARDS.len() {
            assert_eq!(board.cards().iter().filter(|c| c.face == face).count(), 2);
        }
    }

    #[test]
    fn matching_every_pair_succeeds() {
        let mut board = ordered();
        let mut result = None;
        for pair in 0..6 {
            assert_eq!(board.flip(pair * 2), None);
            assert_eq!(board.flip(pair * 2 + 1), None);
            result = board.advance(MATCH_DELAY);
        }
        assert_eq!(result, Some(Resolution::success(SUCCESS_DELAY)));
        assert!(board.is_solved());
        assert_eq!(board.mismatches(), 0);
    }

    #[test]
    fn board_locks_while_two_cards_show() {
        let mut board = ordered();
        board.flip(0);
        board.flip(2);
        assert_eq!(board.flip(4), None);
        assert!(!board.cards()[4].face_up);

        board.advance(FLIP_BACK_DELAY);
        assert!(!board.cards()[0].face_up);
        assert!(!board.cards()[2].face_up);
        board.flip(4);
        assert!(board.cards()[4].face_up);
    }

    #[test]
    fn same_card_twice_is_ignored() {
        let mut board = ordered();
        board.flip(0);
        board.flip(0);
        assert_eq!(board.cards().iter().filter(|c| c.face_up).count(), 1);
        assert_eq!(board.mismatches(), 0);
    }

    #[test]
    fn sixth_mismatch_fails() {
        let mut board = ordered();
        for miss in 1..MAX_MISMATCHES {
            assert_eq!(board.flip(0), None);
            assert_eq!(board.flip(2), None);
            assert_eq!(board.mismatches(), miss);
            board.advance(FLIP_BACK_DELAY);
        }
        board.flip(0);
        let result = board.flip(2);
        assert_eq!(
            result.map(|r| r.outcome),
            Some(PuzzleOutcome::Failure(FailReason::TooManyMismatches))
        );
        assert_eq!(result.map(|r| r.delay), Some(FAIL_DELAY));
        // Nothing more can be flipped.
        board.advance(FLIP_BACK_DELAY);
        assert_eq!(board.flip(5), None);
        assert!(!board.cards()[5].face_up);
    }
}
