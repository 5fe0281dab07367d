// Love-letter trivia: three questions, one wrong answer ends the round.
use bevy::prelude::*;
use rand::Rng;
use rand::seq::SliceRandom;

use super::data::TRIVIA_QUESTIONS;
use super::{
    FailReason, LIGHT_PINK, PINK, PuzzleKind, PuzzleSession, Resolution, SUCCESS_GREEN,
    FAIL_RED, Tinted, spawn_button, spawn_label, spawn_overlay,
};
use crate::AdventureSet;
use crate::i18n::{Locale, fill};
use crate::progress::ActivePuzzle;

const KIND: PuzzleKind = PuzzleKind::Trivia;

const JUDGE_DELAY: f32 = 0.6;
const NEXT_DELAY: f32 = 0.8;
const SUCCESS_DELAY: f32 = 2.0;

pub struct TriviaPlugin;

impl Plugin for TriviaPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(ActivePuzzle::Open(KIND)), start_round)
            .add_systems(OnExit(ActivePuzzle::Open(KIND)), |mut commands: Commands| {
                commands.remove_resource::<TriviaRound>();
            })
            .add_systems(
                Update,
                (pick_answer, advance_round, render_round)
                    .chain()
                    .run_if(in_state(ActivePuzzle::Open(KIND)))
                    .in_set(AdventureSet::Simulate),
            );
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Question {
    prompt: &'static str,
    options: Vec<&'static str>,
    correct: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Judge,
    Next,
}

/// One playthrough of the trivia questions.
#[derive(Resource, Debug, Clone)]
pub struct TriviaRound {
    questions: Vec<Question>,
    current: usize,
    picked: Option<usize>,
    wait: Option<(Step, f32)>,
    solved: bool,
}

impl TriviaRound {
    /// Shuffles each question's options.
    pub fn new(rng: &mut impl Rng) -> Self {
        let questions = TRIVIA_QUESTIONS
            .iter()
            .map(|q| {
                let mut order: Vec<usize> = (0..q.options.len()).collect();
                order.shuffle(rng);
                Question {
                    prompt: q.prompt,
                    options: order.iter().map(|&i| q.options[i]).collect(),
                    correct: order.iter().position(|&i| i == q.correct).unwrap_or(0),
                }
            })
            .collect();
        Self {
            questions,
            current: 0,
            picked: None,
            wait: None,
            solved: false,
        }
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn correct_option(&self) -> usize {
        self.questions[self.current].correct
    }

    /// Locks in `option` for the current question. Ignored while a previous
    /// answer is still being judged.
    pub fn answer(&mut self, option: usize) -> bool {
        if self.picked.is_some() || self.solved {
            return false;
        }
        self.picked = Some(option);
        self.wait = Some((Step::Judge, JUDGE_DELAY));
        true
    }

    pub fn advance(&mut self, dt: f32) -> Option<Resolution> {
        let (step, remaining) = self.wait.as_mut()?;
        *remaining -= dt;
        if *remaining > 0.0 {
            return None;
        }
        let step = *step;
        self.wait = None;

        match step {
            Step::Judge => {
                if self.picked != Some(self.correct_option()) {
                    return Some(Resolution::failure(FailReason::WrongAnswer, 0.0));
                }
                if self.current + 1 == self.questions.len() {
                    self.solved = true;
                    return Some(Resolution::success(SUCCESS_DELAY));
                }
                self.wait = Some((Step::Next, NEXT_DELAY));
            }
            Step::Next => {
                self.current += 1;
                self.picked = None;
            }
        }
        None
    }

    fn view(&self) -> TriviaView {
        TriviaView {
            current: self.current,
            picked: self.picked,
            solved: self.solved,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TriviaView {
    current: usize,
    picked: Option<usize>,
    solved: bool,
}

#[derive(Component)]
struct TriviaPanel;

#[derive(Component)]
struct OptionButton(usize);

fn start_round(mut commands: Commands) {
    let mut rng = rand::rng();
    commands.insert_resource(TriviaRound::new(&mut rng));
    spawn_overlay(&mut commands, KIND).with_children(|parent| {
        parent.spawn((
            TriviaPanel,
            Node {
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Val::Px(14.0),
                max_width: Val::Px(600.0),
                ..default()
            },
        ));
    });
}

fn pick_answer(
    buttons: Query<(&Interaction, &OptionButton), Changed<Interaction>>,
    round: Option<ResMut<TriviaRound>>,
) {
    let Some(mut round) = round else {
        return;
    };
    for (interaction, option) in &buttons {
        if *interaction == Interaction::Pressed && round.answer(option.0) {
            debug!(option = option.0, "trivia answer");
        }
    }
}

fn advance_round(
    round: Option<ResMut<TriviaRound>>,
    session: Option<ResMut<PuzzleSession>>,
    time: Res<Time>,
) {
    let (Some(mut round), Some(mut session)) = (round, session) else {
        return;
    };
    if round.wait.is_none() {
        return;
    }
    if let Some(resolution) = round.advance(time.delta_secs()) {
        session.resolve(resolution);
    }
}

fn render_round(
    mut commands: Commands,
    mut last: Local<Option<TriviaView>>,
    round: Option<Res<TriviaRound>>,
    panel: Query<Entity, With<TriviaPanel>>,
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
    let question = &round.questions[round.current];
    commands.entity(panel).despawn_related::<Children>();
    commands.entity(panel).with_children(|parent| {
        if round.solved {
            spawn_label(parent, texts.trivia_success, 34.0, PINK);
            return;
        }
        spawn_label(
            parent,
            fill(
                texts.trivia_question_of,
                &[("current", &(round.current + 1)), ("total", &round.total())],
            ),
            16.0,
            LIGHT_PINK,
        );
        spawn_label(parent, question.prompt, 28.0, Color::WHITE);

        for (index, option) in question.options.iter().enumerate() {
            let marker = OptionButton(index);
            match view.picked {
                Some(picked) if picked == index => {
                    let tint = if index == question.correct {
                        SUCCESS_GREEN
                    } else {
                        FAIL_RED
                    };
                    spawn_button(parent, *option, 420.0, marker).insert((Tinted, BackgroundColor(tint)));
                }
                _ => {
                    spawn_button(parent, *option, 420.0, marker);
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzles::PuzzleOutcome;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn round() -> TriviaRound {
        TriviaRound::new(&mut StdRng::seed_from_u64(7))
    }

    #[test]
    fn shuffle_keeps_the_right_answer() {
        let round = round();
        for (question, source) in round.questions.iter().zip(TRIVIA_QUESTIONS.iter()) {
            assert_eq!(question.options[question.correct], source.options[source.correct]);
            let mut sorted = question.options.clone();
            sorted.sort_unstable();
            let mut expected = source.options.to_vec();
            expected.sort_unstable();
            assert_eq!(sorted, expected);
        }
    }

    #[test]
    fn all_right_answers_succeed_after_the_last_one() {
        let mut round = round();
        for _ in 0..round.total() {
            assert!(round.answer(round.correct_option()));
            assert_eq!(round.advance(0.5), None);
            let resolution = round.advance(0.2);
            if round.solved {
                assert_eq!(resolution, Some(Resolution::success(SUCCESS_DELAY)));
                return;
            }
            assert_eq!(resolution, None);
            assert_eq!(round.advance(NEXT_DELAY), None);
        }
        panic!("round never finished");
    }

    #[test]
    fn wrong_answer_fails_after_the_judge_delay() {
        let mut round = round();
        let wrong = (round.correct_option() + 1) % 4;
        round.answer(wrong);
        assert_eq!(round.advance(0.3), None);
        let resolution = round.advance(0.4).map(|r| r.outcome);
        assert_eq!(resolution, Some(PuzzleOutcome::Failure(FailReason::WrongAnswer)));
    }

    #[test]
    fn answers_are_locked_while_judging() {
        let mut round = round();
        assert!(round.answer(round.correct_option()));
        assert!(!round.answer(0));
        round.advance(JUDGE_DELAY);
        assert!(!round.answer(0));
        round.advance(NEXT_DELAY);
        assert_eq!(round.current, 1);
        assert!(round.answer(0));
    }

    #[test]
    fn reopened_round_draws_on_its_first_frame() {
        let mut world = World::new();
        world.init_resource::<Locale>();
        let render = world.register_system(render_round);

        world.insert_resource(round());
        let first = world.spawn(TriviaPanel).id();
        world.run_system(render).unwrap();
        assert!(world.get::<Children>(first).is_some_and(|c| !c.is_empty()));

        // Closed, then opened again showing the same first question.
        world.despawn(first);
        world.remove_resource::<TriviaRound>();
        world.insert_resource(round());
        let second = world.spawn(TriviaPanel).id();
        world.run_system(render).unwrap();
        assert!(world.get::<Children>(second).is_some_and(|c| !c.is_empty()));
    }
}
