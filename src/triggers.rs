// Proximity checks against the puzzle triggers and the interact hand-off.
use bevy::prelude::*;

use crate::AdventureSet;
use crate::camera::ChaseCamera;
use crate::config::{AdventureConfig, TriggerZone};
use crate::i18n::Locale;
use crate::input::PlayerIntent;
use crate::player::Player;
use crate::progress::{GameProgress, Screen, ZONE_COUNT, simulation_running};
use crate::puzzles::PuzzleKind;

pub struct TriggersPlugin;

impl Plugin for TriggersPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NearbyTrigger>()
            .add_systems(OnEnter(Screen::Garden), spawn_prompt)
            .add_systems(
                Update,
                (resolve_triggers, handle_interact)
                    .chain()
                    .run_if(simulation_running)
                    .in_set(AdventureSet::Resolve),
            )
            .add_systems(
                Update,
                update_prompt
                    .run_if(in_state(Screen::Garden))
                    .in_set(AdventureSet::Present),
            );
    }
}

/// Which text the interact prompt should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Completed,
    PreviousIncomplete,
    CallToAction(PuzzleKind),
}

/// Per-frame result of the proximity scan.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct NearbyTrigger {
    /// Index into the configured trigger list.
    pub index: Option<usize>,
    pub show_prompt: bool,
    pub prompt: Option<Prompt>,
}

/// Nearest trigger whose activation sphere contains `position`.
///
/// Equal distances keep the trigger listed first.
pub fn nearest_trigger(position: Vec3, triggers: &[TriggerZone]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, trigger) in triggers.iter().enumerate() {
        let distance = position.distance(trigger.position);
        if distance >= trigger.radius {
            continue;
        }
        if best.is_none_or(|(_, closest)| distance < closest) {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
}

/// Prompt for a trigger given the current completion flags.
pub fn prompt_for(trigger: &TriggerZone, flags: &[bool; ZONE_COUNT]) -> Prompt {
    let ordinal = trigger.ordinal;
    let unlocked = ordinal == 1 || flags[ordinal - 2];
    if flags[ordinal - 1] {
        Prompt::Completed
    } else if !unlocked {
        Prompt::PreviousIncomplete
    } else {
        Prompt::CallToAction(trigger.puzzle)
    }
}

pub fn scan(
    position: Vec3,
    config: &AdventureConfig,
    progress: &GameProgress,
) -> NearbyTrigger {
    let index = nearest_trigger(position, &config.triggers);
    let prompt = index.map(|i| prompt_for(&config.triggers[i], &progress.zones_completed));
    NearbyTrigger {
        index,
        show_prompt: index.is_some() && progress.active_puzzle.is_none(),
        prompt,
    }
}

/// Opens the nearby puzzle if it can be played right now. Returns whether
/// a puzzle was opened; anything else leaves the store untouched.
pub fn interact(nearby: &NearbyTrigger, progress: &mut GameProgress) -> bool {
    match nearby.prompt {
        Some(Prompt::CallToAction(puzzle)) if progress.active_puzzle.is_none() => {
            progress.activate_puzzle(puzzle)
        }
        _ => false,
    }
}

fn resolve_triggers(
    player: Query<&Transform, With<Player>>,
    config: Res<AdventureConfig>,
    progress: Res<GameProgress>,
    mut nearby: ResMut<NearbyTrigger>,
) {
    let Ok(transform) = player.single() else {
        return;
    };
    let next = scan(transform.translation, &config, &progress);
    if *nearby != next {
        if nearby.index != next.index {
            debug!(trigger = ?next.index, "nearest trigger changed");
        }
        *nearby = next;
    }
}

fn handle_interact(
    mut intent: ResMut<PlayerIntent>,
    nearby: Res<NearbyTrigger>,
    mut progress: ResMut<GameProgress>,
) {
    if !intent.take_interact() {
        return;
    }
    // Bypass change detection unless something actually opens.
    if !interact(&nearby, progress.bypass_change_detection()) {
        debug!(prompt = ?nearby.prompt, "interact ignored");
        return;
    }
    progress.set_changed();
}

#[derive(Component)]
struct InteractPrompt;

fn spawn_prompt(mut commands: Commands) {
    commands.spawn((
        InteractPrompt,
        Text::new(""),
        TextFont {
            font_size: 22.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            ..default()
        },
        Visibility::Hidden,
        DespawnOnExit(Screen::Garden),
    ));
}

fn update_prompt(
    mut prompt: Query<(&mut Text, &mut Node, &mut Visibility, &ComputedNode), With<InteractPrompt>>,
    camera: Query<(&Camera, &GlobalTransform), With<ChaseCamera>>,
    player: Query<&GlobalTransform, With<Player>>,
    nearby: Res<NearbyTrigger>,
    progress: Res<GameProgress>,
    locale: Res<Locale>,
) {
    let Ok((mut text, mut node, mut visibility, computed)) = prompt.single_mut() else {
        return;
    };
    let (Some(kind), true) = (nearby.prompt, nearby.show_prompt && progress.simulation_running())
    else {
        *visibility = Visibility::Hidden;
        return;
    };
    let Ok((camera, camera_global)) = camera.single() else {
        return;
    };
    let Ok(player_global) = player.single() else {
        return;
    };

    // Hover above the avatar's head.
    let anchor = player_global.translation() + Vec3::Y * 2.0;
    let Ok(screen_pos) = camera.world_to_viewport(camera_global, anchor) else {
        *visibility = Visibility::Hidden;
        return;
    };

    let texts = locale.texts();
    let label = match kind {
        Prompt::Completed => texts.completed,
        Prompt::PreviousIncomplete => texts.complete_previous,
        Prompt::CallToAction(puzzle) => texts.trigger_labels[puzzle.ordinal() - 1],
    };
    if text.as_str() != label {
        **text = label.to_string();
    }

    let size = computed.size() * computed.inverse_scale_factor();
    node.left = Val::Px(screen_pos.x - size.x / 2.0);
    node.top = Val::Px(screen_pos.y - size.y / 2.0);
    *visibility = Visibility::Inherited;
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    fn trigger(position: Vec3, puzzle: PuzzleKind) -> TriggerZone {
        TriggerZone {
            position,
            radius: 4.0,
            puzzle,
            ordinal: puzzle.ordinal(),
        }
    }

    fn started() -> GameProgress {
        let mut progress = GameProgress::default();
        progress.start_game();
        progress
    }

    #[test]
    fn picks_the_closest_trigger_in_range() {
        let triggers = AdventureConfig::default().triggers;
        assert_eq!(nearest_trigger(Vec3::new(0.0, 0.6, -28.0), &triggers), Some(0));
        assert_eq!(nearest_trigger(Vec3::new(1.0, 0.6, -88.0), &triggers), Some(2));
        assert_eq!(nearest_trigger(Vec3::new(0.0, 0.6, 4.0), &triggers), None);
        // Exactly on the radius is outside.
        assert_eq!(nearest_trigger(Vec3::new(0.0, 0.0, -26.0), &triggers), None);
    }

    #[test]
    fn ties_go_to_the_first_configured_trigger() {
        let triggers = [
            trigger(Vec3::new(-1.0, 0.0, 0.0), PuzzleKind::Trivia),
            trigger(Vec3::new(1.0, 0.0, 0.0), PuzzleKind::Driving),
        ];
        for _ in 0..10 {
            assert_eq!(nearest_trigger(Vec3::ZERO, &triggers), Some(0));
        }
        let reversed = [triggers[1].clone(), triggers[0].clone()];
        assert_eq!(nearest_trigger(Vec3::ZERO, &reversed), Some(0));
        assert_eq!(reversed[0].ordinal, 2);
    }

    #[test]
    fn prompt_cases_are_exclusive() {
        let config = AdventureConfig::default();
        let second = &config.triggers[1];

        let flags = [false; ZONE_COUNT];
        assert_eq!(prompt_for(second, &flags), Prompt::PreviousIncomplete);
        assert_eq!(
            prompt_for(&config.triggers[0], &flags),
            Prompt::CallToAction(PuzzleKind::Trivia)
        );

        let flags = [true, false, false, false];
        assert_eq!(
            prompt_for(second, &flags),
            Prompt::CallToAction(PuzzleKind::Driving)
        );

        let flags = [true, true, false, false];
        assert_eq!(prompt_for(second, &flags), Prompt::Completed);
    }

    #[test]
    fn interact_without_an_eligible_trigger_changes_nothing() {
        let config = AdventureConfig::default();
        let mut progress = started();

        // Nothing nearby.
        let nearby = scan(config.spawn, &config, &progress);
        let before = progress.clone();
        assert!(!interact(&nearby, &mut progress));
        assert_eq!(progress, before);

        // Near the driving trigger before the trivia zone is done.
        let nearby = scan(Vec3::new(0.0, 0.6, -57.0), &config, &progress);
        assert_eq!(nearby.prompt, Some(Prompt::PreviousIncomplete));
        assert!(!interact(&nearby, &mut progress));
        assert_eq!(progress, before);
    }

    #[test]
    fn interact_opens_an_eligible_puzzle_once() {
        let config = AdventureConfig::default();
        let mut progress = started();
        let nearby = scan(Vec3::new(0.0, 0.6, -30.0), &config, &progress);

        assert!(interact(&nearby, &mut progress));
        assert_eq!(progress.active_puzzle, Some(PuzzleKind::Trivia));
        assert!(!interact(&nearby, &mut progress));
    }

    #[test]
    fn completed_trigger_cannot_be_replayed() {
        let config = AdventureConfig::default();
        let mut progress = started();
        progress.complete_zone(1);
        let nearby = scan(Vec3::new(0.0, 0.6, -30.0), &config, &progress);
        assert_eq!(nearby.prompt, Some(Prompt::Completed));
        let before = progress.clone();
        assert!(!interact(&nearby, &mut progress));
        assert_eq!(progress, before);
    }

    #[test]
    fn interact_system_consumes_the_press() {
        let config = AdventureConfig::default();
        let progress = started();
        let nearby = scan(Vec3::new(0.0, 0.6, -30.0), &config, &progress);

        let mut world = World::new();
        let mut intent = PlayerIntent::default();
        intent.press_interact();
        world.insert_resource(intent);
        world.insert_resource(nearby);
        world.insert_resource(progress);

        world.run_system_once(handle_interact).unwrap();
        assert_eq!(
            world.resource::<GameProgress>().active_puzzle,
            Some(PuzzleKind::Trivia)
        );
        assert!(!world.resource_mut::<PlayerIntent>().take_interact());
    }

    #[test]
    fn ignored_interact_leaves_the_store_untouched() {
        let config = AdventureConfig::default();
        let progress = started();
        let nearby = scan(config.spawn, &config, &progress);

        let mut world = World::new();
        let mut intent = PlayerIntent::default();
        intent.press_interact();
        world.insert_resource(intent);
        world.insert_resource(nearby);
        world.insert_resource(progress.clone());

        world.run_system_once(handle_interact).unwrap();
        assert_eq!(*world.resource::<GameProgress>(), progress);
        assert!(!world.resource_mut::<PlayerIntent>().take_interact());
    }
}
