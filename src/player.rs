// Third-person avatar: gravity, camera-relative walking and path confinement.
use std::f32::consts::{PI, TAU};

use bevy::prelude::*;

use crate::AdventureSet;
use crate::camera::CameraOrbit;
use crate::config::AdventureConfig;
use crate::input::PlayerIntent;
use crate::progress::{GameProgress, Screen, simulation_running};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_player)
            .add_systems(OnEnter(Screen::Garden), show_player)
            .add_systems(OnEnter(Screen::Title), hide_player)
            .add_systems(
                Update,
                (
                    respawn_player,
                    player_movement.run_if(simulation_running),
                )
                    .chain()
                    .in_set(AdventureSet::Simulate),
            );
    }
}

#[derive(Component)]
pub struct Player;

/// Continuous state the renderer does not own.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct PlayerState {
    pub velocity_y: f32,
    /// Heading around +Y, eased toward the direction of travel.
    pub facing: f32,
}

/// Everything one kinematics step reads besides the player itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepInput {
    pub move_axes: Vec2,
    pub jump: bool,
    pub azimuth: f32,
    /// Deepest z currently unlocked.
    pub min_depth: f32,
    pub dt: f32,
}

/// Advances the avatar by one frame.
pub fn step_player(
    position: &mut Vec3,
    state: &mut PlayerState,
    input: &StepInput,
    config: &AdventureConfig,
) {
    let movement = &config.movement;
    let dt = input.dt.clamp(0.0, movement.max_dt);

    let forward = Vec3::new(-input.azimuth.sin(), 0.0, -input.azimuth.cos());
    let right = Vec3::new(-forward.z, 0.0, forward.x);
    let mut step = forward * input.move_axes.y + right * input.move_axes.x;

    if input.jump && position.y <= movement.ground_y {
        state.velocity_y = movement.jump_impulse;
    }
    state.velocity_y += movement.gravity * dt;
    position.y += state.velocity_y * dt;
    if position.y <= movement.ground_y {
        position.y = movement.ground_y;
        state.velocity_y = 0.0;
    }

    if step.length_squared() > 0.0 {
        step = step.normalize() * movement.speed * dt;
        position.x += step.x;
        position.z += step.z;

        let heading = step.x.atan2(step.z);
        state.facing += shortest_turn(state.facing, heading) * movement.facing_blend;
    }

    position.z = position.z.clamp(input.min_depth, config.world_max_depth);
    let center = config.path_center(position.z);
    position.x = position.x.clamp(
        center - movement.path_half_width,
        center + movement.path_half_width,
    );
}

/// Signed angle in (-PI, PI] that turns `from` onto `to`.
fn shortest_turn(from: f32, to: f32) -> f32 {
    let delta = (to - from).rem_euclid(TAU);
    if delta > PI { delta - TAU } else { delta }
}

fn spawn_player(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<AdventureConfig>,
) {
    let body = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0xFF, 0x8F, 0xAB),
        ..default()
    });
    let eye = materials.add(Color::srgb_u8(0x33, 0x33, 0x33));
    let heart = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0xFF, 0x4D, 0x6D),
        emissive: LinearRgba::rgb(0.5, 0.15, 0.2),
        ..default()
    });
    let eye_mesh = meshes.add(Sphere::new(0.05));

    commands
        .spawn((
            Player,
            PlayerState::default(),
            Mesh3d(meshes.add(Capsule3d::new(0.25, 0.5))),
            MeshMaterial3d(body),
            Transform::from_translation(config.spawn),
            Visibility::Hidden,
        ))
        .with_children(|parent| {
            for x in [0.1, -0.1] {
                parent.spawn((
                    Mesh3d(eye_mesh.clone()),
                    MeshMaterial3d(eye.clone()),
                    Transform::from_xyz(x, 0.2, 0.22),
                ));
            }
            parent.spawn((
                Mesh3d(meshes.add(Sphere::new(0.15))),
                MeshMaterial3d(heart),
                Transform::from_xyz(0.0, 0.55, 0.0),
            ));
        });
}

fn show_player(mut player: Query<&mut Visibility, With<Player>>) {
    if let Ok(mut visibility) = player.single_mut() {
        *visibility = Visibility::Inherited;
    }
}

fn hide_player(mut player: Query<&mut Visibility, With<Player>>) {
    if let Ok(mut visibility) = player.single_mut() {
        *visibility = Visibility::Hidden;
    }
}

/// Puts the avatar back on the spawn point whenever the store asks for it.
fn respawn_player(
    mut seen_epoch: Local<u32>,
    progress: Res<GameProgress>,
    config: Res<AdventureConfig>,
    mut player: Query<(&mut Transform, &mut PlayerState), With<Player>>,
) {
    if *seen_epoch == progress.spawn_epoch {
        return;
    }
    let Ok((mut transform, mut state)) = player.single_mut() else {
        return;
    };
    *seen_epoch = progress.spawn_epoch;
    transform.translation = config.spawn;
    transform.rotation = Quat::IDENTITY;
    *state = PlayerState::default();
}

fn player_movement(
    mut query: Query<(&mut Transform, &mut PlayerState), With<Player>>,
    mut intent: ResMut<PlayerIntent>,
    orbit: Res<CameraOrbit>,
    progress: Res<GameProgress>,
    config: Res<AdventureConfig>,
    time: Res<Time>,
) {
    let Ok((mut transform, mut state)) = query.single_mut() else {
        return;
    };

    let input = StepInput {
        move_axes: intent.move_axes(),
        jump: intent.take_jump(),
        azimuth: orbit.azimuth,
        min_depth: config.max_allowed_depth(&progress.zones_completed),
        dt: time.delta_secs(),
    };
    let mut position = transform.translation;
    step_player(&mut position, &mut state, &input, &config);

    transform.translation = position;
    transform.rotation = Quat::from_rotation_y(state.facing);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ZONE_COUNT;
    use crate::puzzles::PuzzleKind;

    const FRAME: f32 = 1.0 / 60.0;

    fn forward(min_depth: f32) -> StepInput {
        StepInput {
            move_axes: Vec2::Y,
            min_depth,
            dt: FRAME,
            ..default()
        }
    }

    #[test]
    fn never_sinks_below_ground() {
        let config = AdventureConfig::default();
        let ground = config.movement.ground_y;
        let mut position = config.spawn;
        let mut state = PlayerState::default();

        let mut input = StepInput {
            jump: true,
            min_depth: config.world_min_depth,
            dt: 0.05,
            ..default()
        };
        step_player(&mut position, &mut state, &input, &config);
        assert!(position.y > ground);
        assert!(state.velocity_y > 0.0);

        input.jump = false;
        let mut landed = false;
        for dt in [0.05, 0.01, 0.033, 0.0, 0.05, 0.02].into_iter().cycle().take(200) {
            input.dt = dt;
            step_player(&mut position, &mut state, &input, &config);
            assert!(position.y >= ground);
            if position.y == ground {
                assert_eq!(state.velocity_y, 0.0);
                landed = true;
            }
        }
        assert!(landed);
    }

    #[test]
    fn jump_only_from_the_ground() {
        let config = AdventureConfig::default();
        let mut position = config.spawn + Vec3::Y * 2.0;
        let mut state = PlayerState {
            velocity_y: -1.0,
            ..default()
        };
        let input = StepInput {
            jump: true,
            min_depth: config.world_min_depth,
            dt: FRAME,
            ..default()
        };
        step_player(&mut position, &mut state, &input, &config);
        assert!(state.velocity_y < 0.0);
    }

    #[test]
    fn frame_hitches_are_clamped() {
        let config = AdventureConfig::default();
        let mut position = config.spawn;
        let mut state = PlayerState::default();
        let mut input = forward(config.world_min_depth);
        input.dt = 1.0;
        step_player(&mut position, &mut state, &input, &config);

        let travelled = config.spawn.z - position.z;
        assert!((travelled - config.movement.speed * config.movement.max_dt).abs() < 1e-4);
    }

    #[test]
    fn movement_is_relative_to_camera_azimuth() {
        let config = AdventureConfig::default();
        let mut position = Vec3::new(0.0, config.movement.ground_y, -20.0);
        let mut state = PlayerState::default();
        let mut input = forward(config.world_min_depth);
        // Camera swung a quarter turn: forward now points along -X.
        input.azimuth = std::f32::consts::FRAC_PI_2;
        let before = position;
        step_player(&mut position, &mut state, &input, &config);
        assert!(position.x < before.x);
        assert!((position.z - before.z).abs() < 1e-4);
    }

    #[test]
    fn diagonal_input_is_not_faster() {
        let config = AdventureConfig::default();
        let start = Vec3::new(0.0, config.movement.ground_y, -20.0);
        let mut position = start;
        let mut state = PlayerState::default();
        let input = StepInput {
            move_axes: Vec2::new(1.0, 1.0),
            min_depth: config.world_min_depth,
            dt: FRAME,
            ..default()
        };
        step_player(&mut position, &mut state, &input, &config);
        let distance = (position - start).with_y(0.0).length();
        assert!((distance - config.movement.speed * FRAME).abs() < 1e-4);
    }

    #[test]
    fn locked_gate_stops_the_player() {
        let config = AdventureConfig::default();
        let mut flags = [false; ZONE_COUNT];
        let mut position = config.spawn;
        let mut state = PlayerState::default();

        for _ in 0..2000 {
            let input = forward(config.max_allowed_depth(&flags));
            step_player(&mut position, &mut state, &input, &config);
        }
        assert_eq!(position.z, -43.0);

        flags[0] = true;
        for _ in 0..2000 {
            let input = forward(config.max_allowed_depth(&flags));
            step_player(&mut position, &mut state, &input, &config);
        }
        assert!(position.z < -45.0);
        assert_eq!(position.z, -73.0);
    }

    #[test]
    fn stays_on_the_path() {
        let config = AdventureConfig::default();
        let mut position = Vec3::new(0.0, config.movement.ground_y, -20.0);
        let mut state = PlayerState::default();
        let input = StepInput {
            move_axes: Vec2::X,
            min_depth: config.world_min_depth,
            dt: FRAME,
            ..default()
        };
        for _ in 0..500 {
            step_player(&mut position, &mut state, &input, &config);
        }
        let center = config.path_center(position.z);
        assert!((position.x - (center + config.movement.path_half_width)).abs() < 1e-4);
    }

    #[test]
    fn facing_eases_toward_heading() {
        let config = AdventureConfig::default();
        let mut position = Vec3::new(0.0, config.movement.ground_y, -20.0);
        let mut state = PlayerState::default();
        let input = StepInput {
            move_axes: Vec2::X,
            min_depth: config.world_min_depth,
            dt: FRAME,
            ..default()
        };
        step_player(&mut position, &mut state, &input, &config);
        let target = std::f32::consts::FRAC_PI_2;
        assert!(state.facing > 0.0 && state.facing < target);
        for _ in 0..200 {
            step_player(&mut position, &mut state, &input, &config);
        }
        assert!((state.facing - target).abs() < 1e-3);
    }

    #[test]
    fn shortest_turn_wraps() {
        assert!((shortest_turn(3.0, -3.0) - (TAU - 6.0)).abs() < 1e-5);
        assert!((shortest_turn(-3.0, 3.0) + (TAU - 6.0)).abs() < 1e-5);
        assert_eq!(shortest_turn(1.0, 1.0), 0.0);
    }

    #[test]
    fn solving_the_first_puzzle_opens_the_next_stretch() {
        let config = AdventureConfig::default();
        let mut progress = GameProgress::default();
        progress.start_game();
        let mut position = config.spawn;
        let mut state = PlayerState::default();

        let mut walk = |position: &mut Vec3, progress: &GameProgress| {
            for _ in 0..2000 {
                let input = forward(config.max_allowed_depth(&progress.zones_completed));
                step_player(position, &mut state, &input, &config);
            }
        };

        walk(&mut position, &progress);
        assert_eq!(position.z, -43.0);

        assert!(progress.activate_puzzle(PuzzleKind::Trivia));
        progress.complete_zone(PuzzleKind::Trivia.ordinal());
        assert_eq!(progress.current_zone, 2);
        assert_eq!(progress.active_puzzle, None);

        walk(&mut position, &progress);
        assert_eq!(position.z, -73.0);
    }
}
