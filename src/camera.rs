// Chase camera orbiting the avatar, steered by drag deltas.
use bevy::prelude::*;

use crate::AdventureSet;
use crate::config::{AdventureConfig, CameraConfig};
use crate::input::PlayerIntent;
use crate::player::Player;
use crate::progress::{GameProgress, simulation_running};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(
                Update,
                (
                    reset_orbit,
                    orbit_camera.run_if(simulation_running),
                )
                    .chain()
                    .in_set(AdventureSet::Orbit),
            )
            .add_systems(
                Update,
                follow_player
                    .run_if(simulation_running)
                    .in_set(AdventureSet::Present),
            );
    }
}

/// Orbit angles around the avatar.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CameraOrbit {
    pub azimuth: f32,
    pub polar: f32,
}

impl CameraOrbit {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            azimuth: 0.0,
            polar: config.initial_polar,
        }
    }

    /// Applies one frame of drag. Horizontal drag swings around, vertical
    /// drag tilts within the configured band.
    pub fn apply_drag(&mut self, delta: Vec2, config: &CameraConfig) {
        self.azimuth -= delta.x * config.sensitivity;
        self.polar = (self.polar + delta.y * config.sensitivity)
            .clamp(config.min_polar, config.max_polar);
    }

    /// Offset from the avatar to where the camera wants to be.
    pub fn offset(&self, config: &CameraConfig) -> Vec3 {
        Vec3::new(
            self.azimuth.sin() * self.polar.cos() * config.distance,
            self.polar.sin() * config.height,
            self.azimuth.cos() * self.polar.cos() * config.distance,
        )
    }
}

#[derive(Component)]
pub struct ChaseCamera;

/// Moves `current` a fixed fraction of the way to `target`.
pub fn blend_toward(current: Vec3, target: Vec3, fraction: f32) -> Vec3 {
    current.lerp(target, fraction)
}

fn spawn_camera(mut commands: Commands, config: Res<AdventureConfig>) {
    let orbit = CameraOrbit::new(&config.camera);
    let focus = config.spawn + Vec3::Y * config.camera.look_lift;
    commands.insert_resource(orbit);
    commands.spawn((
        ChaseCamera,
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: 60f32.to_radians(),
            ..default()
        }),
        DistanceFog {
            color: Color::srgb_u8(0x2d, 0x1f, 0x3d),
            falloff: FogFalloff::Linear {
                start: 30.0,
                end: 80.0,
            },
            ..default()
        },
        Transform::from_translation(config.spawn + orbit.offset(&config.camera))
            .looking_at(focus, Vec3::Y),
    ));
}

/// Restores the default framing whenever the avatar is respawned.
fn reset_orbit(
    mut seen_epoch: Local<u32>,
    progress: Res<GameProgress>,
    config: Res<AdventureConfig>,
    mut orbit: ResMut<CameraOrbit>,
    mut camera: Query<&mut Transform, With<ChaseCamera>>,
) {
    if *seen_epoch == progress.spawn_epoch {
        return;
    }
    *seen_epoch = progress.spawn_epoch;
    *orbit = CameraOrbit::new(&config.camera);

    if let Ok(mut transform) = camera.single_mut() {
        let focus = config.spawn + Vec3::Y * config.camera.look_lift;
        *transform = Transform::from_translation(config.spawn + orbit.offset(&config.camera))
            .looking_at(focus, Vec3::Y);
    }
}

fn orbit_camera(
    mut intent: ResMut<PlayerIntent>,
    mut orbit: ResMut<CameraOrbit>,
    config: Res<AdventureConfig>,
) {
    let delta = intent.take_camera_delta();
    if delta != Vec2::ZERO {
        orbit.apply_drag(delta, &config.camera);
    }
}

fn follow_player(
    player: Query<&Transform, (With<Player>, Without<ChaseCamera>)>,
    mut camera: Query<&mut Transform, With<ChaseCamera>>,
    orbit: Res<CameraOrbit>,
    config: Res<AdventureConfig>,
) {
    let Ok(player) = player.single() else {
        return;
    };
    let Ok(mut transform) = camera.single_mut() else {
        return;
    };

    let target = player.translation + orbit.offset(&config.camera);
    transform.translation = blend_toward(transform.translation, target, config.camera.blend);
    transform.look_at(
        player.translation + Vec3::Y * config.camera.look_lift,
        Vec3::Y,
    );
}
