// Scene dressing: ground, winding path, flowers, heart gates and trigger markers.
use bevy::prelude::*;
use fast_poisson::Poisson2D;
use rand::Rng;

use crate::AdventureSet;
use crate::config::AdventureConfig;
use crate::progress::{GameProgress, ZONE_COUNT};

pub struct GardenPlugin;

impl Plugin for GardenPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::srgb_u8(0x2d, 0x1f, 0x3d)))
            .add_systems(Startup, (setup_garden, spawn_gates, spawn_markers))
            .add_systems(
                Update,
                (update_gates, animate_markers).in_set(AdventureSet::Present),
            );
    }
}

/// Half the garden's width either side of x = 0.
const GARDEN_HALF_WIDTH: f32 = 24.0;
/// Minimum spacing between flowers.
const FLOWER_SPACING: f32 = 1.6;
/// Flowers keep this far from the walkable strip.
const PATH_MARGIN: f32 = 0.6;
const FLOWER_SEED: u64 = 14;
const PATH_TILE_STEP: f32 = 2.0;

const FLOWER_COLORS: [Color; 4] = [
    Color::srgb_u8(0xFF, 0x6B, 0x9D),
    Color::srgb_u8(0xF8, 0xA5, 0xC2),
    Color::srgb_u8(0xC4, 0x45, 0x69),
    Color::srgb_u8(0xFF, 0xF0, 0xF5),
];

/// Blue-noise flower positions (x, z) across the garden, clear of the path.
pub fn flower_points(config: &AdventureConfig, seed: u64) -> Vec<Vec2> {
    let depth = config.world_max_depth - config.world_min_depth;
    let clear = config.movement.path_half_width + PATH_MARGIN;
    Poisson2D::new()
        .with_dimensions([GARDEN_HALF_WIDTH * 2.0, depth], FLOWER_SPACING)
        .with_seed(seed)
        .generate()
        .into_iter()
        .map(|[x, z]| Vec2::new(x - GARDEN_HALF_WIDTH, config.world_min_depth + z))
        .filter(|p| (p.x - config.path_center(p.y)).abs() > clear)
        .collect()
}

/// Whether the gate guarding `required_flag` is open.
pub fn gate_open(flags: &[bool; ZONE_COUNT], required_flag: usize) -> bool {
    flags.get(required_flag).copied().unwrap_or(false)
}

/// Marker hover height at time `t`.
pub fn marker_bob(t: f32, phase: f32) -> f32 {
    1.2 + (t * 2.0 + phase).sin() * 0.2
}

fn setup_garden(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<AdventureConfig>,
) {
    commands.insert_resource(GlobalAmbientLight {
        color: Color::srgb(0.9, 0.75, 0.85),
        brightness: 250.0,
        affects_lightmapped_meshes: false,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 4_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.9, 0.4, 0.0)),
    ));

    let depth = config.world_max_depth - config.world_min_depth;
    let middle = (config.world_max_depth + config.world_min_depth) / 2.0;
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GARDEN_HALF_WIDTH * 2.0, depth + 40.0))),
        MeshMaterial3d(materials.add(Color::srgb_u8(0x3b, 0x6b, 0x3a))),
        Transform::from_xyz(0.0, 0.0, middle),
    ));

    // Stepping tiles along the winding path.
    let tile_mesh = meshes.add(Cuboid::new(config.movement.path_half_width * 2.0, 0.05, PATH_TILE_STEP * 0.9));
    let tile_material = materials.add(Color::srgb_u8(0xd8, 0xc3, 0xa5));
    let mut z = config.world_max_depth;
    while z >= config.world_min_depth {
        commands.spawn((
            Mesh3d(tile_mesh.clone()),
            MeshMaterial3d(tile_material.clone()),
            Transform::from_xyz(config.path_center(z), 0.025, z),
        ));
        z -= PATH_TILE_STEP;
    }

    let stem = meshes.add(Cylinder::new(0.03, 0.4));
    let bloom = meshes.add(Sphere::new(0.14));
    let stem_material = materials.add(Color::srgb_u8(0x2e, 0x7d, 0x32));
    let blooms: Vec<_> = FLOWER_COLORS
        .iter()
        .map(|color| {
            materials.add(StandardMaterial {
                base_color: *color,
                emissive: color.to_linear() * 0.2,
                ..default()
            })
        })
        .collect();

    let mut rng = rand::rng();
    let flowers = flower_points(&config, FLOWER_SEED);
    debug!(count = flowers.len(), "placing flowers");
    for point in flowers {
        let scale = rng.random_range(0.7..1.3);
        let material = blooms[rng.random_range(0..blooms.len())].clone();
        commands
            .spawn((
                Transform::from_xyz(point.x, 0.0, point.y).with_scale(Vec3::splat(scale)),
                Visibility::default(),
            ))
            .with_children(|flower| {
                flower.spawn((
                    Mesh3d(stem.clone()),
                    MeshMaterial3d(stem_material.clone()),
                    Transform::from_xyz(0.0, 0.2, 0.0),
                ));
                flower.spawn((
                    Mesh3d(bloom.clone()),
                    MeshMaterial3d(material),
                    Transform::from_xyz(0.0, 0.45, 0.0),
                ));
            });
    }
}

/// Arch over the path at a gate barrier.
#[derive(Component)]
struct HeartGate {
    required_flag: usize,
    heart: Handle<StandardMaterial>,
}

/// The see-through panel that shows while a gate is shut.
#[derive(Component)]
struct GateBars;

const GATE_LOCKED: Color = Color::srgb_u8(0xC4, 0x45, 0x69);
const GATE_OPEN: Color = Color::srgb_u8(0x7C, 0xE0, 0x8A);

fn spawn_gates(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<AdventureConfig>,
) {
    let post = meshes.add(Cuboid::new(0.3, 3.0, 0.3));
    let beam = meshes.add(Cuboid::new(5.0, 0.3, 0.3));
    let bars = meshes.add(Cuboid::new(4.4, 2.6, 0.05));
    let heart_mesh = meshes.add(Sphere::new(0.45));
    let wood = materials.add(Color::srgb_u8(0xF8, 0xA5, 0xC2));
    let glass = materials.add(StandardMaterial {
        base_color: GATE_LOCKED.with_alpha(0.25),
        alpha_mode: AlphaMode::Blend,
        ..default()
    });

    for barrier in &config.barriers {
        let heart = materials.add(StandardMaterial {
            base_color: GATE_LOCKED,
            emissive: GATE_LOCKED.to_linear(),
            ..default()
        });
        let x = config.path_center(barrier.depth);
        commands
            .spawn((
                HeartGate {
                    required_flag: barrier.required_flag,
                    heart: heart.clone(),
                },
                Transform::from_xyz(x, 0.0, barrier.depth),
                Visibility::default(),
            ))
            .with_children(|gate| {
                for side in [-2.35, 2.35] {
                    gate.spawn((
                        Mesh3d(post.clone()),
                        MeshMaterial3d(wood.clone()),
                        Transform::from_xyz(side, 1.5, 0.0),
                    ));
                }
                gate.spawn((
                    Mesh3d(beam.clone()),
                    MeshMaterial3d(wood.clone()),
                    Transform::from_xyz(0.0, 3.0, 0.0),
                ));
                gate.spawn((
                    Mesh3d(heart_mesh.clone()),
                    MeshMaterial3d(heart),
                    Transform::from_xyz(0.0, 3.5, 0.0),
                ));
                gate.spawn((
                    GateBars,
                    Mesh3d(bars.clone()),
                    MeshMaterial3d(glass.clone()),
                    Transform::from_xyz(0.0, 1.3, 0.0),
                ));
            });
    }
}

fn update_gates(
    progress: Res<GameProgress>,
    gates: Query<(&HeartGate, &Children)>,
    mut bars: Query<&mut Visibility, With<GateBars>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !progress.is_changed() {
        return;
    }
    for (gate, children) in &gates {
        let open = gate_open(&progress.zones_completed, gate.required_flag);
        if let Some(material) = materials.get_mut(&gate.heart) {
            let color = if open { GATE_OPEN } else { GATE_LOCKED };
            material.base_color = color;
            material.emissive = color.to_linear();
        }
        for child in children.iter() {
            if let Ok(mut visibility) = bars.get_mut(child) {
                *visibility = if open {
                    Visibility::Hidden
                } else {
                    Visibility::Inherited
                };
            }
        }
    }
}

/// Floating heart over a puzzle trigger.
#[derive(Component)]
struct TriggerMarker {
    ordinal: usize,
    phase: f32,
}

fn spawn_markers(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<AdventureConfig>,
) {
    let mesh = meshes.add(Sphere::new(0.35));
    for (index, trigger) in config.triggers.iter().enumerate() {
        let phase = index as f32 * 1.3;
        commands
            .spawn((
                TriggerMarker {
                    ordinal: trigger.ordinal,
                    phase,
                },
                Mesh3d(mesh.clone()),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: GATE_LOCKED,
                    emissive: GATE_LOCKED.to_linear() * 2.0,
                    ..default()
                })),
                Transform::from_translation(trigger.position.with_y(marker_bob(0.0, phase))),
            ))
            .with_children(|marker| {
                marker.spawn((
                    PointLight {
                        color: GATE_LOCKED,
                        intensity: 40_000.0,
                        range: 8.0,
                        ..default()
                    },
                    Transform::default(),
                ));
            });
    }
}

fn animate_markers(
    time: Res<Time>,
    progress: Res<GameProgress>,
    mut markers: Query<(&TriggerMarker, &mut Transform, &mut Visibility)>,
) {
    let t = time.elapsed_secs();
    for (marker, mut transform, mut visibility) in &mut markers {
        let done = progress.is_zone_completed(marker.ordinal);
        let wanted = if done {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        };
        if *visibility != wanted {
            *visibility = wanted;
        }
        if done {
            continue;
        }
        transform.translation.y = marker_bob(t, marker.phase);
        // Pulse the next puzzle in line.
        let next = marker.ordinal == progress.completed_count() + 1;
        let pulse = if next { 1.0 + (t * 4.0).sin() * 0.15 } else { 1.0 };
        transform.scale = Vec3::splat(pulse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flowers_stay_off_the_path() {
        let config = AdventureConfig::default();
        let points = flower_points(&config, FLOWER_SEED);
        assert!(!points.is_empty());
        for p in &points {
            let off_center = (p.x - config.path_center(p.y)).abs();
            assert!(off_center > config.movement.path_half_width);
            assert!(p.x.abs() <= GARDEN_HALF_WIDTH);
            assert!(p.y >= config.world_min_depth && p.y <= config.world_max_depth);
        }
    }

    #[test]
    fn flower_layout_is_reproducible() {
        let config = AdventureConfig::default();
        assert_eq!(flower_points(&config, 3), flower_points(&config, 3));
    }

    #[test]
    fn gates_follow_their_flag() {
        let flags = [true, false, true, false];
        assert!(gate_open(&flags, 0));
        assert!(!gate_open(&flags, 1));
        assert!(gate_open(&flags, 2));
        assert!(!gate_open(&flags, 7));
    }

    #[test]
    fn markers_hover_above_ground() {
        for step in 0..100 {
            let y = marker_bob(step as f32 * 0.1, 0.5);
            assert!((1.0..=1.4).contains(&y));
        }
    }
}
