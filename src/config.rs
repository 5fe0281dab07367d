// Tuning constants and fixed world layout.
use bevy::prelude::*;
use thiserror::Error;

use crate::progress::ZONE_COUNT;
use crate::puzzles::PuzzleKind;

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        let config = AdventureConfig::default();
        if let Err(err) = config.validate() {
            panic!("invalid adventure config: {err}");
        }
        app.insert_resource(config);
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("gate barrier at depth {depth} requires flag {flag}, but only {count} flags exist", count = ZONE_COUNT)]
    BarrierFlagOutOfRange { depth: f32, flag: usize },

    #[error("gate barriers must be ordered shallow to deep ({previous} then {next})")]
    BarriersOutOfOrder { previous: f32, next: f32 },

    #[error("trigger {index} has ordinal {ordinal}, but {puzzle:?} is zone {expected}")]
    TriggerOrdinalMismatch {
        index: usize,
        ordinal: usize,
        puzzle: PuzzleKind,
        expected: usize,
    },

    #[error("triggers {first} and {second} overlap")]
    TriggersOverlap { first: usize, second: usize },

    #[error("expected {expected} zone thresholds, found {found}")]
    ThresholdCount { expected: usize, found: usize },

    #[error("polar range [{min}, {max}] is empty")]
    PolarRange { min: f32, max: f32 },
}

/// Player movement tuning.
#[derive(Debug, Clone)]
pub struct MovementConfig {
    pub speed: f32,
    pub gravity: f32,
    pub jump_impulse: f32,
    pub ground_y: f32,
    /// Longest frame step fed to the integrator, in seconds.
    pub max_dt: f32,
    pub path_half_width: f32,
    pub path_wobble_amplitude: f32,
    pub path_wobble_frequency: f32,
    /// Fraction of the remaining turn applied per frame.
    pub facing_blend: f32,
}

/// Third-person orbit camera tuning.
#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub distance: f32,
    pub height: f32,
    /// Fraction of the remaining distance closed per frame.
    pub blend: f32,
    pub look_lift: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    pub initial_polar: f32,
    pub sensitivity: f32,
}

#[derive(Debug, Clone)]
pub struct TriggerZone {
    pub position: Vec3,
    pub radius: f32,
    pub puzzle: PuzzleKind,
    /// 1-based zone ordinal; guards completion flag `ordinal - 1`.
    pub ordinal: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct GateBarrier {
    pub depth: f32,
    pub required_flag: usize,
}

#[derive(Resource, Debug, Clone)]
pub struct AdventureConfig {
    pub movement: MovementConfig,
    pub camera: CameraConfig,
    pub spawn: Vec3,
    /// Deepest reachable z (most negative).
    pub world_min_depth: f32,
    /// Shallowest reachable z.
    pub world_max_depth: f32,
    /// Depths where zones 1..=5 begin, shallow to deep.
    pub zone_thresholds: Vec<f32>,
    pub barriers: Vec<GateBarrier>,
    /// How far past a locked barrier the player may still stand.
    pub gate_clearance: f32,
    pub triggers: Vec<TriggerZone>,
    pub pin: String,
}

impl Default for AdventureConfig {
    fn default() -> Self {
        Self {
            movement: MovementConfig {
                speed: 8.0,
                gravity: -20.0,
                jump_impulse: 8.0,
                ground_y: 0.6,
                max_dt: 0.05,
                path_half_width: 2.0,
                path_wobble_amplitude: 1.5,
                path_wobble_frequency: 0.05,
                facing_blend: 0.15,
            },
            camera: CameraConfig {
                distance: 10.0,
                height: 6.0,
                blend: 0.08,
                look_lift: 1.0,
                min_polar: 0.3,
                max_polar: 1.2,
                initial_polar: 0.6,
                sensitivity: 0.003,
            },
            spawn: Vec3::new(0.0, 0.6, 4.0),
            world_min_depth: -158.0,
            world_max_depth: 8.0,
            zone_thresholds: vec![-15.0, -45.0, -75.0, -105.0, -135.0],
            barriers: vec![
                GateBarrier { depth: -45.0, required_flag: 0 },
                GateBarrier { depth: -75.0, required_flag: 1 },
                GateBarrier { depth: -105.0, required_flag: 2 },
                GateBarrier { depth: -135.0, required_flag: 3 },
            ],
            gate_clearance: 2.0,
            triggers: vec![
                TriggerZone {
                    position: Vec3::new(0.0, 0.0, -30.0),
                    radius: 4.0,
                    puzzle: PuzzleKind::Trivia,
                    ordinal: 1,
                },
                TriggerZone {
                    position: Vec3::new(0.0, 0.0, -57.0),
                    radius: 4.0,
                    puzzle: PuzzleKind::Driving,
                    ordinal: 2,
                },
                TriggerZone {
                    position: Vec3::new(3.0, 0.0, -88.0),
                    radius: 4.0,
                    puzzle: PuzzleKind::Memory,
                    ordinal: 3,
                },
                TriggerZone {
                    position: Vec3::new(0.5, 0.0, -120.0),
                    radius: 4.0,
                    puzzle: PuzzleKind::Sorting,
                    ordinal: 4,
                },
            ],
            pin: "1011".to_string(),
        }
    }
}

impl AdventureConfig {
    /// Checks the layout invariants the rest of the game relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for barrier in &self.barriers {
            if barrier.required_flag >= ZONE_COUNT {
                return Err(ConfigError::BarrierFlagOutOfRange {
                    depth: barrier.depth,
                    flag: barrier.required_flag,
                });
            }
        }
        for pair in self.barriers.windows(2) {
            if pair[1].depth >= pair[0].depth {
                return Err(ConfigError::BarriersOutOfOrder {
                    previous: pair[0].depth,
                    next: pair[1].depth,
                });
            }
        }

        for (index, trigger) in self.triggers.iter().enumerate() {
            let expected = trigger.puzzle.ordinal();
            if trigger.ordinal != expected {
                return Err(ConfigError::TriggerOrdinalMismatch {
                    index,
                    ordinal: trigger.ordinal,
                    puzzle: trigger.puzzle,
                    expected,
                });
            }
        }
        // Overlapping activation spheres would make the nearest-trigger
        // choice depend on the tie-break.
        for (first, a) in self.triggers.iter().enumerate() {
            for (offset, b) in self.triggers[first + 1..].iter().enumerate() {
                if a.position.distance(b.position) < a.radius + b.radius {
                    return Err(ConfigError::TriggersOverlap {
                        first,
                        second: first + 1 + offset,
                    });
                }
            }
        }

        if self.zone_thresholds.len() != ZONE_COUNT + 1 {
            return Err(ConfigError::ThresholdCount {
                expected: ZONE_COUNT + 1,
                found: self.zone_thresholds.len(),
            });
        }

        if self.camera.min_polar > self.camera.max_polar {
            return Err(ConfigError::PolarRange {
                min: self.camera.min_polar,
                max: self.camera.max_polar,
            });
        }
        Ok(())
    }

    /// Lateral centre of the garden path at depth `z`.
    pub fn path_center(&self, z: f32) -> f32 {
        (z * self.movement.path_wobble_frequency).sin() * self.movement.path_wobble_amplitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(AdventureConfig::default().validate(), Ok(()));
    }

    #[test]
    fn barrier_flag_out_of_range_is_rejected() {
        let mut config = AdventureConfig::default();
        config.barriers[3].required_flag = ZONE_COUNT;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BarrierFlagOutOfRange { flag: 4, .. })
        ));
    }

    #[test]
    fn unordered_barriers_are_rejected() {
        let mut config = AdventureConfig::default();
        config.barriers.swap(0, 1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BarriersOutOfOrder { .. })
        ));
    }

    #[test]
    fn overlapping_triggers_are_rejected() {
        let mut config = AdventureConfig::default();
        config.triggers[1].position = config.triggers[0].position + Vec3::X;
        assert_eq!(
            config.validate(),
            Err(ConfigError::TriggersOverlap {
                first: 0,
                second: 1
            })
        );
    }

    #[test]
    fn trigger_ordinal_must_match_puzzle() {
        let mut config = AdventureConfig::default();
        config.triggers[2].ordinal = 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TriggerOrdinalMismatch { index: 2, .. })
        ));
    }

    #[test]
    fn path_center_wobbles_around_zero() {
        let config = AdventureConfig::default();
        assert_eq!(config.path_center(0.0), 0.0);
        for i in 0..100 {
            let z = -(i as f32) * 1.7;
            assert!(config.path_center(z).abs() <= 1.5);
        }
    }
}
