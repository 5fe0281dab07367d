// Zone index tracking and gate limits along the garden path.
use bevy::prelude::*;

use crate::AdventureSet;
use crate::config::{AdventureConfig, GateBarrier};
use crate::player::Player;
use crate::progress::{GameProgress, ZONE_COUNT, simulation_running};

pub struct ZonesPlugin;

impl Plugin for ZonesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            track_zone
                .run_if(simulation_running)
                .in_set(AdventureSet::Resolve),
        );
    }
}

/// Zone index for depth `z`: the number of thresholds the player is past.
pub fn zone_for_depth(z: f32, thresholds: &[f32]) -> usize {
    thresholds.iter().take_while(|threshold| z < **threshold).count()
}

/// Deepest z the player may reach with the given completion flags.
///
/// Barriers are scanned shallow to deep; the first one whose flag is still
/// unset holds the player `clearance` units short of it.
pub fn max_allowed_depth(
    barriers: &[GateBarrier],
    flags: &[bool; ZONE_COUNT],
    world_min_depth: f32,
    clearance: f32,
) -> f32 {
    barriers
        .iter()
        .find(|barrier| !flags[barrier.required_flag])
        .map_or(world_min_depth, |barrier| {
            (barrier.depth + clearance).max(world_min_depth)
        })
}

impl AdventureConfig {
    pub fn max_allowed_depth(&self, flags: &[bool; ZONE_COUNT]) -> f32 {
        max_allowed_depth(
            &self.barriers,
            flags,
            self.world_min_depth,
            self.gate_clearance,
        )
    }
}

fn track_zone(
    player: Query<&Transform, With<Player>>,
    config: Res<AdventureConfig>,
    mut progress: ResMut<GameProgress>,
) {
    if progress.game_won {
        return;
    }
    let Ok(transform) = player.single() else {
        return;
    };
    let zone = zone_for_depth(transform.translation.z, &config.zone_thresholds);
    // Only touch the store on change so its change tick stays meaningful.
    if progress.current_zone != zone {
        progress.set_zone(zone);
    }
}
