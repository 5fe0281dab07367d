// Main
mod camera;
mod config;
mod garden;
mod hud;
mod i18n;
mod input;
mod menu;
mod overlays;
mod player;
mod prize;
mod progress;
mod puzzles;
mod triggers;
mod zones;

use bevy::prelude::*;
use camera::CameraPlugin;
use config::ConfigPlugin;
use garden::GardenPlugin;
use hud::HudPlugin;
use i18n::Locale;
use input::InputPlugin;
use menu::MenuPlugin;
use overlays::OverlaysPlugin;
use player::PlayerPlugin;
use prize::PrizePlugin;
use progress::ProgressPlugin;
use puzzles::PuzzlesPlugin;
use triggers::TriggersPlugin;
use zones::ZonesPlugin;

/// Per-frame ordering of the gameplay systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum AdventureSet {
    /// Fold device input into `PlayerIntent`.
    Input,
    Orbit,
    /// Avatar kinematics and the open puzzle's own logic.
    Simulate,
    /// Zone, trigger and puzzle-outcome bookkeeping against the store.
    Resolve,
    Present,
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Garden Adventure".into(),
                fit_canvas_to_parent: true,
                ..default()
            }),
            ..default()
        }))
        .init_resource::<Locale>()
        .configure_sets(
            Update,
            (
                AdventureSet::Input,
                AdventureSet::Orbit,
                AdventureSet::Simulate,
                AdventureSet::Resolve,
                AdventureSet::Present,
            )
                .chain(),
        )
        .add_plugins((
            ConfigPlugin,
            ProgressPlugin,
            InputPlugin,
            CameraPlugin,
            PlayerPlugin,
            ZonesPlugin,
            TriggersPlugin,
            PuzzlesPlugin,
            GardenPlugin,
            MenuPlugin,
            HudPlugin,
            OverlaysPlugin,
            PrizePlugin,
        ))
        .run();
}
