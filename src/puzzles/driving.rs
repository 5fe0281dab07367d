// Top-down parking mini-game. Touching anything ends the attempt.
use bevy::prelude::*;

use super::{
    FailReason, LIGHT_PINK, PINK, PuzzleKind, PuzzleSession, Resolution, SUCCESS_GREEN,
    spawn_label, spawn_overlay,
};
use crate::AdventureSet;
use crate::i18n::Locale;
use crate::input::PlayerIntent;
use crate::progress::ActivePuzzle;

const KIND: PuzzleKind = PuzzleKind::Driving;

const LOT: Vec2 = Vec2::new(600.0, 500.0);
const CAR: Vec2 = Vec2::new(32.0, 52.0);
const CAR_START: Vec2 = Vec2::new(540.0, 130.0);
/// Pixels per second.
const CAR_SPEED: f32 = 180.0;
const MAX_STEP: f32 = 0.05;
const PARK_TOLERANCE: Vec2 = Vec2::new(16.0, 20.0);
const SUCCESS_DELAY: f32 = 2.0;

const PARKED_CAR: Vec2 = Vec2::new(42.0, 72.0);
const CONE: Vec2 = Vec2::new(16.0, 16.0);

const PARKED_CARS: [(f32, f32, Color); 11] = [
    (70.0, 30.0, Color::srgb_u8(0x78, 0x88, 0xa0)),
    (170.0, 30.0, Color::srgb_u8(0x6a, 0x9b, 0x78)),
    (270.0, 30.0, Color::srgb_u8(0xa0, 0x78, 0x88)),
    (370.0, 30.0, Color::srgb_u8(0x88, 0x88, 0xa0)),
    (470.0, 30.0, Color::srgb_u8(0x88, 0xa0, 0x78)),
    (70.0, 390.0, Color::srgb_u8(0xa0, 0x90, 0x70)),
    (170.0, 390.0, Color::srgb_u8(0x70, 0x90, 0xa0)),
    (470.0, 390.0, Color::srgb_u8(0x90, 0x78, 0xa0)),
    (130.0, 190.0, Color::srgb_u8(0x7a, 0x70, 0x90)),
    (350.0, 170.0, Color::srgb_u8(0x70, 0x8a, 0x7a)),
    (250.0, 280.0, Color::srgb_u8(0x8a, 0x70, 0x78)),
];

const CONES: [(f32, f32); 10] = [
    (90.0, 150.0),
    (210.0, 140.0),
    (300.0, 180.0),
    (440.0, 160.0),
    (190.0, 260.0),
    (400.0, 280.0),
    (330.0, 330.0),
    (480.0, 250.0),
    (50.0, 300.0),
    (150.0, 340.0),
];

const BAY: LotRect = LotRect::new(268.0, 392.0, 48.0, 76.0);

/// Axis-aligned rectangle in lot pixels, origin top-left, y down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LotRect {
    pub min: Vec2,
    pub size: Vec2,
}

impl LotRect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }

    pub fn overlaps(&self, other: &LotRect) -> bool {
        self.min.x < other.min.x + other.size.x
            && self.min.x + self.size.x > other.min.x
            && self.min.y < other.min.y + other.size.y
            && self.min.y + self.size.y > other.min.y
    }

    fn inside(&self, bounds: Vec2) -> bool {
        self.min.x >= 0.0
            && self.min.y >= 0.0
            && self.min.x + self.size.x <= bounds.x
            && self.min.y + self.size.y <= bounds.y
    }
}

fn obstacles() -> impl Iterator<Item = LotRect> {
    let cars = PARKED_CARS
        .iter()
        .map(|(x, y, _)| LotRect::new(*x, *y, PARKED_CAR.x, PARKED_CAR.y));
    let cones = CONES.iter().map(|(x, y)| LotRect::new(*x, *y, CONE.x, CONE.y));
    cars.chain(cones)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parking {
    Driving,
    Parked,
    Crashed,
}

/// The player's car in the lot.
#[derive(Resource, Debug, Clone)]
pub struct DrivingLot {
    car: Vec2,
    status: Parking,
}

impl Default for DrivingLot {
    fn default() -> Self {
        Self {
            car: CAR_START,
            status: Parking::Driving,
        }
    }
}

impl DrivingLot {
    pub fn car(&self) -> LotRect {
        LotRect {
            min: self.car,
            size: CAR,
        }
    }

    pub fn status(&self) -> Parking {
        self.status
    }

    /// Moves the car along `axes` (x right, y forward/up on screen).
    pub fn drive(&mut self, axes: Vec2, dt: f32) -> Option<Resolution> {
        if self.status != Parking::Driving {
            return None;
        }
        let direction = Vec2::new(axes.x, -axes.y).clamp_length_max(1.0);
        if direction == Vec2::ZERO {
            return None;
        }

        let next = LotRect {
            min: self.car + direction * CAR_SPEED * dt.clamp(0.0, MAX_STEP),
            size: CAR,
        };
        if !next.inside(LOT) || obstacles().any(|obstacle| next.overlaps(&obstacle)) {
            self.status = Parking::Crashed;
            return Some(Resolution::failure(FailReason::Crashed, 0.0));
        }
        self.car = next.min;

        let offset = (next.center() - BAY.center()).abs();
        if offset.x < PARK_TOLERANCE.x && offset.y < PARK_TOLERANCE.y {
            self.status = Parking::Parked;
            return Some(Resolution::success(SUCCESS_DELAY));
        }
        None
    }
}

#[derive(Component)]
struct PlayerCar;

#[derive(Component)]
struct DrivingStatus;

fn px(v: f32) -> Val {
    Val::Px(v)
}

fn start_lot(mut commands: Commands, locale: Res<Locale>) {
    let lot = DrivingLot::default();
    let texts = locale.texts();
    let car = lot.car();
    commands.insert_resource(lot);

    spawn_overlay(&mut commands, KIND).with_children(|parent| {
        spawn_label(parent, texts.driving_title, 30.0, PINK);
        parent.spawn((
            DrivingStatus,
            Text::new(texts.driving_subtitle),
            TextFont {
                font_size: 16.0,
                ..default()
            },
            TextColor(LIGHT_PINK),
        ));

        parent
            .spawn((
                Node {
                    width: px(LOT.x),
                    height: px(LOT.y),
                    border: UiRect::all(px(3.0)),
                    ..default()
                },
                BorderColor::all(PINK),
                BackgroundColor(Color::srgb_u8(0x3a, 0x3a, 0x48)),
            ))
            .with_children(|lot| {
                lot.spawn((
                    Node {
                        position_type: PositionType::Absolute,
                        left: px(BAY.min.x),
                        top: px(BAY.min.y),
                        width: px(BAY.size.x),
                        height: px(BAY.size.y),
                        border: UiRect::all(px(2.0)),
                        ..default()
                    },
                    BorderColor::all(SUCCESS_GREEN),
                    BackgroundColor(SUCCESS_GREEN.with_alpha(0.25)),
                ));
                for (x, y, color) in PARKED_CARS {
                    lot.spawn(block(x, y, PARKED_CAR, color));
                }
                for (x, y) in CONES {
                    lot.spawn(block(x, y, CONE, Color::srgb_u8(0xFF, 0x8C, 0x1A)));
                }
                lot.spawn((
                    PlayerCar,
                    block(car.min.x, car.min.y, car.size, PINK),
                ));
            });
    });
}

fn block(x: f32, y: f32, size: Vec2, color: Color) -> (Node, BackgroundColor) {
    (
        Node {
            position_type: PositionType::Absolute,
            left: px(x),
            top: px(y),
            width: px(size.x),
            height: px(size.y),
            ..default()
        },
        BackgroundColor(color),
    )
}

fn drive_car(
    intent: Res<PlayerIntent>,
    lot: Option<ResMut<DrivingLot>>,
    session: Option<ResMut<PuzzleSession>>,
    time: Res<Time>,
) {
    let (Some(mut lot), Some(mut session)) = (lot, session) else {
        return;
    };
    if let Some(resolution) = lot.drive(intent.move_axes(), time.delta_secs()) {
        info!(status = ?lot.status(), "driving attempt over");
        session.resolve(resolution);
    }
}

fn render_lot(
    lot: Option<Res<DrivingLot>>,
    mut car: Query<&mut Node, With<PlayerCar>>,
    mut status: Query<(&mut Text, &mut TextColor), With<DrivingStatus>>,
    locale: Res<Locale>,
) {
    let Some(lot) = lot else {
        return;
    };
    if !lot.is_changed() {
        return;
    }
    if let Ok(mut node) = car.single_mut() {
        let rect = lot.car();
        node.left = px(rect.min.x);
        node.top = px(rect.min.y);
    }
    if lot.status() == Parking::Parked {
        if let Ok((mut text, mut color)) = status.single_mut() {
            **text = locale.texts().driving_success.to_string();
            color.0 = SUCCESS_GREEN;
        }
    }
}

pub struct DrivingPlugin;

impl Plugin for DrivingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(ActivePuzzle::Open(KIND)), start_lot)
            .add_systems(OnExit(ActivePuzzle::Open(KIND)), |mut commands: Commands| {
                commands.remove_resource::<DrivingLot>();
            })
            .add_systems(
                Update,
                (drive_car, render_lot)
                    .chain()
                    .run_if(in_state(ActivePuzzle::Open(KIND)))
                    .in_set(AdventureSet::Simulate),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzles::PuzzleOutcome;

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn start_position_is_clear() {
        let lot = DrivingLot::default();
        assert!(lot.car().inside(LOT));
        assert!(obstacles().all(|o| !lot.car().overlaps(&o)));
        assert_eq!(obstacles().count(), 21);
    }

    #[test]
    fn idle_car_does_not_move() {
        let mut lot = DrivingLot::default();
        assert_eq!(lot.drive(Vec2::ZERO, FRAME), None);
        assert_eq!(lot.car().min, CAR_START);
    }

    #[test]
    fn hitting_the_lot_edge_crashes() {
        let mut lot = DrivingLot::default();
        let mut result = None;
        for _ in 0..120 {
            result = lot.drive(Vec2::X, FRAME);
            if result.is_some() {
                break;
            }
        }
        assert_eq!(
            result.map(|r| r.outcome),
            Some(PuzzleOutcome::Failure(FailReason::Crashed))
        );
        assert_eq!(lot.status(), Parking::Crashed);
        // Nothing moves after the crash.
        let frozen = lot.car();
        assert_eq!(lot.drive(Vec2::NEG_X, FRAME), None);
        assert_eq!(lot.car(), frozen);
    }

    #[test]
    fn driving_into_a_parked_car_crashes() {
        let mut lot = DrivingLot::default();
        let result = (0..600).find_map(|_| lot.drive(Vec2::NEG_X, FRAME));
        assert_eq!(result, Some(Resolution::failure(FailReason::Crashed, 0.0)));
        // The cone at x = 440..456 is the first thing in the way.
        assert!(lot.car().min.x >= 456.0);
    }

    #[test]
    fn pulling_into_the_bay_parks() {
        let mut lot = DrivingLot {
            car: Vec2::new(276.0, 396.0),
            status: Parking::Driving,
        };
        // Forward on the stick is up the screen; reverse down into the bay.
        let result = (0..30).find_map(|_| lot.drive(Vec2::NEG_Y, FRAME));
        assert_eq!(result, Some(Resolution::success(SUCCESS_DELAY)));
        assert_eq!(lot.status(), Parking::Parked);
    }

    #[test]
    fn diagonal_speed_is_capped() {
        let mut lot = DrivingLot::default();
        lot.drive(Vec2::new(-1.0, -1.0), FRAME);
        let moved = (lot.car().min - CAR_START).length();
        assert!((moved - CAR_SPEED * FRAME).abs() < 1e-3);
    }
}
