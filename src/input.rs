// Keyboard, mouse-drag and touch input folded into one per-frame intent.
use std::collections::HashMap;

use bevy::input::mouse::MouseMotion;
use bevy::input::touch::{TouchInput, TouchPhase};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::AdventureSet;
use crate::progress::{Screen, simulation_running};

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerIntent>()
            .add_systems(
                Update,
                (
                    gather_keyboard,
                    gather_mouse_drag,
                    gather_touch,
                    press_virtual_buttons,
                    show_touch_controls.run_if(in_state(Screen::Garden)),
                )
                    .chain()
                    .in_set(AdventureSet::Input),
            )
            .add_systems(
                Update,
                discard_stale_intent
                    .run_if(not(simulation_running))
                    .in_set(AdventureSet::Simulate),
            );
    }
}

/// Radius in pixels a joystick touch can travel before saturating.
const JOYSTICK_RADIUS: f32 = 38.0;

/// Movement, camera and action intent gathered from every input source.
///
/// Movement axes are levels (re-sampled each frame). The camera delta and
/// the two actions are a mailbox: writers accumulate or latch, and the
/// consuming system reads and clears them in the same frame.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct PlayerIntent {
    keyboard: Vec2,
    joystick: Vec2,
    camera_delta: Vec2,
    jump: bool,
    interact: bool,
}

impl PlayerIntent {
    pub fn set_keyboard(&mut self, axes: Vec2) {
        self.keyboard = axes;
    }

    pub fn set_joystick(&mut self, axes: Vec2) {
        self.joystick = axes;
    }

    /// Combined movement intent; x is strafe right, y is forward.
    pub fn move_axes(&self) -> Vec2 {
        self.keyboard + self.joystick
    }

    pub fn add_camera_delta(&mut self, delta: Vec2) {
        self.camera_delta += delta;
    }

    pub fn take_camera_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.camera_delta)
    }

    pub fn press_jump(&mut self) {
        self.jump = true;
    }

    pub fn take_jump(&mut self) -> bool {
        std::mem::take(&mut self.jump)
    }

    pub fn press_interact(&mut self) {
        self.interact = true;
    }

    pub fn take_interact(&mut self) -> bool {
        std::mem::take(&mut self.interact)
    }

    /// Drops everything latched while nothing was consuming it.
    pub fn discard_pending(&mut self) {
        self.camera_delta = Vec2::ZERO;
        self.jump = false;
        self.interact = false;
    }
}

/// Maps a touch offset from its start point onto joystick axes.
pub fn joystick_axes(offset: Vec2) -> Vec2 {
    let clamped = offset.clamp_length_max(JOYSTICK_RADIUS);
    // Screen y grows downward; forward is up.
    Vec2::new(clamped.x, -clamped.y) / JOYSTICK_RADIUS
}

fn gather_keyboard(keyboard: Res<ButtonInput<KeyCode>>, mut intent: ResMut<PlayerIntent>) {
    let held = |codes: [KeyCode; 2]| keyboard.any_pressed(codes);

    let mut axes = Vec2::ZERO;
    if held([KeyCode::KeyW, KeyCode::ArrowUp]) {
        axes.y += 1.0;
    }
    if held([KeyCode::KeyS, KeyCode::ArrowDown]) {
        axes.y -= 1.0;
    }
    if held([KeyCode::KeyD, KeyCode::ArrowRight]) {
        axes.x += 1.0;
    }
    if held([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        axes.x -= 1.0;
    }
    intent.set_keyboard(axes);

    if keyboard.just_pressed(KeyCode::Space) {
        intent.press_jump();
    }
    if keyboard.just_pressed(KeyCode::KeyE) {
        intent.press_interact();
    }
}

const DRAG_BUTTONS: [MouseButton; 2] = [MouseButton::Left, MouseButton::Right];

fn gather_mouse_drag(
    mut dragging: Local<bool>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion: MessageReader<MouseMotion>,
    ui: Query<&Interaction>,
    mut intent: ResMut<PlayerIntent>,
) {
    // Only a press that lands off the UI starts a drag.
    if mouse.any_just_pressed(DRAG_BUTTONS) && !*dragging {
        *dragging = ui.iter().all(|interaction| *interaction == Interaction::None);
    }
    if !mouse.any_pressed(DRAG_BUTTONS) {
        *dragging = false;
    }

    let delta: Vec2 = motion.read().map(|ev| ev.delta).sum();
    if *dragging && delta != Vec2::ZERO {
        intent.add_camera_delta(delta);
    }
}

/// Last seen position of every finger steering the camera.
#[derive(Debug, Default)]
pub struct CameraTouches(HashMap<u64, Vec2>);

impl CameraTouches {
    /// Folds one touch message in and returns the camera movement it carries.
    /// Only fingers that land right of `split` steer the camera.
    pub fn track(&mut self, touch: &TouchInput, split: f32) -> Vec2 {
        match touch.phase {
            TouchPhase::Started => {
                if touch.position.x >= split {
                    self.0.insert(touch.id, touch.position);
                }
                Vec2::ZERO
            }
            TouchPhase::Moved => match self.0.get_mut(&touch.id) {
                Some(last) => {
                    let delta = touch.position - *last;
                    *last = touch.position;
                    delta
                }
                None => Vec2::ZERO,
            },
            TouchPhase::Ended | TouchPhase::Canceled => {
                self.0.remove(&touch.id);
                Vec2::ZERO
            }
        }
    }
}

fn gather_touch(
    mut dragged: Local<CameraTouches>,
    mut moves: MessageReader<TouchInput>,
    touches: Res<Touches>,
    window: Query<&Window, With<PrimaryWindow>>,
    buttons: Query<&Interaction, With<VirtualButton>>,
    mut intent: ResMut<PlayerIntent>,
) {
    let Ok(window) = window.single() else {
        return;
    };
    let split = window.width() / 2.0;

    let mut camera = Vec2::ZERO;
    for touch in moves.read() {
        camera += dragged.track(touch, split);
    }
    // A finger resting on a virtual button is not a camera drag.
    let on_button = buttons.iter().any(|i| *i == Interaction::Pressed);
    if !on_button && camera != Vec2::ZERO {
        intent.add_camera_delta(camera);
    }

    let mut joystick = Vec2::ZERO;
    for touch in touches.iter() {
        if touch.start_position().x < split {
            joystick = joystick_axes(touch.position() - touch.start_position());
        }
    }
    intent.set_joystick(joystick);
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
enum VirtualButton {
    Jump,
    Interact,
}

fn press_virtual_buttons(
    buttons: Query<(&Interaction, &VirtualButton), Changed<Interaction>>,
    mut intent: ResMut<PlayerIntent>,
) {
    for (interaction, button) in &buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match button {
            VirtualButton::Jump => intent.press_jump(),
            VirtualButton::Interact => intent.press_interact(),
        }
    }
}

/// Spawns the on-screen action buttons after the first touch.
fn show_touch_controls(
    mut commands: Commands,
    touches: Res<Touches>,
    existing: Query<(), With<VirtualButton>>,
) {
    if !existing.is_empty() || touches.iter().next().is_none() {
        return;
    }

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                right: Val::Px(24.0),
                bottom: Val::Px(80.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(16.0),
                ..default()
            },
            DespawnOnExit(Screen::Garden),
        ))
        .with_children(|parent| {
            spawn_virtual_button(parent, "E", VirtualButton::Interact);
            spawn_virtual_button(parent, "^", VirtualButton::Jump);
        });
}

fn spawn_virtual_button(parent: &mut ChildSpawnerCommands, label: &str, marker: VirtualButton) {
    parent
        .spawn((
            marker,
            Button,
            Node {
                width: Val::Px(64.0),
                height: Val::Px(64.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BorderColor::all(Color::srgba(1.0, 0.42, 0.62, 0.4)),
            BackgroundColor(Color::srgba(1.0, 0.42, 0.62, 0.15)),
        ))
        .with_children(|btn| {
            btn.spawn((
                Text::new(label),
                TextFont {
                    font_size: 26.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

fn discard_stale_intent(mut intent: ResMut<PlayerIntent>) {
    intent.discard_pending();
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::message::Messages;

    #[test]
    fn keyboard_and_joystick_add_up() {
        let mut intent = PlayerIntent::default();
        intent.set_keyboard(Vec2::new(0.0, 1.0));
        intent.set_joystick(Vec2::new(0.5, 0.25));
        assert_eq!(intent.move_axes(), Vec2::new(0.5, 1.25));
    }

    #[test]
    fn camera_delta_coalesces_and_is_consumed_once() {
        let mut intent = PlayerIntent::default();
        intent.add_camera_delta(Vec2::new(3.0, -1.0));
        intent.add_camera_delta(Vec2::new(2.0, 4.0));

        assert_eq!(intent.take_camera_delta(), Vec2::new(5.0, 3.0));
        assert_eq!(intent.take_camera_delta(), Vec2::ZERO);
    }

    #[test]
    fn actions_fire_at_most_once_per_press() {
        let mut intent = PlayerIntent::default();
        intent.press_jump();
        intent.press_jump();
        intent.press_interact();

        assert!(intent.take_jump());
        assert!(!intent.take_jump());
        assert!(intent.take_interact());
        assert!(!intent.take_interact());
    }

    #[test]
    fn discard_keeps_levels_but_drops_mailbox() {
        let mut intent = PlayerIntent::default();
        intent.set_keyboard(Vec2::Y);
        intent.add_camera_delta(Vec2::ONE);
        intent.press_interact();

        intent.discard_pending();

        assert_eq!(intent.move_axes(), Vec2::Y);
        assert_eq!(intent.take_camera_delta(), Vec2::ZERO);
        assert!(!intent.take_interact());
    }

    #[test]
    fn joystick_saturates_and_flips_screen_y() {
        assert_eq!(joystick_axes(Vec2::ZERO), Vec2::ZERO);
        let up = joystick_axes(Vec2::new(0.0, -200.0));
        assert!((up - Vec2::Y).length() < 1e-5);
        let half_right = joystick_axes(Vec2::new(JOYSTICK_RADIUS / 2.0, 0.0));
        assert!((half_right - Vec2::new(0.5, 0.0)).length() < 1e-5);
    }

    fn touch(phase: TouchPhase, x: f32, y: f32, id: u64) -> TouchInput {
        TouchInput {
            phase,
            position: Vec2::new(x, y),
            window: Entity::PLACEHOLDER,
            force: None,
            id,
        }
    }

    fn touch_world() -> World {
        let mut world = World::new();
        world.init_resource::<PlayerIntent>();
        world.init_resource::<Touches>();
        world.init_resource::<Messages<TouchInput>>();
        // Default resolution is 1280 wide, so the camera half starts at 640.
        world.spawn((Window::default(), PrimaryWindow));
        world
    }

    fn take_camera(world: &mut World) -> Vec2 {
        world.resource_mut::<PlayerIntent>().take_camera_delta()
    }

    #[test]
    fn resting_finger_stops_the_camera() {
        let mut world = touch_world();
        let gather = world.register_system(gather_touch);

        world.write_message(touch(TouchPhase::Started, 800.0, 100.0, 1));
        world.write_message(touch(TouchPhase::Moved, 820.0, 100.0, 1));
        world.run_system(gather).unwrap();
        assert_eq!(take_camera(&mut world), Vec2::new(20.0, 0.0));

        // Finger still down, no new movement.
        for _ in 0..5 {
            world.run_system(gather).unwrap();
            assert_eq!(take_camera(&mut world), Vec2::ZERO);
        }

        world.write_message(touch(TouchPhase::Moved, 830.0, 95.0, 1));
        world.run_system(gather).unwrap();
        assert_eq!(take_camera(&mut world), Vec2::new(10.0, -5.0));
    }

    #[test]
    fn joystick_half_fingers_never_turn_the_camera() {
        let mut world = touch_world();
        let gather = world.register_system(gather_touch);

        world.write_message(touch(TouchPhase::Started, 100.0, 400.0, 7));
        world.write_message(touch(TouchPhase::Moved, 900.0, 380.0, 7));
        world.run_system(gather).unwrap();
        assert_eq!(take_camera(&mut world), Vec2::ZERO);
    }

    #[test]
    fn lifted_finger_is_forgotten() {
        let mut dragged = CameraTouches::default();
        dragged.track(&touch(TouchPhase::Started, 700.0, 10.0, 3), 640.0);
        assert_eq!(
            dragged.track(&touch(TouchPhase::Moved, 705.0, 10.0, 3), 640.0),
            Vec2::new(5.0, 0.0)
        );
        dragged.track(&touch(TouchPhase::Ended, 705.0, 10.0, 3), 640.0);
        assert_eq!(
            dragged.track(&touch(TouchPhase::Moved, 750.0, 10.0, 3), 640.0),
            Vec2::ZERO
        );
    }

    #[test]
    fn drag_must_start_off_the_ui() {
        let mut world = World::new();
        world.init_resource::<PlayerIntent>();
        world.init_resource::<ButtonInput<MouseButton>>();
        world.init_resource::<Messages<MouseMotion>>();
        let hud_button = world.spawn(Interaction::Pressed).id();
        let gather = world.register_system(gather_mouse_drag);

        // Press lands on a button.
        world
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
        world.write_message(MouseMotion {
            delta: Vec2::new(5.0, 0.0),
        });
        world.run_system(gather).unwrap();
        assert_eq!(take_camera(&mut world), Vec2::ZERO);

        // Sliding off the button with the same press still doesn't drag.
        world.entity_mut(hud_button).insert(Interaction::None);
        world.resource_mut::<ButtonInput<MouseButton>>().clear();
        world.write_message(MouseMotion {
            delta: Vec2::new(5.0, 0.0),
        });
        world.run_system(gather).unwrap();
        assert_eq!(take_camera(&mut world), Vec2::ZERO);

        // Release, then press on the scene.
        {
            let mut mouse = world.resource_mut::<ButtonInput<MouseButton>>();
            mouse.release(MouseButton::Left);
            mouse.clear();
        }
        world.run_system(gather).unwrap();
        world
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
        world.write_message(MouseMotion {
            delta: Vec2::new(3.0, 4.0),
        });
        world.run_system(gather).unwrap();
        assert_eq!(take_camera(&mut world), Vec2::new(3.0, 4.0));
    }
}
