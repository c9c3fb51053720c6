//! Per-frame player control.
//!
//! ┌──────────────── one tick, in order ────────────────────────┐
//! │  1. facing      ← pointer world x vs body x                 │
//! │  2. reset       moving / crouching, remember last crouch    │
//! │  3. landing     grounded clears jumping                     │
//! │  4. intent      Jump > Crouch > Move(Left|Right) > Idle     │
//! │  5. stance      box + hanging parts, on crouch edges only   │
//! │  6. torso       jump / crouch frame, run clip or idle frame │
//! │  7. aim         head, hand, weapon: frame, pose, rotation   │
//! └─────────────────────────────────────────────────────────────┘
use std::f32::consts::{PI, TAU};

use crate::engine::input::{Direction, InputSource, PointerSource};
use crate::engine::{CameraProjection, Point};
use crate::physics::PhysicsBody;
use crate::player::layout::{ArmPose, Layout, Part, Stance};
use crate::player::Parts;
use crate::sprite::clips::{Heading, RunClip};
use crate::sprite::SpriteHandle;

const JUMP_FRAMES: (u8, u8) = (3, 8);
const CROUCH_FRAMES: (u8, u8) = (9, 10);
const IDLE_FRAMES: (u8, u8) = (0, 1);
const AIM_FRAMES: (u8, u8) = (0, 1);

/// Pick the facing-right or facing-left frame
fn facing_frame(frames: (u8, u8), facing_right: bool) -> u8 {
    if facing_right {
        frames.0
    } else {
        frames.1
    }
}

/// Wrap into [-PI, PI)
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Everything the controller reads from the outside world in one tick,
/// sampled once up front.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct FrameInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// pointer in world space
    pub pointer: Point,
}

impl FrameInput {
    pub fn sample(
        keys: &dyn InputSource,
        pointer: &dyn PointerSource,
        camera: &dyn CameraProjection,
    ) -> Self {
        FrameInput {
            up: keys.is_down(Direction::Up),
            down: keys.is_down(Direction::Down),
            left: keys.is_down(Direction::Left),
            right: keys.is_down(Direction::Right),
            pointer: camera.screen_to_world(pointer.screen_position()),
        }
    }
}

/// What the input asks for this tick; exactly one per tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Intent {
    Jump,
    Crouch,
    Move(Heading),
    Idle,
}

impl Intent {
    /// First match wins :
    /// - jump beats crouch and walking, so a grounded jump is never lost
    ///   to a held direction
    /// - crouch beats walking, there is no crouch-walk
    pub fn resolve(input: &FrameInput, grounded: bool, jumping: bool) -> Self {
        if input.up && !input.down && grounded && !jumping {
            Intent::Jump
        } else if input.down && grounded {
            Intent::Crouch
        } else if input.left && !input.right {
            Intent::Move(Heading::Left)
        } else if input.right && !input.left {
            Intent::Move(Heading::Right)
        } else {
            Intent::Idle
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ControlState {
    pub facing_right: bool,
    pub moving: bool,
    pub jumping: bool,
    pub crouching: bool,
    /// `crouching` as of the previous tick, for edge detection
    pub was_crouching: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        ControlState {
            facing_right: true,
            moving: false,
            jumping: false,
            crouching: false,
            was_crouching: false,
        }
    }
}

impl ControlState {
    /// Steps 1-4 : consumes last tick's state and returns this tick's,
    /// together with the intent that produced it.
    pub fn advance(self, anchor_x: f32, input: &FrameInput, grounded: bool) -> (Self, Intent) {
        let mut next = ControlState {
            facing_right: input.pointer.x > anchor_x,
            moving: false,
            jumping: self.jumping,
            crouching: false,
            was_crouching: self.crouching,
        };

        if grounded && next.jumping {
            next.jumping = false;
        }

        let intent = Intent::resolve(input, grounded, next.jumping);
        match intent {
            Intent::Jump => next.jumping = true,
            Intent::Crouch => next.crouching = true,
            Intent::Move(_) => next.moving = true,
            Intent::Idle => {}
        }
        (next, intent)
    }

    pub fn crouch_changed(&self) -> bool {
        self.crouching != self.was_crouching
    }

    pub fn stance(&self) -> Stance {
        Stance::from_crouching(self.crouching)
    }
}

/// The player control state machine.
///
/// Owns nothing but its own state and tuning; the body and the visual
/// parts are handed in every tick by the [`Player`](crate::player::Player).
#[derive(Debug, Clone)]
pub struct PlayerControls {
    state: ControlState,
    layout: Layout,
    move_speed: f32,
    jump_speed: f32,
}

impl PlayerControls {
    pub fn new(layout: Layout, move_speed: f32, jump_speed: f32) -> Self {
        PlayerControls {
            state: ControlState::default(),
            layout,
            move_speed,
            jump_speed,
        }
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn update<B, S>(&mut self, time: f64, input: &FrameInput, body: &mut B, parts: &mut Parts<S>)
    where
        B: PhysicsBody,
        S: SpriteHandle,
    {
        let anchor = body.position();
        let (state, intent) = self.state.advance(anchor.x, input, body.is_grounded());
        self.state = state;

        self.apply_intent(time, intent, body);
        if state.crouch_changed() {
            self.apply_stance(state.stance(), body, parts);
        }
        Self::animate_torso(&state, intent, &mut parts.torso);
        Self::aim(&state, anchor, input.pointer, parts);
    }

    fn apply_intent<B: PhysicsBody>(&self, time: f64, intent: Intent, body: &mut B) {
        match intent {
            Intent::Jump => {
                body.set_velocity_y(-self.jump_speed);
                log!("Jump triggered at {:.0}ms", time);
            }
            Intent::Crouch => body.set_velocity_x(0.0),
            Intent::Move(Heading::Left) => body.set_velocity_x(-self.move_speed),
            Intent::Move(Heading::Right) => body.set_velocity_x(self.move_speed),
            Intent::Idle => body.set_velocity_x(0.0),
        }
    }

    /// Only runs on a crouch edge. Every value comes from the layout's
    /// stored standing geometry, never from the current one.
    fn apply_stance<B, S>(&self, stance: Stance, body: &mut B, parts: &mut Parts<S>)
    where
        B: PhysicsBody,
        S: SpriteHandle,
    {
        log!("Stance -> {:?}", stance);
        body.set_collision_box(self.layout.collision_box(stance));
        for part in Part::ALL {
            let sprite = parts.hanging_mut(part);
            let x = sprite.position().x;
            sprite.set_position(Point::new(x, self.layout.part_y(part, stance)));
        }
    }

    fn animate_torso<S: SpriteHandle>(state: &ControlState, intent: Intent, torso: &mut S) {
        if state.jumping {
            torso.set_frame(facing_frame(JUMP_FRAMES, state.facing_right));
        } else if state.crouching {
            torso.set_frame(facing_frame(CROUCH_FRAMES, state.facing_right));
        } else if let Intent::Move(heading) = intent {
            torso.play_clip(RunClip::select(heading, state.facing_right).name(), true);
        } else {
            torso.stop_clip();
            torso.set_frame(facing_frame(IDLE_FRAMES, state.facing_right));
        }
    }

    /// Head, hand and weapon all get the same facing frame and the same
    /// angle in one go.
    fn aim<S: SpriteHandle>(state: &ControlState, anchor: Point, pointer: Point, parts: &mut Parts<S>) {
        let facing_right = state.facing_right;
        let frame = facing_frame(AIM_FRAMES, facing_right);
        let pose = ArmPose::for_facing(facing_right);

        let hand_y = parts.hand.position().y;
        parts.hand.set_position(Point::new(pose.hand_x, hand_y));
        parts.hand.set_pivot(pose.hand_pivot);
        let weapon_y = parts.weapon.position().y;
        parts.weapon.set_position(Point::new(pose.weapon_x, weapon_y));
        parts.weapon.set_pivot(pose.weapon_pivot);

        // measured from the head, which has already dropped if crouching
        let origin_y = anchor.y + parts.head.position().y;
        let mut angle = (pointer.y - origin_y).atan2(pointer.x - anchor.x);
        // the arm art points right; aiming left needs the half turn
        if !facing_right {
            angle += PI;
        }
        let angle = wrap_angle(angle);

        for part in Part::ALL {
            let sprite = parts.hanging_mut(part);
            sprite.set_frame(frame);
            sprite.set_rotation(angle);
        }
    }
}
