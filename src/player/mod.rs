//! The player aggregate.
//!
//! ┌──────────────────────── Player ─────────────────────────┐
//! │                                                          │
//! │   body (PhysicsBody) ── position ──► Player::position    │
//! │        ▲                    │                            │
//! │        │ velocity, box      │ anchor (read only)         │
//! │        │                    ▼                            │
//! │   PlayerControls ──────► Parts: torso / head / hand /    │
//! │        ▲                        weapon (SpriteHandle)    │
//! │        │                                                 │
//! │   Senses: keys, pointer, camera (sampled once per tick)  │
//! └──────────────────────────────────────────────────────────┘
pub mod controls;
pub mod layout;
pub mod tuning;

#[cfg(test)]
mod fakes;

use crate::engine::input::{InputSource, PointerSource};
use crate::engine::{CameraProjection, Point, Size};
use crate::physics::PhysicsBody;
use crate::sprite::clips::{run_clips, AnimationClip, AnimationRegistry};
use crate::sprite::SpriteHandle;
use controls::{ControlState, FrameInput, PlayerControls};
use layout::{Layout, Part, Stance, HEAD_PIVOT, PART_SCALE, TORSO_PIVOT};
use tuning::Tuning;

/// The four visual layers, drawn in declaration order
#[derive(Debug, Clone)]
pub struct Parts<S> {
    pub torso: S,
    pub head: S,
    pub hand: S,
    pub weapon: S,
}

impl<S> Parts<S> {
    pub fn hanging(&self, part: Part) -> &S {
        match part {
            Part::Head => &self.head,
            Part::Hand => &self.hand,
            Part::Weapon => &self.weapon,
        }
    }

    pub fn hanging_mut(&mut self, part: Part) -> &mut S {
        match part {
            Part::Head => &mut self.head,
            Part::Hand => &mut self.hand,
            Part::Weapon => &mut self.weapon,
        }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut S> {
        [
            &mut self.torso,
            &mut self.head,
            &mut self.hand,
            &mut self.weapon,
        ]
        .into_iter()
    }
}

/// Where the player looks for input each tick
pub struct Senses<'a> {
    pub keys: &'a dyn InputSource,
    pub pointer: &'a dyn PointerSource,
    pub camera: &'a dyn CameraProjection,
}

pub struct Player<B, S> {
    body: B,
    parts: Parts<S>,
    controls: PlayerControls,
    clips: [AnimationClip; 4],
    position: Point,
}

impl<B, S> Player<B, S>
where
    B: PhysicsBody,
    S: SpriteHandle,
{
    /// Spawn : lay out body and parts in the standing stance, and declare
    /// the run clips with `registry`.
    pub fn new(
        mut body: B,
        mut parts: Parts<S>,
        registry: &mut impl AnimationRegistry,
        tuning: &Tuning,
    ) -> Self {
        let layout = Layout::new(
            Size {
                width: tuning.body_width,
                height: tuning.body_height,
            },
            tuning.head_offset,
            tuning.crouch_ratio,
        );

        body.set_gravity(tuning.gravity);
        body.set_collide_world_bounds(true);
        body.set_collision_box(layout.collision_box(Stance::Standing));

        for sprite in parts.iter_mut() {
            sprite.set_scale(PART_SCALE);
        }
        parts.torso.set_position(Point::default());
        parts.torso.set_pivot(TORSO_PIVOT);
        parts.torso.set_frame(0);
        parts.head.set_pivot(HEAD_PIVOT);
        for part in Part::ALL {
            parts.hanging_mut(part).set_position(layout.rest_position(part));
        }

        let clips = run_clips(&tuning.texture, tuning.frame_rate);
        for clip in &clips {
            registry.declare_clip(clip.clone());
        }

        let position = body.position();
        Player {
            body,
            parts,
            controls: PlayerControls::new(layout, tuning.move_speed, tuning.jump_speed),
            clips,
            position,
        }
    }

    /// One frame : the body is the source of truth for where the player is,
    /// so its position is copied over first, then the controls run.
    pub fn update(&mut self, time: f64, senses: &Senses) {
        self.position = self.body.position();
        let input = FrameInput::sample(senses.keys, senses.pointer, senses.camera);
        self.controls
            .update(time, &input, &mut self.body, &mut self.parts);
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn state(&self) -> ControlState {
        self.controls.state()
    }

    pub fn layout(&self) -> &Layout {
        self.controls.layout()
    }

    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    pub fn parts(&self) -> &Parts<S> {
        &self.parts
    }

    pub fn parts_mut(&mut self) -> &mut Parts<S> {
        &mut self.parts
    }
}
