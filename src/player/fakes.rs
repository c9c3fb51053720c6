//! Recording stand-ins for the engine capabilities, for unit tests.
use crate::engine::{Pivot, Point};
use crate::physics::{CollisionBox, PhysicsBody};
use crate::sprite::clips::{AnimationClip, AnimationRegistry};
use crate::sprite::SpriteHandle;

#[derive(Debug, Default, Clone)]
pub struct FakeBody {
    pub position: Point,
    pub velocity: Point,
    pub gravity: f32,
    pub collision_box: CollisionBox,
    pub collide_world_bounds: bool,
    pub grounded: bool,
    pub box_writes: usize,
}

impl FakeBody {
    pub fn at(position: Point) -> Self {
        FakeBody {
            position,
            ..FakeBody::default()
        }
    }
}

impl PhysicsBody for FakeBody {
    fn position(&self) -> Point {
        self.position
    }

    fn velocity(&self) -> Point {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Point) {
        self.velocity = velocity;
    }

    fn set_gravity(&mut self, gravity: f32) {
        self.gravity = gravity;
    }

    fn collision_box(&self) -> CollisionBox {
        self.collision_box
    }

    fn set_collision_box(&mut self, collision_box: CollisionBox) {
        self.box_writes += 1;
        self.collision_box = collision_box;
    }

    fn set_collide_world_bounds(&mut self, collide: bool) {
        self.collide_world_bounds = collide;
    }

    fn is_grounded(&self) -> bool {
        self.grounded
    }
}

#[derive(Debug, Default, Clone)]
pub struct FakeSprite {
    pub frame: u8,
    pub clip: Option<String>,
    pub ignore_if_playing: bool,
    pub stops: usize,
    pub position: Point,
    pub pivot: Option<Pivot>,
    pub rotation: f32,
    pub scale: f32,
}

impl FakeSprite {
    pub fn at(position: Point) -> Self {
        FakeSprite {
            position,
            scale: 1.0,
            ..FakeSprite::default()
        }
    }
}

impl SpriteHandle for FakeSprite {
    fn frame(&self) -> u8 {
        self.frame
    }

    fn set_frame(&mut self, index: u8) {
        self.clip = None;
        self.frame = index;
    }

    fn play_clip(&mut self, name: &str, ignore_if_playing: bool) {
        self.clip = Some(name.to_string());
        self.ignore_if_playing = ignore_if_playing;
    }

    fn stop_clip(&mut self) {
        self.stops += 1;
        self.clip = None;
    }

    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    fn set_pivot(&mut self, pivot: Pivot) {
        self.pivot = Some(pivot);
    }

    fn rotation(&self) -> f32 {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
    }

    fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }
}

#[derive(Debug, Default)]
pub struct FakeRegistry {
    pub declared: Vec<AnimationClip>,
}

impl AnimationRegistry for FakeRegistry {
    fn declare_clip(&mut self, clip: AnimationClip) {
        self.declared.push(clip);
    }
}
