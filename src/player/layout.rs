//! Where everything sits relative to the body anchor.
//!
//! All numbers here are hand-tuned against the player art, not derived from
//! it. Changing the sprites means re-tuning them.
use crate::engine::{Pivot, Point, Size};
use crate::physics::CollisionBox;

const BOX_WIDTH_RATIO: f32 = 0.3;
const BOX_HEIGHT_RATIO: f32 = 0.5;
const BOX_OFFSET_X_RATIO: f32 = 2.9;

pub const HEAD_POSITION: Point = Point::new(0.0, -27.0);
pub const HAND_POSITION: Point = Point::new(-8.0, -20.0);
pub const WEAPON_POSITION: Point = Point::new(8.0, -20.0);

pub const PART_SCALE: f32 = 0.5;
pub const TORSO_PIVOT: Pivot = Pivot::CENTER;
pub const HEAD_PIVOT: Pivot = Pivot::new(0.5, 0.8);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stance {
    Standing,
    Crouching,
}

impl Stance {
    pub fn from_crouching(crouching: bool) -> Self {
        if crouching {
            Stance::Crouching
        } else {
            Stance::Standing
        }
    }
}

/// The parts that hang off the body anchor and drop when crouching
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Part {
    Head,
    Hand,
    Weapon,
}

impl Part {
    pub const ALL: [Part; 3] = [Part::Head, Part::Hand, Part::Weapon];
}

/// Hand and weapon placement for one facing.
///
/// The arm art is not symmetric, so facing left is its own hand-authored
/// pose rather than the right pose negated.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ArmPose {
    pub hand_x: f32,
    pub hand_pivot: Pivot,
    pub weapon_x: f32,
    pub weapon_pivot: Pivot,
}

pub const FACING_RIGHT_POSE: ArmPose = ArmPose {
    hand_x: -8.0,
    hand_pivot: Pivot::new(0.2, 0.2),
    weapon_x: -10.0,
    weapon_pivot: Pivot::new(-1.5, -0.8),
};

pub const FACING_LEFT_POSE: ArmPose = ArmPose {
    hand_x: 7.0,
    hand_pivot: Pivot::new(0.8, 0.2),
    weapon_x: 9.0,
    weapon_pivot: Pivot::new(2.5, -0.8),
};

impl ArmPose {
    pub fn for_facing(facing_right: bool) -> &'static ArmPose {
        if facing_right {
            &FACING_RIGHT_POSE
        } else {
            &FACING_LEFT_POSE
        }
    }
}

/// Geometry for both stances, computed once at spawn.
///
/// Crouched values are always derived from the stored standing values, so
/// any number of crouch/stand cycles lands on the exact same numbers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Layout {
    standing_box: CollisionBox,
    crouch_drop: f32,
}

impl Layout {
    pub fn new(body: Size, head_offset: f32, crouch_ratio: f32) -> Self {
        let standing_box = CollisionBox {
            width: body.width * BOX_WIDTH_RATIO,
            height: body.height * BOX_HEIGHT_RATIO + head_offset,
            offset: Point::new(BOX_OFFSET_X_RATIO * head_offset, head_offset),
        };
        Layout {
            standing_box,
            crouch_drop: standing_box.height * crouch_ratio,
        }
    }

    /// How far the box top and the hanging parts drop when crouching
    pub fn crouch_drop(&self) -> f32 {
        self.crouch_drop
    }

    pub fn collision_box(&self, stance: Stance) -> CollisionBox {
        match stance {
            Stance::Standing => self.standing_box,
            Stance::Crouching => CollisionBox {
                width: self.standing_box.width,
                height: self.standing_box.height - self.crouch_drop,
                offset: Point::new(
                    self.standing_box.offset.x,
                    self.standing_box.offset.y + self.crouch_drop,
                ),
            },
        }
    }

    pub fn rest_position(&self, part: Part) -> Point {
        match part {
            Part::Head => HEAD_POSITION,
            Part::Hand => HAND_POSITION,
            Part::Weapon => WEAPON_POSITION,
        }
    }

    pub fn part_y(&self, part: Part, stance: Stance) -> f32 {
        let rest = self.rest_position(part).y;
        match stance {
            Stance::Standing => rest,
            Stance::Crouching => rest + self.crouch_drop,
        }
    }
}
