//! The physical body: the one piece of the player the simulation moves.
//!
//! [`PhysicsBody`] is the capability the player controller drives.
//! [`ArcadeBody`] is the small arcade-style integrator the browser scene
//! plugs in: gravity, velocity and a world-bounds clamp, nothing else.
use crate::engine::{Point, Rect, Size};

/// Axis-aligned collision box, offset from the top-left corner of the
/// body's frame.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct CollisionBox {
    pub width: f32,
    pub height: f32,
    pub offset: Point,
}

pub trait PhysicsBody {
    /// Center of the body's frame in world space
    fn position(&self) -> Point;
    fn velocity(&self) -> Point;
    fn set_velocity(&mut self, velocity: Point);
    fn set_gravity(&mut self, gravity: f32);
    fn collision_box(&self) -> CollisionBox;
    fn set_collision_box(&mut self, collision_box: CollisionBox);
    fn set_collide_world_bounds(&mut self, collide: bool);
    /// Blocked on the down side during the last physics step
    fn is_grounded(&self) -> bool;

    fn set_velocity_x(&mut self, x: f32) {
        let velocity = self.velocity();
        self.set_velocity(Point::new(x, velocity.y));
    }

    fn set_velocity_y(&mut self, y: f32) {
        let velocity = self.velocity();
        self.set_velocity(Point::new(velocity.x, y));
    }
}

#[derive(Debug, Clone)]
pub struct ArcadeBody {
    position: Point,
    velocity: Point,
    // px / s^2, positive is down (top left is origin)
    gravity: f32,
    frame_size: Size,
    collision_box: CollisionBox,
    world_bounds: Rect,
    collide_world_bounds: bool,
    blocked_down: bool,
}

impl ArcadeBody {
    /// A body centered on `position`, with a collision box covering the
    /// whole frame until told otherwise.
    pub fn new(position: Point, frame_size: Size, world_bounds: Rect) -> Self {
        ArcadeBody {
            position,
            velocity: Point::default(),
            gravity: 0.0,
            frame_size,
            collision_box: CollisionBox {
                width: frame_size.width,
                height: frame_size.height,
                offset: Point::default(),
            },
            world_bounds,
            collide_world_bounds: false,
            blocked_down: false,
        }
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Collision box in world space
    pub fn bounds(&self) -> Rect {
        Rect::new(
            Point::new(
                self.position.x - self.frame_size.width * 0.5 + self.collision_box.offset.x,
                self.position.y - self.frame_size.height * 0.5 + self.collision_box.offset.y,
            ),
            Size {
                width: self.collision_box.width,
                height: self.collision_box.height,
            },
        )
    }

    /// ::step per fixed frame
    /// - gravity -> velocity
    /// - velocity -> position
    /// - clamp to world bounds, recording ground contact
    pub fn step(&mut self, delta_ms: f32) {
        let delta = delta_ms / 1000.0;
        self.velocity.y += self.gravity * delta;
        self.position.x += self.velocity.x * delta;
        self.position.y += self.velocity.y * delta;

        self.blocked_down = false;
        if self.collide_world_bounds {
            self.clamp_to_world();
        }
    }

    fn clamp_to_world(&mut self) {
        let bounds = self.bounds();
        let world = self.world_bounds;

        if bounds.x() < world.x() {
            self.position.x += world.x() - bounds.x();
            self.velocity.x = self.velocity.x.max(0.0);
        } else if bounds.right() > world.right() {
            self.position.x -= bounds.right() - world.right();
            self.velocity.x = self.velocity.x.min(0.0);
        }

        if bounds.y() < world.y() {
            self.position.y += world.y() - bounds.y();
            self.velocity.y = self.velocity.y.max(0.0);
        } else if bounds.bottom() >= world.bottom() {
            self.position.y -= bounds.bottom() - world.bottom();
            self.velocity.y = self.velocity.y.min(0.0);
            self.blocked_down = true;
        }
    }
}

impl PhysicsBody for ArcadeBody {
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
        self.collision_box = collision_box;
    }

    fn set_collide_world_bounds(&mut self, collide: bool) {
        self.collide_world_bounds = collide;
    }

    fn is_grounded(&self) -> bool {
        self.blocked_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FRAME: Size = Size {
        width: 100.0,
        height: 100.0,
    };

    fn world() -> Rect {
        Rect::new(
            Point::new(0.0, 0.0),
            Size {
                width: 800.0,
                height: 600.0,
            },
        )
    }

    fn falling_body() -> ArcadeBody {
        let mut body = ArcadeBody::new(Point::new(400.0, 250.0), FRAME, world());
        body.set_gravity(1100.0);
        body.set_collide_world_bounds(true);
        body
    }

    #[test]
    fn bounds_follow_offset_from_frame_corner() {
        let mut body = ArcadeBody::new(Point::new(100.0, 100.0), FRAME, world());
        body.set_collision_box(CollisionBox {
            width: 30.0,
            height: 62.0,
            offset: Point::new(34.8, 12.0),
        });

        let bounds = body.bounds();
        assert_relative_eq!(bounds.x(), 84.8, epsilon = 1e-4);
        assert_relative_eq!(bounds.y(), 62.0, epsilon = 1e-4);
        assert_relative_eq!(bounds.bottom(), 124.0, epsilon = 1e-4);
    }

    #[test]
    fn gravity_accelerates_downwards() {
        let mut body = falling_body();
        body.step(100.0);
        assert_relative_eq!(body.velocity().y, 110.0, epsilon = 1e-3);
        assert_relative_eq!(body.position().y, 261.0, epsilon = 1e-3);
        assert!(!body.is_grounded());
    }

    #[test]
    fn lands_on_world_floor_and_reports_contact() {
        let mut body = falling_body();
        for _ in 0..200 {
            body.step(1000.0 / 60.0);
        }

        assert!(body.is_grounded());
        assert_relative_eq!(body.bounds().bottom(), 600.0, epsilon = 1e-3);
        assert_relative_eq!(body.velocity().y, 0.0);
    }

    #[test]
    fn leaving_the_floor_clears_contact() {
        let mut body = falling_body();
        for _ in 0..200 {
            body.step(1000.0 / 60.0);
        }
        assert!(body.is_grounded());

        body.set_velocity_y(-500.0);
        body.step(1000.0 / 60.0);
        assert!(!body.is_grounded());
        assert!(body.velocity().y < 0.0);
    }

    #[test]
    fn without_world_bounds_body_keeps_falling() {
        let mut body = ArcadeBody::new(Point::new(400.0, 590.0), FRAME, world());
        body.set_gravity(1100.0);
        body.step(100.0);
        assert!(body.position().y > 590.0);
        assert!(!body.is_grounded());
    }

    #[test]
    fn horizontal_clamp_stops_at_walls() {
        let mut body = ArcadeBody::new(Point::new(60.0, 300.0), FRAME, world());
        body.set_collide_world_bounds(true);
        body.set_velocity_x(-300.0);
        body.step(1000.0);

        assert_relative_eq!(body.bounds().x(), 0.0, epsilon = 1e-3);
        assert_relative_eq!(body.velocity().x, 0.0);
    }

    #[test]
    fn axis_setters_keep_other_component() {
        let mut body = ArcadeBody::new(Point::default(), FRAME, world());
        body.set_velocity(Point::new(3.0, 4.0));
        body.set_velocity_x(-300.0);
        assert_eq!(body.velocity(), Point::new(-300.0, 4.0));
        body.set_velocity_y(-500.0);
        assert_eq!(body.velocity(), Point::new(-300.0, -500.0));
    }
}
