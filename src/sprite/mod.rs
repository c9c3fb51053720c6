// ┌──────────────────────────────────────────────────────────────────────────┐
// │                      Code Structure vs Photoshop Concepts                │
// ├────────────────┬──────────────────────┬──────────────────────────────────┤
// │   Code File    │   Code Component     │         Photoshop Equivalent     │
// ├────────────────┼──────────────────────┼──────────────────────────────────┤
// │                │ SpriteHandle trait   │ What a layer can be told to do   │
// │   mod.rs       │ LayerSprite          │ A single layer (torso, head ..)  │
// │                │ SheetGrid            │ Slicing the sheet into frames    │
// ├────────────────┼──────────────────────┼──────────────────────────────────┤
// │   clips.rs     │ AnimationClip        │ Timeline sequences               │
// │                │ ClipTable            │ Shared timeline library          │
// └────────────────┴──────────────────────┴──────────────────────────────────┘
pub mod clips;

use crate::engine::{Pivot, Point, Rect, Size};
use clips::ClipTable;
use std::cell::RefCell;
use std::rc::Rc;

/// A drawable layer of the player, positioned relative to the body.
pub trait SpriteHandle {
    fn frame(&self) -> u8;
    /// Show a single frame; any clip playing on the layer stops.
    fn set_frame(&mut self, index: u8);
    /// Start a named clip. With `ignore_if_playing` a clip that is already
    /// running keeps its current frame instead of restarting.
    fn play_clip(&mut self, name: &str, ignore_if_playing: bool);
    fn stop_clip(&mut self);
    /// Offset from the body anchor (parent-local)
    fn position(&self) -> Point;
    fn set_position(&mut self, position: Point);
    fn set_pivot(&mut self, pivot: Pivot);
    fn rotation(&self) -> f32;
    fn set_rotation(&mut self, rotation: f32);
    fn set_scale(&mut self, scale: f32);
}

#[derive(Debug, Clone, PartialEq)]
struct Playback {
    clip: &'static str,
    step: usize,
    elapsed_ms: f32,
}

/// Layer that plays clips out of a shared [`ClipTable`].
///
/// The table is shared (`Rc<RefCell<_>>`) rather than cloned per layer:
/// clips are declared once, after the layers exist, and every layer sees them.
#[derive(Debug, Clone)]
pub struct LayerSprite {
    clips: Rc<RefCell<ClipTable>>,
    frame: u8,
    position: Point,
    pivot: Pivot,
    rotation: f32,
    scale: f32,
    playback: Option<Playback>,
}

impl LayerSprite {
    pub fn new(clips: Rc<RefCell<ClipTable>>, position: Point) -> Self {
        LayerSprite {
            clips,
            frame: 0,
            position,
            pivot: Pivot::CENTER,
            rotation: 0.0,
            scale: 1.0,
            playback: None,
        }
    }

    pub fn pivot(&self) -> Pivot {
        self.pivot
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn current_clip(&self) -> Option<&'static str> {
        self.playback.as_ref().map(|playback| playback.clip)
    }

    /// Advance the playing clip by `delta_ms`
    pub fn tick(&mut self, delta_ms: f32) {
        let Some(playback) = self.playback.as_mut() else {
            return;
        };
        let Some((frames, duration, looped)) = self
            .clips
            .borrow()
            .get(playback.clip)
            .map(|clip| (clip.frames, clip.frame_duration_ms(), clip.looped))
        else {
            self.playback = None;
            return;
        };
        // a zero, negative or NaN rate would never step
        if !(duration > 0.0 && duration.is_finite()) {
            log!("Warning: clip '{}' has no usable frame rate", playback.clip);
            self.playback = None;
            return;
        }

        playback.elapsed_ms += delta_ms;
        while playback.elapsed_ms >= duration {
            playback.elapsed_ms -= duration;
            playback.step += 1;
            if playback.step >= frames.len() {
                if !looped {
                    self.frame = frames.frame_at(frames.len() - 1);
                    self.playback = None;
                    return;
                }
                playback.step = 0;
            }
        }
        self.frame = frames.frame_at(playback.step);
    }
}

impl SpriteHandle for LayerSprite {
    fn frame(&self) -> u8 {
        self.frame
    }

    fn set_frame(&mut self, index: u8) {
        self.playback = None;
        self.frame = index;
    }

    fn play_clip(&mut self, name: &str, ignore_if_playing: bool) {
        if ignore_if_playing && self.current_clip() == Some(name) {
            return;
        }
        let clips = self.clips.borrow();
        match clips.get(name) {
            Some(clip) => {
                self.frame = clip.frames.frame_at(0);
                self.playback = Some(Playback {
                    clip: clip.name,
                    step: 0,
                    elapsed_ms: 0.0,
                });
            }
            None => log!("Warning: no clip named '{}' declared", name),
        }
    }

    fn stop_clip(&mut self) {
        self.playback = None;
    }

    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    fn set_pivot(&mut self, pivot: Pivot) {
        self.pivot = pivot;
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

/// Fixed-size frames laid out left to right, top to bottom
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SheetGrid {
    pub frame_size: Size,
    pub columns: u16,
}

impl SheetGrid {
    pub fn frame_rect(&self, index: u8) -> Rect {
        let columns = self.columns.max(1);
        let column = u16::from(index) % columns;
        let row = u16::from(index) / columns;
        Rect::new(
            Point::new(
                f32::from(column) * self.frame_size.width,
                f32::from(row) * self.frame_size.height,
            ),
            self.frame_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::clips::{run_clips, AnimationClip, AnimationRegistry, FrameRange};
    use super::*;

    fn layer_with_run_clips() -> LayerSprite {
        let table = Rc::new(RefCell::new(ClipTable::new()));
        for clip in run_clips("player", 10.0) {
            table.borrow_mut().declare_clip(clip);
        }
        LayerSprite::new(table, Point::default())
    }

    #[test]
    fn play_clip_starts_on_first_frame_and_advances() {
        let mut layer = layer_with_run_clips();
        layer.play_clip("run_left", true);
        assert_eq!(layer.frame(), 8);
        assert_eq!(layer.current_clip(), Some("run_left"));

        layer.tick(99.0);
        assert_eq!(layer.frame(), 8);
        layer.tick(1.0);
        assert_eq!(layer.frame(), 7);
        layer.tick(200.0);
        // looped back around : 8 -> 7 -> 6 -> 8
        assert_eq!(layer.frame(), 8);
    }

    #[test]
    fn ignore_if_playing_keeps_progress() {
        let mut layer = layer_with_run_clips();
        layer.play_clip("run_right", true);
        layer.tick(100.0);
        assert_eq!(layer.frame(), 4);

        layer.play_clip("run_right", true);
        assert_eq!(layer.frame(), 4);

        layer.play_clip("run_right", false);
        assert_eq!(layer.frame(), 3);
    }

    #[test]
    fn switching_clips_restarts() {
        let mut layer = layer_with_run_clips();
        layer.play_clip("run_right", true);
        layer.tick(100.0);
        layer.play_clip("run_right_reverse", true);
        assert_eq!(layer.frame(), 5);
        assert_eq!(layer.current_clip(), Some("run_right_reverse"));
    }

    #[test]
    fn set_frame_and_stop_freeze_the_layer() {
        let mut layer = layer_with_run_clips();
        layer.play_clip("run_right", true);
        layer.set_frame(9);
        layer.tick(500.0);
        assert_eq!(layer.frame(), 9);
        assert_eq!(layer.current_clip(), None);

        layer.play_clip("run_right", true);
        layer.tick(100.0);
        layer.stop_clip();
        layer.tick(500.0);
        assert_eq!(layer.frame(), 4);
    }

    #[test]
    fn unknown_clip_is_ignored() {
        let mut layer = layer_with_run_clips();
        layer.set_frame(1);
        layer.play_clip("moonwalk", true);
        assert_eq!(layer.frame(), 1);
        assert_eq!(layer.current_clip(), None);
    }

    #[test]
    fn one_shot_clip_holds_last_frame() {
        let table = Rc::new(RefCell::new(ClipTable::new()));
        table.borrow_mut().declare_clip(AnimationClip {
            name: "draw",
            texture: "player".into(),
            frames: FrameRange::new(0, 2),
            frame_rate: 10.0,
            looped: false,
        });
        let mut layer = LayerSprite::new(table, Point::default());
        layer.play_clip("draw", true);
        layer.tick(1000.0);
        assert_eq!(layer.frame(), 2);
        assert_eq!(layer.current_clip(), None);
    }

    #[test]
    fn clip_without_usable_rate_stops_instead_of_spinning() {
        for frame_rate in [-9.0, 0.0, f32::NAN] {
            let table = Rc::new(RefCell::new(ClipTable::new()));
            for clip in run_clips("player", frame_rate) {
                table.borrow_mut().declare_clip(clip);
            }
            let mut layer = LayerSprite::new(table, Point::default());

            layer.play_clip("run_right", true);
            layer.tick(16.0);

            assert_eq!(layer.frame(), 3);
            assert_eq!(layer.current_clip(), None);
        }
    }

    #[test]
    fn sheet_grid_slices_rows() {
        let grid = SheetGrid {
            frame_size: Size {
                width: 100.0,
                height: 100.0,
            },
            columns: 4,
        };
        assert_eq!(grid.frame_rect(0).position, Point::new(0.0, 0.0));
        assert_eq!(grid.frame_rect(3).position, Point::new(300.0, 0.0));
        assert_eq!(grid.frame_rect(9).position, Point::new(100.0, 200.0));
    }
}
