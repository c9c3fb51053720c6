//! Named motion cycles for the torso sheet.
//!
//! The sheet has no horizontal-flip mirroring. Running "backwards" (moving
//! away from where the player aims) has its own frame ranges, so picking a
//! run clip takes both the heading and the facing into account.
use std::collections::HashMap;

/// Inclusive frame range; `start > end` plays the frames in descending order
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameRange {
    pub start: u8,
    pub end: u8,
}

impl FrameRange {
    pub const fn new(start: u8, end: u8) -> Self {
        FrameRange { start, end }
    }

    pub fn len(&self) -> usize {
        usize::from(self.start.abs_diff(self.end)) + 1
    }

    /// Frame shown at `step` steps into the range, wrapping around
    pub fn frame_at(&self, step: usize) -> u8 {
        // step % len() < len() <= 256, so the cast is lossless
        let step = (step % self.len()) as u8;
        if self.start <= self.end {
            self.start + step
        } else {
            self.start - step
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: &'static str,
    pub texture: String,
    pub frames: FrameRange,
    pub frame_rate: f32,
    /// repeat forever once the last frame is reached
    pub looped: bool,
}

impl AnimationClip {
    pub fn frame_duration_ms(&self) -> f32 {
        1000.0 / self.frame_rate
    }
}

pub trait AnimationRegistry {
    fn declare_clip(&mut self, clip: AnimationClip);
}

/// Clips keyed by name, shared by every sprite that plays them
#[derive(Debug, Default)]
pub struct ClipTable {
    clips: HashMap<&'static str, AnimationClip>,
}

impl ClipTable {
    pub fn new() -> Self {
        ClipTable::default()
    }

    pub fn get(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.get(name)
    }

}

impl AnimationRegistry for ClipTable {
    fn declare_clip(&mut self, clip: AnimationClip) {
        if self.clips.contains_key(clip.name) {
            log!("ClipTable: '{}' declared twice, keeping the latest", clip.name);
        }
        self.clips.insert(clip.name, clip);
    }
}

/// Horizontal direction of travel
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Heading {
    Left,
    Right,
}

/// ┌──────────── heading × facing → clip ────────────┐
/// │  heading  facing  →  clip                        │
/// ├──────────────────────────────────────────────────┤
/// │  Right    right   →  run_right          3 → 5    │
/// │  Left     left    →  run_left           8 → 6    │
/// │  Left     right   →  run_right_reverse  5 → 3    │
/// │  Right    left    →  run_left_reverse   6 → 8    │
/// └──────────────────────────────────────────────────┘
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunClip {
    Right,
    Left,
    RightReverse,
    LeftReverse,
}

impl RunClip {
    pub const ALL: [RunClip; 4] = [
        RunClip::Right,
        RunClip::Left,
        RunClip::RightReverse,
        RunClip::LeftReverse,
    ];

    pub fn select(heading: Heading, facing_right: bool) -> Self {
        match (heading, facing_right) {
            (Heading::Right, true) => RunClip::Right,
            (Heading::Left, false) => RunClip::Left,
            (Heading::Left, true) => RunClip::RightReverse,
            (Heading::Right, false) => RunClip::LeftReverse,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            RunClip::Right => "run_right",
            RunClip::Left => "run_left",
            RunClip::RightReverse => "run_right_reverse",
            RunClip::LeftReverse => "run_left_reverse",
        }
    }

    pub const fn frames(self) -> FrameRange {
        match self {
            RunClip::Right => FrameRange::new(3, 5),
            RunClip::Left => FrameRange::new(8, 6),
            RunClip::RightReverse => FrameRange::new(5, 3),
            RunClip::LeftReverse => FrameRange::new(6, 8),
        }
    }

    pub fn clip(self, texture: &str, frame_rate: f32) -> AnimationClip {
        AnimationClip {
            name: self.name(),
            texture: texture.to_string(),
            frames: self.frames(),
            frame_rate,
            looped: true,
        }
    }
}

/// The four run clips of a torso texture
pub fn run_clips(texture: &str, frame_rate: f32) -> [AnimationClip; 4] {
    RunClip::ALL.map(|run| run.clip(texture, frame_rate))
}
