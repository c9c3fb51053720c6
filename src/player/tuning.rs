use serde::{Deserialize, Serialize};

/// Player tuning, loaded from `player.json` when present.
///
/// Every field falls back to its default, so a file only needs the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Tuning {
    /// px / s
    pub move_speed: f32,
    /// px / s, applied upwards
    pub jump_speed: f32,
    /// px / s^2
    pub gravity: f32,
    pub body_width: f32,
    pub body_height: f32,
    /// added to half the body height for the standing collision box
    pub head_offset: f32,
    /// share of the standing height lost while crouched
    pub crouch_ratio: f32,
    /// run clip playback rate, frames / s
    pub frame_rate: f32,
    pub texture: String,
    pub spawn_x: f32,
    pub spawn_y: f32,
    pub world_width: f32,
    pub world_height: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            move_speed: 300.0,
            jump_speed: 500.0,
            gravity: 1100.0,
            body_width: 100.0,
            body_height: 100.0,
            head_offset: 12.0,
            crouch_ratio: 0.3,
            frame_rate: 9.0,
            texture: "player_body".to_string(),
            spawn_x: 400.0,
            spawn_y: 250.0,
            world_width: 800.0,
            world_height: 600.0,
        }
    }
}

impl Tuning {
    /// Replace every value the player cannot run with by its default,
    /// logging each one.
    pub fn validated(self) -> Self {
        let defaults = Tuning::default();
        Tuning {
            move_speed: finite_or(self.move_speed, defaults.move_speed, "move_speed"),
            jump_speed: finite_or(self.jump_speed, defaults.jump_speed, "jump_speed"),
            gravity: finite_or(self.gravity, defaults.gravity, "gravity"),
            body_width: positive_or(self.body_width, defaults.body_width, "body_width"),
            body_height: positive_or(self.body_height, defaults.body_height, "body_height"),
            head_offset: finite_or(self.head_offset, defaults.head_offset, "head_offset"),
            // 1.0 and up would leave a crouched box with no height
            crouch_ratio: if (0.0..1.0).contains(&self.crouch_ratio) {
                self.crouch_ratio
            } else {
                rejected("crouch_ratio", self.crouch_ratio, defaults.crouch_ratio)
            },
            frame_rate: positive_or(self.frame_rate, defaults.frame_rate, "frame_rate"),
            texture: self.texture,
            spawn_x: finite_or(self.spawn_x, defaults.spawn_x, "spawn_x"),
            spawn_y: finite_or(self.spawn_y, defaults.spawn_y, "spawn_y"),
            world_width: positive_or(self.world_width, defaults.world_width, "world_width"),
            world_height: positive_or(self.world_height, defaults.world_height, "world_height"),
        }
    }
}

fn rejected(field: &str, value: f32, default: f32) -> f32 {
    log!("Warning: tuning {} = {} rejected, using {}", field, value, default);
    default
}

fn finite_or(value: f32, default: f32, field: &str) -> f32 {
    if value.is_finite() {
        value
    } else {
        rejected(field, value, default)
    }
}

fn positive_or(value: f32, default: f32, field: &str) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        rejected(field, value, default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let tuning: Tuning =
            serde_json::from_str(r#"{ "move_speed": 200, "gravity": 800 }"#).unwrap();

        assert_eq!(tuning.move_speed, 200.0);
        assert_eq!(tuning.gravity, 800.0);
        assert_eq!(tuning.jump_speed, 500.0);
        assert_eq!(tuning.head_offset, 12.0);
        assert_eq!(tuning.texture, "player_body");
    }

    #[test]
    fn empty_json_is_default() {
        let tuning: Tuning = serde_json::from_str("{}").unwrap();
        assert_eq!(tuning, Tuning::default());
    }

    #[test]
    fn non_positive_frame_rate_falls_back_to_default() {
        for rate in ["-9", "0"] {
            let json = format!(r#"{{ "frame_rate": {} }}"#, rate);
            let tuning: Tuning = serde_json::from_str(&json).unwrap();
            assert_eq!(tuning.validated().frame_rate, 9.0);
        }

        let tuning = Tuning {
            frame_rate: f32::NAN,
            ..Tuning::default()
        };
        assert_eq!(tuning.validated().frame_rate, 9.0);
    }

    #[test]
    fn crouch_ratio_must_leave_some_height() {
        for ratio in [1.0, 1.5, -0.1, f32::INFINITY] {
            let tuning = Tuning {
                crouch_ratio: ratio,
                ..Tuning::default()
            };
            assert_eq!(tuning.validated().crouch_ratio, 0.3);
        }

        let tuning = Tuning {
            crouch_ratio: 0.0,
            ..Tuning::default()
        };
        assert_eq!(tuning.validated().crouch_ratio, 0.0);
    }

    #[test]
    fn degenerate_body_size_falls_back() {
        let tuning: Tuning =
            serde_json::from_str(r#"{ "body_width": 0, "body_height": -40, "move_speed": 120 }"#)
                .unwrap();
        let tuning = tuning.validated();
        assert_eq!(tuning.body_width, 100.0);
        assert_eq!(tuning.body_height, 100.0);
        assert_eq!(tuning.move_speed, 120.0);
    }

    #[test]
    fn valid_tuning_passes_through_untouched() {
        let tuning = Tuning {
            move_speed: 250.0,
            crouch_ratio: 0.5,
            frame_rate: 12.0,
            ..Tuning::default()
        };
        assert_eq!(tuning.clone().validated(), tuning);
    }
}
