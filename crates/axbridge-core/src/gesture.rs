use std::time::Duration;

use serde::Serialize;

use crate::geometry::{Point, Rect};

pub const DEFAULT_LONG_CLICK: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// A device-level gesture in absolute screen coordinates.
///
/// `percent` values are fractions of the element area in `[0, 1]`; `speed`
/// is in pixels per second and `None` lets the platform choose.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Gesture {
    Click {
        at: Point,
    },
    LongClick {
        at: Point,
        #[serde(with = "millis")]
        duration: Duration,
    },
    Drag {
        from: Point,
        to: Point,
        steps: u32,
    },
    PinchOpen {
        area: Rect,
        percent: f32,
        speed: Option<u32>,
    },
    PinchClose {
        area: Rect,
        percent: f32,
        speed: Option<u32>,
    },
    Swipe {
        area: Rect,
        direction: Direction,
        percent: f32,
        speed: Option<u32>,
    },
    Scroll {
        area: Rect,
        direction: Direction,
        percent: f32,
        speed: Option<u32>,
    },
    Fling {
        area: Rect,
        direction: Direction,
        speed: Option<u32>,
    },
}

impl Gesture {
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Click { .. } => "click",
            Gesture::LongClick { .. } => "longClick",
            Gesture::Drag { .. } => "drag",
            Gesture::PinchOpen { .. } => "pinchOpen",
            Gesture::PinchClose { .. } => "pinchClose",
            Gesture::Swipe { .. } => "swipe",
            Gesture::Scroll { .. } => "scroll",
            Gesture::Fling { .. } => "fling",
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse_is_case_insensitive() {
        assert_eq!(Direction::parse("UP"), Some(Direction::Up));
        assert_eq!(Direction::parse("left"), Some(Direction::Left));
        assert_eq!(Direction::parse("sideways"), None);
    }

    #[test]
    fn test_gesture_name() {
        let click = Gesture::Click {
            at: Point::new(1.0, 2.0),
        };
        assert_eq!(click.name(), "click");
        let fling = Gesture::Fling {
            area: Rect::new(0, 0, 10, 10),
            direction: Direction::Down,
            speed: None,
        };
        assert_eq!(fling.name(), "fling");
    }
}
