//! Display geometry and replay waypoints

use crate::automation::Point;

/// Primary display rectangle in global pointer coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Horizontal offset of the top waypoint, left of the screen center
pub const TOP_WAYPOINT_LEFT_OFFSET: f64 = 100.0;

/// Vertical offset of the top waypoint, below the top edge
pub const TOP_WAYPOINT_TOP_OFFSET: f64 = 25.0;

/// Fixed points the pointer passes through before each replayed click.
///
/// Going through the center and then the top toolbar area makes the meeting
/// window reveal its menu bar before the target is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenWaypoints {
    pub center: Point,
    pub top_center: Point,
}

impl ScreenWaypoints {
    pub fn from_bounds(bounds: &DisplayBounds) -> Self {
        let mid_x = bounds.x + bounds.width / 2.0;
        Self {
            center: Point::new(
                mid_x.round() as i32,
                (bounds.y + bounds.height / 2.0).round() as i32,
            ),
            top_center: Point::new(
                (mid_x - TOP_WAYPOINT_LEFT_OFFSET).round() as i32,
                (bounds.y + TOP_WAYPOINT_TOP_OFFSET).round() as i32,
            ),
        }
    }

    /// Waypoints for a 1920x1080 primary display
    pub fn fallback() -> Self {
        Self {
            center: Point::new(960, 540),
            top_center: Point::new(860, 25),
        }
    }

    pub fn resolve(bounds: Option<DisplayBounds>) -> Self {
        bounds
            .as_ref()
            .map(Self::from_bounds)
            .unwrap_or_else(Self::fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waypoints_match_fallback_for_1080p() {
        let bounds = DisplayBounds {
            x: 0.0,
            y: 0.0,
            width: 1920.0,
            height: 1080.0,
        };
        assert_eq!(ScreenWaypoints::from_bounds(&bounds), ScreenWaypoints::fallback());
    }

    #[test]
    fn test_waypoints_respect_display_origin() {
        let bounds = DisplayBounds {
            x: -1280.0,
            y: 100.0,
            width: 1280.0,
            height: 1023.0,
        };
        let wp = ScreenWaypoints::from_bounds(&bounds);
        assert_eq!(wp.center, Point::new(-640, 612));
        assert_eq!(wp.top_center, Point::new(-740, 125));
    }

    #[test]
    fn test_resolve_without_bounds_uses_fallback() {
        assert_eq!(ScreenWaypoints::resolve(None), ScreenWaypoints::fallback());
    }
}
