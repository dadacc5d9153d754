//! Resize drag geometry.
//!
//! A drag starts on one of eight handles around the focused element. While
//! it moves, the proposed size is clamped to the parent's content box and a
//! minimum size; when it ends, dimensions are converted to parent-relative
//! percentages where they land close to a round value.

use kurbo::{Point, Size};
use ve_core::SnapConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl ResizeHandle {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "n" => Some(Self::N),
            "s" => Some(Self::S),
            "e" => Some(Self::E),
            "w" => Some(Self::W),
            "ne" => Some(Self::NE),
            "nw" => Some(Self::NW),
            "se" => Some(Self::SE),
            "sw" => Some(Self::SW),
            _ => None,
        }
    }

    fn east(self) -> bool {
        matches!(self, Self::E | Self::NE | Self::SE)
    }

    fn west(self) -> bool {
        matches!(self, Self::W | Self::NW | Self::SW)
    }

    fn north(self) -> bool {
        matches!(self, Self::N | Self::NE | Self::NW)
    }

    fn south(self) -> bool {
        matches!(self, Self::S | Self::SE | Self::SW)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    pub handle: ResizeHandle,
    pub start: Point,
    pub start_size: Size,
    /// The element carried a `max-width` before the drag.
    pub max_width_constrained: bool,
    pub max_height_constrained: bool,
}

impl ResizeSession {
    /// Size for the current pointer position.
    ///
    /// Growth is capped by `parent_content` along each axis, unless the
    /// element already overflowed it when the drag began.
    pub fn propose(&self, pointer: Point, parent_content: Option<Size>, min: f64) -> Size {
        let delta = pointer - self.start;
        let mut width = self.start_size.width;
        let mut height = self.start_size.height;

        if self.handle.east() {
            width += delta.x;
        }
        if self.handle.west() {
            width -= delta.x;
        }
        if self.handle.south() {
            height += delta.y;
        }
        if self.handle.north() {
            height -= delta.y;
        }

        if let Some(limit) = parent_content {
            if self.start_size.width <= limit.width {
                width = width.min(limit.width);
            }
            if self.start_size.height <= limit.height {
                height = height.min(limit.height);
            }
        }
        Size::new(width.max(min), height.max(min))
    }
}

/// Whether a computed `max-width`/`max-height` value is a real constraint.
pub fn is_constraint(value: &str) -> bool {
    !matches!(value.trim(), "" | "none" | "initial")
}

/// CSS values for the final width and height.
///
/// Width snaps to a one-decimal percentage when it is within
/// `integer_tolerance` of a whole percent or within `breakpoint_tolerance`
/// of a width breakpoint. Height snaps to a whole percentage only when it is
/// that close to one of the height breakpoints. Everything else stays in
/// rounded pixels.
pub fn finalize_dimensions(size: Size, parent_content: Option<Size>, snap: &SnapConfig) -> (String, String) {
    let mut width = format!("{}px", size.width.round());
    let mut height = format!("{}px", size.height.round());

    let Some(parent) = parent_content else {
        return (width, height);
    };

    if parent.width > 0.0 {
        let pct = size.width / parent.width * 100.0;
        let near_whole = (pct - pct.round()).abs() < snap.integer_tolerance;
        let near_breakpoint = snap
            .width_breakpoints
            .iter()
            .any(|bp| (pct - bp).abs() < snap.breakpoint_tolerance);
        if near_whole || near_breakpoint {
            width = format!("{}%", (pct * 10.0).round() / 10.0);
        }
    }

    if parent.height > 0.0 {
        let pct = size.height / parent.height * 100.0;
        let rounded = pct.round();
        let near_whole = (pct - rounded).abs() < snap.integer_tolerance;
        if near_whole && snap.height_breakpoints.contains(&rounded) {
            height = format!("{rounded}%");
        }
    }

    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(handle: ResizeHandle) -> ResizeSession {
        ResizeSession {
            handle,
            start: Point::new(100.0, 100.0),
            start_size: Size::new(200.0, 100.0),
            max_width_constrained: false,
            max_height_constrained: false,
        }
    }

    #[test]
    fn east_and_south_grow_with_pointer() {
        let s = session(ResizeHandle::SE);
        assert_eq!(s.propose(Point::new(150.0, 130.0), None, 20.0), Size::new(250.0, 130.0));
    }

    #[test]
    fn west_and_north_grow_against_pointer() {
        let s = session(ResizeHandle::NW);
        assert_eq!(s.propose(Point::new(80.0, 90.0), None, 20.0), Size::new(220.0, 110.0));
    }

    #[test]
    fn edge_handles_touch_one_axis() {
        let s = session(ResizeHandle::E);
        assert_eq!(s.propose(Point::new(130.0, 500.0), None, 20.0), Size::new(230.0, 100.0));
        let s = session(ResizeHandle::N);
        assert_eq!(s.propose(Point::new(500.0, 120.0), None, 20.0), Size::new(200.0, 80.0));
    }

    #[test]
    fn minimum_size_holds() {
        let s = session(ResizeHandle::SE);
        assert_eq!(s.propose(Point::new(-500.0, -500.0), None, 20.0), Size::new(20.0, 20.0));
    }

    #[test]
    fn growth_capped_by_parent() {
        let s = session(ResizeHandle::SE);
        let parent = Some(Size::new(300.0, 150.0));
        assert_eq!(s.propose(Point::new(400.0, 400.0), parent, 20.0), Size::new(300.0, 150.0));
    }

    #[test]
    fn overflowing_element_may_keep_growing() {
        let s = session(ResizeHandle::SE);
        let parent = Some(Size::new(150.0, 80.0));
        assert_eq!(s.propose(Point::new(150.0, 150.0), parent, 20.0), Size::new(250.0, 150.0));
    }

    #[test]
    fn width_snaps_near_whole_and_breakpoints() {
        let snap = SnapConfig::default();
        let parent = Some(Size::new(1000.0, 1000.0));
        assert_eq!(finalize_dimensions(Size::new(500.4, 10.0), parent, &snap).0, "50%");
        assert_eq!(finalize_dimensions(Size::new(333.0, 10.0), parent, &snap).0, "33.3%");
        assert_eq!(finalize_dimensions(Size::new(420.3, 10.0), parent, &snap).0, "42%");
        assert_eq!(finalize_dimensions(Size::new(421.5, 10.0), parent, &snap).0, "422px");
    }

    #[test]
    fn height_snaps_only_to_breakpoints() {
        let snap = SnapConfig::default();
        let parent = Some(Size::new(1000.0, 400.0));
        assert_eq!(finalize_dimensions(Size::new(10.0, 200.2), parent, &snap).1, "50%");
        assert_eq!(finalize_dimensions(Size::new(10.0, 160.0), parent, &snap).1, "160px");
        assert_eq!(finalize_dimensions(Size::new(10.0, 202.0), parent, &snap).1, "202px");
    }

    #[test]
    fn no_parent_keeps_pixels() {
        let snap = SnapConfig::default();
        assert_eq!(
            finalize_dimensions(Size::new(99.6, 50.2), None, &snap),
            ("100px".to_string(), "50px".to_string())
        );
    }

    #[test]
    fn handle_names() {
        assert_eq!(ResizeHandle::from_name("SE"), Some(ResizeHandle::SE));
        assert_eq!(ResizeHandle::from_name("middle"), None);
        assert!(is_constraint("320px"));
        assert!(!is_constraint("none"));
    }
}
