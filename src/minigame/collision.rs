//! Collision tests for the mini-games
//!
//! Everything in the arcade games is an axis-aligned box: falling food, the
//! catch paddle, click targets, jump platforms and coins. Ranges are closed
//! or open exactly as each game's rules need, so the helpers take that choice
//! explicitly rather than hiding it.

use glam::Vec2;

/// Axis-aligned box given by its top-left corner and size (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Box of `size` centered on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            min: center - size / 2.0,
            size,
        }
    }

    pub fn left(&self) -> f32 {
        self.min.x
    }

    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    pub fn top(&self) -> f32 {
        self.min.y
    }

    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }

    /// Point inside (edges inclusive)
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }
}

/// Open-interval overlap: touching edges do not count
#[inline]
pub fn spans_overlap(a_min: f32, a_max: f32, b_min: f32, b_max: f32) -> bool {
    a_min < b_max && a_max > b_min
}

/// Closed-interval overlap: touching edges count
#[inline]
pub fn spans_touch(a_min: f32, a_max: f32, b_min: f32, b_max: f32) -> bool {
    a_min <= b_max && a_max >= b_min
}

/// Falling item caught by the paddle.
///
/// Vertical bands may touch (an item resting exactly on the paddle top
/// counts) while horizontal extents must genuinely overlap.
pub fn item_caught(item: &Rect, paddle: &Rect) -> bool {
    spans_touch(item.top(), item.bottom(), paddle.top(), paddle.bottom())
        && spans_overlap(item.left(), item.right(), paddle.left(), paddle.right())
}

/// Proximity pickup: both center distances under the summed half-extents
pub fn within_reach(a: &Rect, b: &Rect) -> bool {
    let d = (a.center() - b.center()).abs();
    let reach = (a.size + b.size) / 2.0;
    d.x < reach.x && d.y < reach.y
}

/// Falling body landing on the top of a platform.
///
/// The body's bottom must be inside `[top, top + tolerance]` and the
/// horizontal extents must touch.
pub fn lands_on(body: &Rect, falling: bool, platform: &Rect, tolerance: f32) -> bool {
    falling
        && body.bottom() >= platform.top()
        && body.bottom() <= platform.top() + tolerance
        && spans_touch(body.left(), body.right(), platform.left(), platform.right())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::centered(Vec2::new(10.0, 10.0), Vec2::new(4.0, 2.0));
        assert_eq!((r.left(), r.right(), r.top(), r.bottom()), (8.0, 12.0, 9.0, 11.0));
        assert!(r.contains(Vec2::new(12.0, 11.0)));
        assert!(!r.contains(Vec2::new(12.1, 11.0)));
    }

    #[test]
    fn test_item_caught_requires_horizontal_overlap() {
        let paddle = Rect::new(45.0, 85.0, 10.0, 5.0);
        // Directly above and touching the paddle band
        assert!(item_caught(&Rect::new(47.0, 79.0, 6.0, 6.0), &paddle));
        // Edge-to-edge horizontally does not count
        assert!(!item_caught(&Rect::new(55.0, 82.0, 6.0, 6.0), &paddle));
        // Still above the band
        assert!(!item_caught(&Rect::new(47.0, 70.0, 6.0, 6.0), &paddle));
    }

    #[test]
    fn test_within_reach() {
        let player = Rect::new(175.0, 0.0, 50.0, 50.0);
        assert!(within_reach(&player, &Rect::new(190.0, 30.0, 30.0, 30.0)));
        assert!(!within_reach(&player, &Rect::new(240.0, 0.0, 30.0, 30.0)));
    }

    #[test]
    fn test_lands_on_only_when_falling() {
        let platform = Rect::new(160.0, 350.0, 80.0, 80.0);
        let body = Rect::new(175.0, 305.0, 50.0, 50.0);
        assert!(lands_on(&body, true, &platform, 20.0));
        assert!(!lands_on(&body, false, &platform, 20.0));
        let deep = Rect::new(175.0, 330.0, 50.0, 50.0);
        assert!(!lands_on(&deep, true, &platform, 20.0));
    }
}
