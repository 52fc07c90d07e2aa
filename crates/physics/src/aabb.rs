//! Axis-aligned bounding boxes.
//!
//! Boxes are stored as top-left position plus size, matching screen-space
//! coordinates (y grows downward).

use bincode::{Decode, Encode};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Aabb {
    #[bincode(with_serde)]
    pub pos: Vec2,
    #[bincode(with_serde)]
    pub size: Vec2,
}

impl Aabb {
    pub const fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Build a box from its center point.
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            pos: center - size * 0.5,
            size,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Overlap test. Touching edges do not count as overlap, matching the
    /// snap-to-edge resolution in the collision resolver.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    #[inline]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// Grow (or shrink, with negative amounts) the box around its center.
    pub fn inflate(&self, dx: f32, dy: f32) -> Aabb {
        Aabb {
            pos: self.pos - Vec2::new(dx * 0.5, dy * 0.5),
            size: self.size + Vec2::new(dx, dy),
        }
    }

    /// Snap the box so its right edge sits at `x`.
    pub fn set_right(&mut self, x: f32) {
        self.pos.x = x - self.size.x;
    }

    pub fn set_left(&mut self, x: f32) {
        self.pos.x = x;
    }

    pub fn set_bottom(&mut self, y: f32) {
        self.pos.y = y - self.size.y;
    }

    pub fn set_top(&mut self, y: f32) {
        self.pos.y = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_basic() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::new(Vec2::new(5.0, 5.0), Vec2::new(10.0, 10.0));
        let c = Aabb::new(Vec2::new(20.0, 0.0), Vec2::new(10.0, 10.0));

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::new(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn from_center_round_trips() {
        let r = Aabb::from_center(Vec2::new(50.0, 50.0), Vec2::new(20.0, 10.0));
        assert_eq!(r.pos, Vec2::new(40.0, 45.0));
        assert_eq!(r.center(), Vec2::new(50.0, 50.0));
    }

    #[test]
    fn inflate_keeps_center() {
        let r = Aabb::new(Vec2::new(10.0, 10.0), Vec2::new(20.0, 20.0));
        let grown = r.inflate(10.0, 10.0);
        assert_eq!(grown.center(), r.center());
        assert_eq!(grown.size, Vec2::new(30.0, 30.0));
    }

    #[test]
    fn edge_snapping() {
        let mut r = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        r.set_right(25.0);
        assert_eq!(r.left(), 15.0);
        r.set_bottom(40.0);
        assert_eq!(r.top(), 30.0);
    }
}
