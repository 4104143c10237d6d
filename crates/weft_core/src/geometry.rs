//! Geometry value types
//!
//! Plain copyable math types shared by layout and rendering. None of these
//! carry invalidation state; they are recomputed freely every pass.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Point / Size
// ─────────────────────────────────────────────────────────────────────────────

/// 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Offset the point by a delta
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    /// Unbounded size, used as "measure to content" constraint
    pub const INFINITY: Size = Size {
        width: f32::INFINITY,
        height: f32::INFINITY,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Convert to a Rect at the origin (0, 0)
    pub const fn to_rect(self) -> Rect {
        Rect {
            origin: Point::ZERO,
            size: self,
        }
    }

    /// Replace NaN and negative components with zero
    pub fn clamp_non_negative(self) -> Self {
        Size::new(non_negative(self.width), non_negative(self.height))
    }

    /// Shrink by an inset; never goes below zero
    pub fn shrink(self, inset: &Thickness) -> Self {
        Size::new(
            self.width - inset.horizontal(),
            self.height - inset.vertical(),
        )
        .clamp_non_negative()
    }

    /// Grow by an inset
    pub fn grow(self, inset: &Thickness) -> Self {
        Size::new(
            self.width + inset.horizontal(),
            self.height + inset.vertical(),
        )
    }

    /// Component-wise maximum
    pub fn max(self, other: Size) -> Self {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// Component-wise minimum
    pub fn min(self, other: Size) -> Self {
        Size::new(self.width.min(other.width), self.height.min(other.height))
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

fn non_negative(v: f32) -> f32 {
    if v.is_nan() || v < 0.0 {
        0.0
    } else {
        v
    }
}

impl From<Size> for Rect {
    /// Convert Size to Rect at origin (0, 0)
    fn from(size: Size) -> Self {
        size.to_rect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Thickness / CornerRadius
// ─────────────────────────────────────────────────────────────────────────────

/// Four-sided inset (margin, border thickness, padding)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thickness {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Thickness {
    pub const ZERO: Thickness = Thickness {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Horizontal / vertical symmetric inset
    pub const fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self::new(horizontal, vertical, horizontal, vertical)
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    pub fn is_zero(&self) -> bool {
        *self == Thickness::ZERO
    }

    /// Same inset with every side clamped to be non-negative
    pub fn clamp_non_negative(self) -> Self {
        Thickness::new(
            non_negative(self.left),
            non_negative(self.top),
            non_negative(self.right),
            non_negative(self.bottom),
        )
    }
}

impl std::ops::Add for Thickness {
    type Output = Thickness;

    fn add(self, rhs: Thickness) -> Thickness {
        Thickness::new(
            self.left + rhs.left,
            self.top + rhs.top,
            self.right + rhs.right,
            self.bottom + rhs.bottom,
        )
    }
}

impl From<f32> for Thickness {
    fn from(value: f32) -> Self {
        Self::uniform(value)
    }
}

/// Corner radii for rounded rectangles
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CornerRadius {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadius {
    pub const ZERO: CornerRadius = CornerRadius {
        top_left: 0.0,
        top_right: 0.0,
        bottom_right: 0.0,
        bottom_left: 0.0,
    };

    /// Create a corner radius with different values for each corner.
    /// Order: top_left, top_right, bottom_right, bottom_left (clockwise from top-left)
    pub fn new(top_left: f32, top_right: f32, bottom_right: f32, bottom_left: f32) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    pub fn uniform(radius: f32) -> Self {
        Self::new(radius, radius, radius, radius)
    }

    pub fn to_array(&self) -> [f32; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    pub fn is_zero(&self) -> bool {
        self.to_array().iter().all(|r| *r <= 0.0)
    }

    /// Radii limited so adjacent corners never overlap inside `size`
    pub fn fit(&self, size: Size) -> Self {
        let limit = (size.width.min(size.height) / 2.0).max(0.0);
        let clamp = |r: f32| non_negative(r).min(limit);
        CornerRadius::new(
            clamp(self.top_left),
            clamp(self.top_right),
            clamp(self.bottom_right),
            clamp(self.bottom_left),
        )
    }
}

impl From<f32> for CornerRadius {
    fn from(radius: f32) -> Self {
        Self::uniform(radius)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rect
// ─────────────────────────────────────────────────────────────────────────────

/// 2D rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.x <= self.right()
            && point.y >= self.origin.y
            && point.y <= self.bottom()
    }

    /// Whether `other` lies entirely inside this rect
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.origin.x >= self.origin.x
            && other.origin.y >= self.origin.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Get the size of this rect
    pub fn size(&self) -> Size {
        self.size
    }

    /// Offset the rect by a delta
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Rect {
            origin: self.origin.offset(dx, dy),
            size: self.size,
        }
    }

    /// Shrink by a four-sided inset.
    ///
    /// Width and height clamp at zero and the origin never moves past the
    /// far edge, so the result is always contained in `self`.
    pub fn deflate(&self, inset: &Thickness) -> Self {
        let x = (self.origin.x + inset.left).min(self.right());
        let y = (self.origin.y + inset.top).min(self.bottom());
        Rect {
            origin: Point::new(x, y),
            size: self.size.shrink(inset),
        }
    }

    /// Grow by a four-sided inset
    pub fn inflate(&self, inset: &Thickness) -> Self {
        Rect {
            origin: self.origin.offset(-inset.left, -inset.top),
            size: self.size.grow(inset),
        }
    }

    /// Create a rect from two corner points
    pub fn from_points(p1: Point, p2: Point) -> Self {
        let min_x = p1.x.min(p2.x);
        let min_y = p1.y.min(p2.y);
        let max_x = p1.x.max(p2.x);
        let max_y = p1.y.max(p2.y);
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Get the union of two rects (smallest rect containing both)
    pub fn union(&self, other: &Rect) -> Self {
        let min_x = self.origin.x.min(other.origin.x);
        let min_y = self.origin.y.min(other.origin.y);
        let max_x = self.right().max(other.right());
        let max_y = self.bottom().max(other.bottom());
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Check if this rect intersects with another
    pub fn intersects(&self, other: &Rect) -> bool {
        self.origin.x < other.right()
            && self.right() > other.origin.x
            && self.origin.y < other.bottom()
            && self.bottom() > other.origin.y
    }

    /// Get the intersection of two rects (if they overlap)
    pub fn intersection(&self, other: &Rect) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }

        let x = self.origin.x.max(other.origin.x);
        let y = self.origin.y.max(other.origin.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        Some(Rect::new(x, y, right - x, bottom - y))
    }

    /// Floor the origin and ceil the size (pixel snapping)
    pub fn snap_to_pixels(&self) -> Self {
        Rect::new(
            self.origin.x.floor(),
            self.origin.y.floor(),
            self.size.width.ceil(),
            self.size.height.ceil(),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Affine2D
// ─────────────────────────────────────────────────────────────────────────────

/// 2D affine transformation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Affine2D {
    /// Matrix elements [a, b, c, d, tx, ty]
    /// | a  c  tx |
    /// | b  d  ty |
    /// | 0  0   1 |
    pub elements: [f32; 6],
}

impl Default for Affine2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine2D {
    pub const IDENTITY: Affine2D = Affine2D {
        elements: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    pub fn translation(x: f32, y: f32) -> Self {
        Self {
            elements: [1.0, 0.0, 0.0, 1.0, x, y],
        }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            elements: [sx, 0.0, 0.0, sy, 0.0, 0.0],
        }
    }

    pub fn rotation(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            elements: [c, s, -s, c, 0.0, 0.0],
        }
    }

    pub fn transform_point(&self, point: Point) -> Point {
        let [a, b, c, d, tx, ty] = self.elements;
        Point::new(
            a * point.x + c * point.y + tx,
            b * point.x + d * point.y + ty,
        )
    }

    /// Axis-aligned bounds of a transformed rect
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let corners = [
            self.transform_point(rect.origin),
            self.transform_point(Point::new(rect.right(), rect.y())),
            self.transform_point(Point::new(rect.right(), rect.bottom())),
            self.transform_point(Point::new(rect.x(), rect.bottom())),
        ];
        let mut min = corners[0];
        let mut max = corners[0];
        for p in &corners[1..] {
            min = Point::new(min.x.min(p.x), min.y.min(p.y));
            max = Point::new(max.x.max(p.x), max.y.max(p.y));
        }
        Rect::from_points(min, max)
    }

    /// Concatenate this transform with another (self * other)
    /// The resulting transform first applies `other`, then `self`.
    pub fn then(&self, other: &Affine2D) -> Affine2D {
        let [a1, b1, c1, d1, tx1, ty1] = self.elements;
        let [a2, b2, c2, d2, tx2, ty2] = other.elements;

        Affine2D {
            elements: [
                a1 * a2 + c1 * b2,
                b1 * a2 + d1 * b2,
                a1 * c2 + c1 * d2,
                b1 * c2 + d1 * d2,
                a1 * tx2 + c1 * ty2 + tx1,
                b1 * tx2 + d1 * ty2 + ty1,
            ],
        }
    }

    /// Inverse transform, `None` when the matrix is singular
    pub fn inverse(&self) -> Option<Affine2D> {
        let [a, b, c, d, tx, ty] = self.elements;
        let det = a * d - b * c;
        if det.abs() <= f32::EPSILON || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Affine2D {
            elements: [
                d * inv,
                -b * inv,
                -c * inv,
                a * inv,
                (c * ty - d * tx) * inv,
                (b * tx - a * ty) * inv,
            ],
        })
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Identity within `eps` on every element
    pub fn approx_identity(&self, eps: f32) -> bool {
        self.elements
            .iter()
            .zip(Self::IDENTITY.elements.iter())
            .all(|(a, b)| (a - b).abs() <= eps)
    }

    /// Translation component
    pub fn translation_part(&self) -> Point {
        Point::new(self.elements[4], self.elements[5])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deflate_contained() {
        let outer = Rect::new(10.0, 10.0, 5.0, 40.0);
        let inner = outer.deflate(&Thickness::uniform(8.0));
        assert_eq!(inner.width(), 0.0);
        assert_eq!(inner.height(), 24.0);
        assert!(outer.contains_rect(&inner));
    }

    #[test]
    fn test_inflate_deflate_roundtrip() {
        let inset = Thickness::new(1.0, 2.0, 3.0, 4.0);
        let rect = Rect::new(5.0, 5.0, 50.0, 60.0);
        assert_eq!(rect.inflate(&inset).deflate(&inset), rect);
    }

    #[test]
    fn test_size_clamps_nan() {
        let s = Size::new(f32::NAN, -3.0).clamp_non_negative();
        assert_eq!(s, Size::ZERO);
    }

    #[test]
    fn test_affine_then_order() {
        let parent = Affine2D::translation(10.0, 0.0);
        let child = Affine2D::scale(2.0, 2.0);
        let composed = parent.then(&child);
        // scale first, then translate
        assert_eq!(
            composed.transform_point(Point::new(1.0, 1.0)),
            Point::new(12.0, 2.0)
        );
    }

    #[test]
    fn test_affine_inverse() {
        let t = Affine2D::translation(5.0, -3.0).then(&Affine2D::scale(2.0, 4.0));
        let inv = t.inverse().unwrap();
        let p = Point::new(7.0, 9.0);
        let back = inv.transform_point(t.transform_point(p));
        assert!((back.x - p.x).abs() < 1e-4);
        assert!((back.y - p.y).abs() < 1e-4);
        assert!(Affine2D::scale(0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn test_transform_rect_rotation_bounds() {
        let r = Affine2D::rotation(std::f32::consts::FRAC_PI_2)
            .transform_rect(&Rect::new(0.0, 0.0, 10.0, 20.0));
        assert!((r.width() - 20.0).abs() < 1e-4);
        assert!((r.height() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_snap_to_pixels() {
        let r = Rect::new(1.4, 2.6, 10.2, 3.1).snap_to_pixels();
        assert_eq!(r, Rect::new(1.0, 2.0, 11.0, 4.0));

        // Size is ceiled on its own, not measured from the floored origin
        let r = Rect::new(9.75, 0.0, 10.5, 10.0).snap_to_pixels();
        assert_eq!(r, Rect::new(9.0, 0.0, 11.0, 10.0));
    }

    #[test]
    fn test_corner_radius_fit() {
        let r = CornerRadius::uniform(40.0).fit(Size::new(20.0, 100.0));
        assert_eq!(r, CornerRadius::uniform(10.0));
    }
}
