//! Minimal 2D geometry used by the navigation world: points, axis-aligned
//! boxes and simple polygons.
//!
//! Predicates are evaluated in `f64` from `f32` inputs so that collinearity
//! and on-boundary tests are exact for the coordinates stored in world files.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A point in 2D world coordinates.
pub type Point = Vec2;

/// Dot product of two points taken as vectors from the origin.
pub fn dot(a: Point, b: Point) -> f32 {
    a.dot(b)
}

/// Axis-aligned bounding box. `min <= max` component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn new(min: Point, max: Point) -> Self {
        debug_assert!(min.x <= max.x && min.y <= max.y, "inverted bounding box");
        Self { min, max }
    }

    /// Degenerate box covering a single point.
    pub fn from_point(p: Point) -> Self {
        Self { min: p, max: p }
    }

    /// Smallest box containing every point, or `None` for an empty input.
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::from_point(first), |b, p| Self {
            min: b.min.min(p),
            max: b.max.max(p),
        }))
    }

    /// Whether the point lies inside or on the border of the box.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// Reasons a vertex ring is not a valid simple polygon.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolygonError {
    #[error("polygon has {0} vertices, at least 3 are required")]
    TooFewVertices(usize),
    #[error("vertex {0} has a non-finite coordinate")]
    NonFinite(usize),
    #[error("vertex {0} repeats the previous vertex")]
    DuplicateVertex(usize),
    #[error("polygon has zero area")]
    ZeroArea,
    #[error("edges {first} and {second} intersect")]
    SelfIntersection { first: usize, second: usize },
    #[error("ring is wound clockwise, counter-clockwise is required")]
    WrongOrientation,
}

/// Simple polygon stored as an open ring (the closing vertex is implied).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimplePolygon {
    points: Vec<Point>,
}

impl SimplePolygon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Append a vertex at the end of the ring.
    pub fn push(&mut self, p: Point) {
        self.points.push(p);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box of all vertices.
    pub fn envelope(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.points.iter().copied())
    }

    /// Shoelace area, positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        let twice: f64 = (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64
            })
            .sum();
        twice * 0.5
    }

    pub fn is_counter_clockwise(&self) -> bool {
        self.signed_area() > 0.0
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check that the ring describes a simple polygon.
    ///
    /// The ring must be wound counter-clockwise. Edges may only meet at the
    /// vertex shared by two consecutive edges.
    pub fn validate(&self) -> Result<(), PolygonError> {
        let n = self.points.len();
        if n < 3 {
            return Err(PolygonError::TooFewVertices(n));
        }
        if let Some(i) = self.points.iter().position(|p| !p.is_finite()) {
            return Err(PolygonError::NonFinite(i));
        }
        for i in 0..n {
            if self.points[i] == self.points[(i + 1) % n] {
                return Err(PolygonError::DuplicateVertex((i + 1) % n));
            }
        }
        if self.signed_area() == 0.0 {
            return Err(PolygonError::ZeroArea);
        }

        for i in 0..n {
            let (a0, a1) = self.edge(i);
            for j in (i + 1)..n {
                let (b0, b1) = self.edge(j);
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                let crossing = if adjacent {
                    // Consecutive edges share a vertex; they are only invalid
                    // when they fold back onto each other.
                    let (shared, a, b) = if j == i + 1 { (a1, a0, b1) } else { (a0, a1, b0) };
                    orient(shared, a, b) == 0.0 && along(shared, a, b) > 0.0
                } else {
                    segments_intersect(a0, a1, b0, b1)
                };
                if crossing {
                    return Err(PolygonError::SelfIntersection {
                        first: i,
                        second: j,
                    });
                }
            }
        }

        if !self.is_counter_clockwise() {
            return Err(PolygonError::WrongOrientation);
        }
        Ok(())
    }

    /// Strict point-in-polygon test: points on an edge or vertex are outside.
    pub fn contains(&self, p: Point) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        for i in 0..n {
            let (a, b) = self.edge(i);
            if on_segment(a, b, p) {
                return false;
            }
        }

        // Crossing number along a ray towards +x.
        let (px, py) = (p.x as f64, p.y as f64);
        let mut inside = false;
        for i in 0..n {
            let (a, b) = self.edge(i);
            let (ax, ay, bx, by) = (a.x as f64, a.y as f64, b.x as f64, b.y as f64);
            if (ay > py) != (by > py) {
                let x_cross = ax + (py - ay) * (bx - ax) / (by - ay);
                if px < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    fn edge(&self, i: usize) -> (Point, Point) {
        (self.points[i], self.points[(i + 1) % self.points.len()])
    }
}

/// Twice the signed area of triangle `(a, b, c)`.
fn orient(a: Point, b: Point, c: Point) -> f64 {
    let (ax, ay) = (a.x as f64, a.y as f64);
    (b.x as f64 - ax) * (c.y as f64 - ay) - (b.y as f64 - ay) * (c.x as f64 - ax)
}

/// Dot product of `a - origin` and `b - origin`.
fn along(origin: Point, a: Point, b: Point) -> f64 {
    let (ox, oy) = (origin.x as f64, origin.y as f64);
    (a.x as f64 - ox) * (b.x as f64 - ox) + (a.y as f64 - oy) * (b.y as f64 - oy)
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    orient(a, b, p) == 0.0
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y)
        && p.y <= a.y.max(b.y)
}

/// Closed-segment intersection, touching and collinear overlap included.
fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = orient(q1, q2, p1);
    let d2 = orient(q1, q2, p2);
    let d3 = orient(p1, p2, q1);
    let d4 = orient(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    on_segment(q1, q2, p1) || on_segment(q1, q2, p2) || on_segment(p1, p2, q1) || on_segment(p1, p2, q2)
}
