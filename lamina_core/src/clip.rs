// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbitrary clip regions.

use kurbo::{Affine, BezPath, Point, Rect, RoundedRect, Shape, Vec2};

/// Tolerance used when flattening curved shapes into clip paths.
const PATH_TOLERANCE: f64 = 0.1;

/// A clip region expressed as the intersection of one or more paths.
///
/// Intersection never approximates: the region is exactly the set of points
/// inside every member path, and a canvas applies it by clipping to each
/// member in turn.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipPath {
    paths: Vec<BezPath>,
}

impl ClipPath {
    /// Creates a clip region bounded by a single path.
    #[must_use]
    pub fn new(path: BezPath) -> Self {
        Self { paths: vec![path] }
    }

    /// Creates a rectangular clip region.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.to_path(PATH_TOLERANCE))
    }

    /// Creates a rounded-rectangle clip region.
    #[must_use]
    pub fn from_rounded_rect(rect: RoundedRect) -> Self {
        Self::new(rect.to_path(PATH_TOLERANCE))
    }

    /// Narrows this region to its intersection with `other`.
    pub fn intersect(&mut self, other: &Self) {
        self.paths.extend(other.paths.iter().cloned());
    }

    /// Returns the intersection of this region and `other`.
    #[must_use]
    pub fn intersected(mut self, other: &Self) -> Self {
        self.intersect(other);
        self
    }

    /// Returns the region moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        self.transformed(Affine::translate(offset))
    }

    /// Returns the region mapped through `affine`.
    #[must_use]
    pub fn transformed(&self, affine: Affine) -> Self {
        let paths = self
            .paths
            .iter()
            .map(|path| {
                let mut path = path.clone();
                path.apply_affine(affine);
                path
            })
            .collect();
        Self { paths }
    }

    /// Returns whether `point` lies inside every member path.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.paths.iter().all(|path| path.contains(point))
    }

    /// Returns a rectangle enclosing the region.
    ///
    /// The result is empty (zero area) when the member paths do not overlap.
    #[must_use]
    pub fn bounding_box(&self) -> Rect {
        let mut paths = self.paths.iter();
        let Some(first) = paths.next() else {
            return Rect::ZERO;
        };
        paths.fold(first.bounding_box(), |acc, path| {
            let rect = acc.intersect(path.bounding_box());
            if rect.width() <= 0.0 || rect.height() <= 0.0 {
                Rect::ZERO
            } else {
                rect
            }
        })
    }

    /// Returns the member paths whose intersection forms the region.
    #[must_use]
    pub fn paths(&self) -> &[BezPath] {
        &self.paths
    }
}

impl From<Rect> for ClipPath {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}

impl From<RoundedRect> for ClipPath {
    fn from(rect: RoundedRect) -> Self {
        Self::from_rounded_rect(rect)
    }
}

impl From<BezPath> for ClipPath {
    fn from(path: BezPath) -> Self {
        Self::new(path)
    }
}
