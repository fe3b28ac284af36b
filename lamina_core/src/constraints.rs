// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Box constraints passed from a parent to a child during layout.

use kurbo::Size;

/// Minimum and maximum extents a parent allows a child to take.
///
/// An unbounded axis uses `f64::INFINITY` as its maximum.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxConstraints {
    /// Smallest allowed width.
    pub min_width: f64,
    /// Largest allowed width.
    pub max_width: f64,
    /// Smallest allowed height.
    pub min_height: f64,
    /// Largest allowed height.
    pub max_height: f64,
}

impl BoxConstraints {
    /// Constraints with no bounds on either axis.
    pub const UNBOUNDED: Self = Self::new(0.0, f64::INFINITY, 0.0, f64::INFINITY);

    /// Creates constraints from explicit bounds.
    #[inline]
    #[must_use]
    pub const fn new(min_width: f64, max_width: f64, min_height: f64, max_height: f64) -> Self {
        Self {
            min_width,
            max_width,
            min_height,
            max_height,
        }
    }

    /// Constraints that only admit exactly `size`.
    #[inline]
    #[must_use]
    pub const fn tight(size: Size) -> Self {
        Self::new(size.width, size.width, size.height, size.height)
    }

    /// Constraints that admit anything from zero up to `size`.
    #[inline]
    #[must_use]
    pub const fn loose(size: Size) -> Self {
        Self::new(0.0, size.width, 0.0, size.height)
    }

    /// Builds tight or loose constraints around `size`.
    #[inline]
    #[must_use]
    pub const fn from_size(size: Size, tight: bool) -> Self {
        if tight {
            Self::tight(size)
        } else {
            Self::loose(size)
        }
    }

    /// Returns whether the constraints admit exactly one size.
    #[inline]
    #[must_use]
    pub fn is_tight(&self) -> bool {
        self.min_width == self.max_width && self.min_height == self.max_height
    }

    /// Returns the same maxima with the minima dropped to zero.
    #[inline]
    #[must_use]
    pub const fn loosen(self) -> Self {
        Self::new(0.0, self.max_width, 0.0, self.max_height)
    }

    /// Returns constraints pinned to the maxima.
    #[inline]
    #[must_use]
    pub const fn tighten(self) -> Self {
        Self::new(self.max_width, self.max_width, self.max_height, self.max_height)
    }

    /// Returns the largest admitted size.
    #[inline]
    #[must_use]
    pub const fn max_size(&self) -> Size {
        Size::new(self.max_width, self.max_height)
    }

    /// Returns the smallest admitted size.
    #[inline]
    #[must_use]
    pub const fn min_size(&self) -> Size {
        Size::new(self.min_width, self.min_height)
    }

    /// Clamps `size` into the admitted range.
    #[must_use]
    pub fn constrain(&self, size: Size) -> Size {
        Size::new(
            size.width.max(self.min_width).min(self.max_width),
            size.height.max(self.min_height).min(self.max_height),
        )
    }

    /// Returns whether `size` lies within the admitted range.
    #[must_use]
    pub fn contains(&self, size: Size) -> bool {
        (self.min_width..=self.max_width).contains(&size.width)
            && (self.min_height..=self.max_height).contains(&size.height)
    }
}
