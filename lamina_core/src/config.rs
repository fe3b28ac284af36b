// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Document configuration.

use crate::color::Color;

/// Configuration for a [`Document`](crate::document::Document).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DocumentConfig {
    /// Color the screen is cleared to before composing.
    pub clear_color: Color,
    /// Upper bound on relayout passes per frame.
    ///
    /// A pass lays out every pending relayout boundary; layout and observer
    /// side effects may queue further changes for another pass. A frame that
    /// would need more passes fails with
    /// [`RenderError::LayoutDidNotConverge`](crate::error::RenderError::LayoutDidNotConverge).
    pub max_relayout_passes: u32,
}

impl DocumentConfig {
    /// Transparent background, 64 relayout passes.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            clear_color: Color::TRANSPARENT,
            max_relayout_passes: 64,
        }
    }

    /// Opaque white background, otherwise like [`new`](Self::new).
    #[must_use]
    pub const fn opaque() -> Self {
        Self {
            clear_color: Color::WHITE,
            ..Self::new()
        }
    }

    /// Returns the configuration with a different clear color.
    #[must_use]
    pub const fn with_clear_color(self, clear_color: Color) -> Self {
        Self {
            clear_color,
            ..self
        }
    }

    /// Returns the configuration with a different relayout pass bound.
    ///
    /// # Panics
    ///
    /// Panics if `passes` is zero.
    #[must_use]
    pub const fn with_max_relayout_passes(self, passes: u32) -> Self {
        assert!(passes > 0, "max_relayout_passes must be at least 1");
        Self {
            max_relayout_passes: passes,
            ..self
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self::new()
    }
}
