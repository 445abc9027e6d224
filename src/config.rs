//! Toolkit settings shared by the dispatcher and the style tree.
//!
//! [`Settings`] replaces the process-wide settings object: it is owned by
//! whoever needs it ([`Dispatcher`](crate::dispatch::Dispatcher),
//! [`StyleTree`](crate::style::StyleTree)) and passed in explicitly.

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Input and animation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Maximum time between presses, in milliseconds, for them to count as
    /// one multi-press series.
    pub double_click_time: u32,
    /// Maximum distance, in pixels, between the first press of a series and
    /// any later press or motion.
    pub double_click_distance: u32,
    /// Treat pointer events as touchscreen events for touch-only recognizers.
    pub simulate_touchscreen: bool,
    /// Whether the style tree starts CSS transitions.
    pub animations_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            double_click_time: 400,
            double_click_distance: 5,
            simulate_touchscreen: false,
            animations_enabled: true,
        }
    }
}

impl Settings {
    /// Create settings with the toolkit defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the double-click time in milliseconds (builder).
    pub fn with_double_click_time(mut self, millis: u32) -> Self {
        self.double_click_time = millis;
        self
    }

    /// Set the double-click distance in pixels (builder).
    pub fn with_double_click_distance(mut self, pixels: u32) -> Self {
        self.double_click_distance = pixels;
        self
    }

    /// Enable or disable touchscreen simulation (builder).
    pub fn with_simulate_touchscreen(mut self, simulate: bool) -> Self {
        self.simulate_touchscreen = simulate;
        self
    }

    /// Enable or disable CSS transitions (builder).
    pub fn with_animations(mut self, enabled: bool) -> Self {
        self.animations_enabled = enabled;
        self
    }
}
