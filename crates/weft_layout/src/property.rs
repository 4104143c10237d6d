//! Property slots
//!
//! Every layout-affecting value on a node lives in a [`PropertySlot`]. A slot
//! knows which [`Invalidation`] category a change belongs to, whether the
//! value was set explicitly, and optionally which theme token it follows.
//!
//! Setters never touch the tree themselves: they report the category to
//! fire and the tree routes it through its dirty-state machine.

use weft_core::{Color, CornerRadius, Thickness};
use weft_theme::{ThemeContext, ThemeKey};

/// Layout impact of a property write
///
/// Ordered by strength: each category implies everything below it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Invalidation {
    #[default]
    None,
    /// Cached visuals must be rebuilt
    Visuals,
    /// This node must be measured and arranged again
    SelfLayout,
    /// This node and its parent must be measured and arranged again
    ParentLayout,
}

impl Invalidation {
    /// The stronger of two categories
    pub fn merge(self, other: Invalidation) -> Invalidation {
        self.max(other)
    }

    pub fn affects_layout(self) -> bool {
        matches!(self, Invalidation::SelfLayout | Invalidation::ParentLayout)
    }
}

/// Merge an optional fired category into an accumulator
pub fn fire(acc: &mut Option<Invalidation>, fired: Option<Invalidation>) {
    if let Some(fired) = fired {
        *acc = Some(acc.map_or(fired, |current| current.merge(fired)));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Slot
// ─────────────────────────────────────────────────────────────────────────────

/// A typed property value with change tracking
#[derive(Clone, Debug)]
pub struct PropertySlot<T> {
    value: T,
    default: T,
    is_set: bool,
    invalidation: Invalidation,
    theme_key: Option<ThemeKey>,
    /// Theme version last resolved against; 0 means never
    theme_version: u64,
}

impl<T: Clone + PartialEq> PropertySlot<T> {
    pub fn new(default: T, invalidation: Invalidation) -> Self {
        Self {
            value: default.clone(),
            default,
            is_set: false,
            invalidation,
            theme_key: None,
            theme_version: 0,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Whether the value was assigned explicitly
    pub fn is_set(&self) -> bool {
        self.is_set
    }

    pub fn invalidation(&self) -> Invalidation {
        self.invalidation
    }

    pub fn theme_key(&self) -> Option<ThemeKey> {
        self.theme_key
    }

    /// Assign a value.
    ///
    /// Returns the category to fire, or `None` when an already-set slot
    /// receives an equal value. The first assignment always fires.
    pub fn set(&mut self, value: T) -> Option<Invalidation> {
        if self.is_set && self.value == value {
            return None;
        }
        self.value = value;
        self.is_set = true;
        Some(self.invalidation)
    }

    /// Return to the default (or the theme value on the next resolve)
    pub fn clear(&mut self) -> Option<Invalidation> {
        let fires = self.is_set || self.value != self.default;
        self.value = self.default.clone();
        self.is_set = false;
        self.theme_version = 0;
        fires.then_some(self.invalidation)
    }
}

impl<T: Themed + Clone + PartialEq> PropertySlot<T> {
    /// Follow a theme token until explicitly set
    pub fn bind_theme(&mut self, key: ThemeKey) {
        self.theme_key = Some(key);
        self.theme_version = 0;
    }

    pub fn with_theme(mut self, key: impl Into<ThemeKey>) -> Self {
        self.bind_theme(key.into());
        self
    }

    pub fn unbind_theme(&mut self) {
        self.theme_key = None;
    }

    /// Re-query the theme if its version moved since the last resolve.
    ///
    /// Explicitly set slots ignore the theme. A token missing from the
    /// theme keeps the current value.
    pub fn resolve_theme(&mut self, theme: &ThemeContext) -> Option<Invalidation> {
        let key = self.theme_key?;
        if self.is_set || self.theme_version == theme.version() {
            return None;
        }
        self.theme_version = theme.version();

        let Some(value) = T::from_theme(theme, key) else {
            tracing::warn!(?key, "theme token missing, keeping current value");
            return None;
        };
        if value == self.value {
            return None;
        }
        self.value = value;
        Some(self.invalidation)
    }
}

impl<T: Copy> PropertySlot<T> {
    /// Copy of the current value
    pub fn value(&self) -> T {
        self.value
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Theme mapping
// ─────────────────────────────────────────────────────────────────────────────

/// Types that can be read from a theme token
pub trait Themed: Sized {
    fn from_theme(theme: &ThemeContext, key: ThemeKey) -> Option<Self>;
}

fn metric(theme: &ThemeContext, key: ThemeKey) -> Option<f32> {
    match key {
        ThemeKey::Metric(token) => theme.metric(token),
        ThemeKey::Color(_) => None,
    }
}

impl Themed for Color {
    fn from_theme(theme: &ThemeContext, key: ThemeKey) -> Option<Self> {
        match key {
            ThemeKey::Color(token) => theme.color(token),
            ThemeKey::Metric(_) => None,
        }
    }
}

impl Themed for f32 {
    fn from_theme(theme: &ThemeContext, key: ThemeKey) -> Option<Self> {
        metric(theme, key)
    }
}

impl Themed for Option<f32> {
    fn from_theme(theme: &ThemeContext, key: ThemeKey) -> Option<Self> {
        metric(theme, key).map(Some)
    }
}

impl Themed for Thickness {
    fn from_theme(theme: &ThemeContext, key: ThemeKey) -> Option<Self> {
        metric(theme, key).map(Thickness::uniform)
    }
}

impl Themed for CornerRadius {
    fn from_theme(theme: &ThemeContext, key: ThemeKey) -> Option<Self> {
        metric(theme, key).map(CornerRadius::uniform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_theme::{ColorToken, MetricToken, Theme};

    #[test]
    fn test_first_set_always_fires() {
        let mut slot = PropertySlot::new(0.0f32, Invalidation::SelfLayout);
        assert_eq!(slot.set(0.0), Some(Invalidation::SelfLayout));
        assert_eq!(slot.set(0.0), None);
        assert_eq!(slot.set(1.0), Some(Invalidation::SelfLayout));
        assert!(slot.is_set());
    }

    #[test]
    fn test_clear() {
        let mut slot = PropertySlot::new(Color::TRANSPARENT, Invalidation::Visuals);
        assert_eq!(slot.clear(), None);
        slot.set(Color::RED);
        assert_eq!(slot.clear(), Some(Invalidation::Visuals));
        assert_eq!(slot.value(), Color::TRANSPARENT);
        assert!(!slot.is_set());
    }

    #[test]
    fn test_theme_resolution_is_version_gated() {
        let mut ctx = ThemeContext::new(Theme::light());
        let mut slot = PropertySlot::new(Color::TRANSPARENT, Invalidation::Visuals)
            .with_theme(ColorToken::Surface);

        assert_eq!(slot.resolve_theme(&ctx), Some(Invalidation::Visuals));
        assert_eq!(Some(slot.value()), ctx.color(ColorToken::Surface));
        // Same version: no re-query
        assert_eq!(slot.resolve_theme(&ctx), None);

        ctx.set_theme(Theme::dark());
        assert_eq!(slot.resolve_theme(&ctx), Some(Invalidation::Visuals));
        assert_eq!(Some(slot.value()), ctx.color(ColorToken::Surface));
    }

    #[test]
    fn test_explicit_set_wins_over_theme() {
        let ctx = ThemeContext::new(Theme::light());
        let mut slot = PropertySlot::new(0.0f32, Invalidation::SelfLayout)
            .with_theme(MetricToken::Spacing);
        slot.set(3.0);
        assert_eq!(slot.resolve_theme(&ctx), None);
        assert_eq!(slot.value(), 3.0);

        // Clearing hands control back to the theme
        slot.clear();
        assert_eq!(slot.resolve_theme(&ctx), Some(Invalidation::SelfLayout));
        assert_eq!(Some(slot.value()), ctx.metric(MetricToken::Spacing));
    }

    #[test]
    fn test_mismatched_token_keeps_value() {
        let ctx = ThemeContext::new(Theme::light());
        let mut slot =
            PropertySlot::new(Color::RED, Invalidation::Visuals).with_theme(MetricToken::Spacing);
        assert_eq!(slot.resolve_theme(&ctx), None);
        assert_eq!(slot.value(), Color::RED);
    }

    #[test]
    fn test_merge_takes_strongest() {
        let mut acc = None;
        fire(&mut acc, Some(Invalidation::Visuals));
        fire(&mut acc, None);
        fire(&mut acc, Some(Invalidation::ParentLayout));
        fire(&mut acc, Some(Invalidation::SelfLayout));
        assert_eq!(acc, Some(Invalidation::ParentLayout));
    }
}
