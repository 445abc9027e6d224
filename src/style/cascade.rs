//! Style cascade: prioritized stylesheet providers.

use crate::css::parser::{parse_css, ParseError};
use crate::css::stylesheet::{apply_matches, CompiledStylesheet};
use crate::css::Styles;

use super::change::CssChange;
use super::path::WidgetPath;

/// Built-in fallback rules.
pub const PRIORITY_FALLBACK: u32 = 1;
/// The active theme.
pub const PRIORITY_THEME: u32 = 200;
/// Rules derived from toolkit settings.
pub const PRIORITY_SETTINGS: u32 = 400;
/// Application stylesheets.
pub const PRIORITY_APPLICATION: u32 = 600;
/// Per-user overrides.
pub const PRIORITY_USER: u32 = 800;

/// Errors raised while loading a provider.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("failed to parse stylesheet: {0}")]
    Parse(#[from] ParseError),
}

/// Identifies a provider added to a [`StyleCascade`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProviderId(u64);

/// Ordered set of stylesheet providers.
#[derive(Debug, Default)]
pub struct StyleCascade {
    providers: Vec<(ProviderId, CompiledStylesheet)>,
    next_id: u64,
}

impl StyleCascade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a compiled sheet. Its priority is the one it was compiled with.
    pub fn add(&mut self, sheet: CompiledStylesheet) -> ProviderId {
        self.next_id += 1;
        let id = ProviderId(self.next_id);
        // Stable: equal priorities keep insertion order.
        let pos = self
            .providers
            .partition_point(|(_, s)| s.priority() <= sheet.priority());
        self.providers.insert(pos, (id, sheet));
        id
    }

    /// Parse and add CSS text at `priority`.
    pub fn add_css(&mut self, css: &str, priority: u32) -> Result<ProviderId, StyleError> {
        let sheet = parse_css(css)?;
        Ok(self.add(CompiledStylesheet::compile(&sheet, priority)))
    }

    /// Remove a provider. Returns `false` if it was not present.
    pub fn remove(&mut self, id: ProviderId) -> bool {
        let before = self.providers.len();
        self.providers.retain(|(pid, _)| *pid != id);
        self.providers.len() != before
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Union of what every provider's selectors depend on.
    pub fn change(&self) -> CssChange {
        self.providers
            .iter()
            .fold(CssChange::empty(), |acc, (_, sheet)| acc | sheet.change())
    }

    /// Resolve the cascaded (not yet inherited) styles of the leaf of `path`.
    pub fn compute(&self, path: &WidgetPath) -> Styles {
        let mut matches = Vec::new();
        for (_, sheet) in &self.providers {
            sheet.collect_matches(path, &mut matches);
        }
        apply_matches(matches)
    }
}
