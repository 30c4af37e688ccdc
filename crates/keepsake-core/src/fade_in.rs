#![forbid(unsafe_code)]

//! One-shot reveal of page sections as they scroll into view.

use serde::{Deserialize, Serialize};

use crate::command::{CLASS_VISIBLE, CommandQueue, ElementRole, PageCommand};
use crate::metrics::LayoutMetricsProvider;

const LOG_TARGET: &str = "keepsake.fade_in";

/// Intersection observer options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeInConfig {
    /// Visible fraction that counts as intersecting (default: 0.1).
    pub threshold: f64,
    /// CSS margin around the root (default: `"0px"`).
    pub root_margin: String,
}

impl Default for FadeInConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "0px".into(),
        }
    }
}

/// Tracks which sections are still waiting to be revealed.
#[derive(Debug, Clone, Default)]
pub struct FadeInObserver {
    config: FadeInConfig,
    pending: Vec<bool>,
}

impl FadeInObserver {
    #[must_use]
    pub fn new(config: FadeInConfig) -> Self {
        Self {
            config,
            pending: Vec::new(),
        }
    }

    /// Begin watching every section the host reports.
    ///
    /// Returns the sections the host should observe.
    pub fn start(&mut self, host: &dyn LayoutMetricsProvider) -> Vec<ElementRole> {
        let count = host.section_count();
        self.pending = vec![true; count];
        tracing::debug!(target: LOG_TARGET, sections = count, "observing sections");
        (0..count).map(ElementRole::Section).collect()
    }

    /// An intersection notification for section `index`.
    ///
    /// Returns `true` if this call revealed the section.
    pub fn on_intersection(&mut self, index: usize, intersecting: bool, out: &mut CommandQueue) -> bool {
        if !intersecting {
            return false;
        }
        let Some(pending) = self.pending.get_mut(index) else {
            tracing::trace!(target: LOG_TARGET, index, "intersection for unknown section");
            return false;
        };
        if !*pending {
            return false;
        }
        *pending = false;
        let role = ElementRole::Section(index);
        out.set_class(role, CLASS_VISIBLE, true);
        out.push(PageCommand::Unobserve { role });
        true
    }

    /// Sections not yet revealed.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.iter().filter(|pending| **pending).count()
    }

    #[must_use]
    pub fn config(&self) -> &FadeInConfig {
        &self.config
    }
}
