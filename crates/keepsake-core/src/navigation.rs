#![forbid(unsafe_code)]

//! Smooth scrolling for in-page anchor links.

use crate::command::{CommandQueue, EventDisposition, PageCommand};
use crate::metrics::LayoutMetricsProvider;

const LOG_TARGET: &str = "keepsake.nav";

/// Fragment id named by an in-page `href`, if any.
///
/// `"#"` alone and hrefs that do not start with `#` yield `None`.
#[must_use]
pub fn anchor_id(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Anchor-click handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorNavigator;

impl AnchorNavigator {
    /// Handle a click on a link with the given `href`.
    ///
    /// Links with a known target get a smooth scroll and the default jump is
    /// prevented; everything else is left to the browser.
    pub fn on_anchor_click(
        &self,
        href: &str,
        host: &dyn LayoutMetricsProvider,
        out: &mut CommandQueue,
    ) -> EventDisposition {
        let Some(id) = anchor_id(href) else {
            return EventDisposition::PASS;
        };
        if !host.has_anchor_target(id) {
            tracing::debug!(target: LOG_TARGET, id, "anchor target not found");
            return EventDisposition::PASS;
        }
        out.push(PageCommand::ScrollToAnchor { id: id.to_string() });
        EventDisposition::PREVENT
    }
}
