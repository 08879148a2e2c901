//! Fragment loader.
//!
//! Fragments are fetched one at a time and injected into their placeholder
//! containers. Components fail quietly; sections replace their container
//! with an inline error so the rest of the page still reads in order.

use tracing::{debug, error};

use crate::config::{Config, SectionSlot};
use crate::dom::{html_escape, Document, Selector};
use crate::fetch::Fetcher;

/// Result of loading one fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The fragment is in place.
    Loaded,
    /// The page has no such container; nothing was fetched.
    MissingContainer,
    /// The fetch failed.
    Failed,
}

impl LoadOutcome {
    /// Whether the fragment made it into the page.
    #[must_use]
    pub fn is_loaded(self) -> bool {
        self == Self::Loaded
    }
}

/// Inline message that replaces a section whose fragment could not be loaded.
#[must_use]
pub fn section_error_html(name: &str) -> String {
    format!(
        r#"<div style="text-align:center; padding: 20px; color: white;">Error al cargar {}</div>"#,
        html_escape(name)
    )
}

async fn inject(
    doc: &mut Document,
    fetcher: &dyn Fetcher,
    config: &Config,
    slot: &SectionSlot,
) -> Result<LoadOutcome, crate::Error> {
    let container = Selector::Id(&slot.container);
    if !doc.contains(container) {
        debug!(container = %slot.container, "No container, skipping {}", slot.name);
        return Ok(LoadOutcome::MissingContainer);
    }
    let html = fetcher.fetch_text(&config.fragment_path(&slot.name)).await?;
    doc.set_inner_html(container, &html);
    debug!(container = %slot.container, "Loaded fragment {}", slot.name);
    Ok(LoadOutcome::Loaded)
}

/// Load a page component (header, footer). Failures are only logged.
pub async fn load_component(
    doc: &mut Document,
    fetcher: &dyn Fetcher,
    config: &Config,
    slot: &SectionSlot,
) -> LoadOutcome {
    match inject(doc, fetcher, config, slot).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(component = %slot.name, error = %e, "Error loading component");
            LoadOutcome::Failed
        }
    }
}

/// Load an infinite-scroll section. On failure the container shows
/// "Error al cargar <name>".
pub async fn load_section(
    doc: &mut Document,
    fetcher: &dyn Fetcher,
    config: &Config,
    slot: &SectionSlot,
) -> LoadOutcome {
    match inject(doc, fetcher, config, slot).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(section = %slot.name, error = %e, "Error loading section");
            doc.set_inner_html(Selector::Id(&slot.container), &section_error_html(&slot.name));
            LoadOutcome::Failed
        }
    }
}
