//! Scroll-driven header state and anchor navigation.

use crate::config::ViewportConfig;

/// A scroll the host should perform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    /// Target vertical position.
    pub top: f64,
    /// Animate the scroll.
    pub smooth: bool,
}

impl ScrollRequest {
    /// Smooth scroll back to the top of the page.
    #[must_use]
    pub fn to_top() -> Self {
        Self {
            top: 0.0,
            smooth: true,
        }
    }

    /// Smooth scroll that puts an element just below the fixed header.
    ///
    /// `element_top` is the element's position relative to the viewport and
    /// `page_y` the current scroll position.
    #[must_use]
    pub fn to_anchor(element_top: f64, page_y: f64, header_offset: f64) -> Self {
        Self {
            top: element_top + page_y - header_offset,
            smooth: true,
        }
    }
}

/// Visibility of the scroll-dependent chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderState {
    /// `.main-header` carries the `scrolled` class.
    pub scrolled: bool,
    /// `#scrollTopBtn` is shown.
    pub show_scroll_top: bool,
}

impl HeaderState {
    /// State at a vertical scroll position.
    #[must_use]
    pub fn at(scroll_y: f64, viewport: &ViewportConfig) -> Self {
        Self {
            scrolled: scroll_y > viewport.header_scrolled_after,
            show_scroll_top: scroll_y > viewport.scroll_top_after,
        }
    }

    /// CSS `display` value for the scroll-to-top button.
    #[must_use]
    pub fn scroll_top_display(&self) -> &'static str {
        if self.show_scroll_top {
            "flex"
        } else {
            "none"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_state_thresholds() {
        let viewport = ViewportConfig::default();

        let top = HeaderState::at(0.0, &viewport);
        assert!(!top.scrolled);
        assert!(!top.show_scroll_top);
        assert_eq!(top.scroll_top_display(), "none");

        let edge = HeaderState::at(50.0, &viewport);
        assert!(!edge.scrolled);

        let past_header = HeaderState::at(51.0, &viewport);
        assert!(past_header.scrolled);
        assert!(!past_header.show_scroll_top);

        let deep = HeaderState::at(301.0, &viewport);
        assert!(deep.scrolled);
        assert!(deep.show_scroll_top);
        assert_eq!(deep.scroll_top_display(), "flex");
    }

    #[test]
    fn test_anchor_subtracts_header() {
        let request = ScrollRequest::to_anchor(400.0, 1200.0, 80.0);
        assert_eq!(request.top, 1520.0);
        assert!(request.smooth);
    }

    #[test]
    fn test_to_top() {
        assert_eq!(
            ScrollRequest::to_top(),
            ScrollRequest {
                top: 0.0,
                smooth: true
            }
        );
    }
}
