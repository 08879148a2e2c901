//! Horizontal carousel over the gallery cards.

use crate::config::ViewportConfig;

/// Scroll position of the carousel track, in items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Carousel {
    index: usize,
}

impl Carousel {
    /// First visible item.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Move by `direction` items and return the new track offset in pixels.
    ///
    /// The index stays within `[0, max(0, item_count - visible)]`. With no
    /// items nothing moves and `None` is returned.
    pub fn shift(
        &mut self,
        direction: i64,
        item_count: usize,
        width: f64,
        viewport: &ViewportConfig,
    ) -> Option<f64> {
        if item_count == 0 {
            return None;
        }
        let max_index = item_count.saturating_sub(visible_count(width, viewport));
        let target = i64::try_from(self.index)
            .ok()?
            .saturating_add(direction)
            .max(0);
        self.index = usize::try_from(target).map_or(max_index, |t| t.min(max_index));
        Some(self.offset(viewport))
    }

    /// Track offset for the current index.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn offset(&self, viewport: &ViewportConfig) -> f64 {
        self.index as f64 * (viewport.carousel_item_width + viewport.carousel_gap)
    }
}

/// Items visible at a viewport width.
#[must_use]
pub fn visible_count(width: f64, viewport: &ViewportConfig) -> usize {
    if width > viewport.carousel_breakpoint {
        viewport.visible_wide
    } else {
        viewport.visible_narrow
    }
}

/// CSS transform placing the track at `offset`.
#[must_use]
pub fn track_transform(offset: f64) -> String {
    format!("translateX(-{offset}px)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_count_breakpoint() {
        let viewport = ViewportConfig::default();
        assert_eq!(visible_count(1280.0, &viewport), 3);
        assert_eq!(visible_count(769.0, &viewport), 3);
        assert_eq!(visible_count(768.0, &viewport), 1);
        assert_eq!(visible_count(375.0, &viewport), 1);
    }

    #[test]
    fn test_shift_clamps_at_end() {
        let viewport = ViewportConfig::default();
        let mut carousel = Carousel::default();
        for _ in 0..10 {
            carousel.shift(1, 5, 1280.0, &viewport);
        }
        assert_eq!(carousel.index(), 2);
        assert_eq!(carousel.offset(&viewport), 2.0 * 315.0);
    }

    #[test]
    fn test_shift_clamps_at_start() {
        let viewport = ViewportConfig::default();
        let mut carousel = Carousel::default();
        assert_eq!(carousel.shift(-1, 5, 1280.0, &viewport), Some(0.0));
        assert_eq!(carousel.index(), 0);
    }

    #[test]
    fn test_shift_fewer_items_than_visible() {
        let viewport = ViewportConfig::default();
        let mut carousel = Carousel::default();
        carousel.shift(1, 2, 1280.0, &viewport);
        assert_eq!(carousel.index(), 0);
    }

    #[test]
    fn test_shift_without_items() {
        let viewport = ViewportConfig::default();
        let mut carousel = Carousel::default();
        assert_eq!(carousel.shift(1, 0, 1280.0, &viewport), None);
    }

    #[test]
    fn test_shift_narrow_viewport() {
        let viewport = ViewportConfig::default();
        let mut carousel = Carousel::default();
        for _ in 0..10 {
            carousel.shift(1, 5, 400.0, &viewport);
        }
        assert_eq!(carousel.index(), 4);
    }

    #[test]
    fn test_index_always_in_bounds() {
        let viewport = ViewportConfig::default();
        let moves = [1i64, 1, 5, -2, 9, -100, 3, 1, 1, -1, i64::MAX, i64::MIN];
        for count in 0..8usize {
            for width in [320.0, 1024.0] {
                let mut carousel = Carousel::default();
                let max = count.saturating_sub(visible_count(width, &viewport));
                for m in moves {
                    carousel.shift(m, count, width, &viewport);
                    assert!(carousel.index() <= max);
                }
            }
        }
    }

    #[test]
    fn test_track_transform() {
        assert_eq!(track_transform(630.0), "translateX(-630px)");
        assert_eq!(track_transform(0.0), "translateX(-0px)");
    }
}
