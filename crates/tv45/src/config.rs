//! Configuration management for tv45.
//!
//! Configuration is layered with figment: built-in defaults, then a TOML
//! file, then `TV45_`-prefixed environment variables (nested keys separated
//! by `__`, e.g. `TV45_SCHEDULE__REFRESH_SECS=30`).

use std::path::PathBuf;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory under the user config dir.
const CONFIG_DIR_NAME: &str = "tv45";

/// Largest UTC offset chrono accepts, in minutes.
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the site's resources live.
    pub site: SiteConfig,
    /// Which fragments go into which containers.
    pub layout: LayoutConfig,
    /// On-air readout settings.
    pub schedule: ScheduleConfig,
    /// Viewport geometry and scroll thresholds.
    pub viewport: ViewportConfig,
}

/// Resource locations, relative to `source`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// A directory path or an `http(s)://` origin.
    pub source: String,
    /// Page shell that holds the placeholder containers.
    pub index: String,
    /// Directory holding `<name>.html` fragments.
    pub sections_dir: String,
    /// Country list JSON.
    pub countries: String,
    /// Weekly program schedule JSON.
    pub schedule: String,
    /// Gallery manifest JSON.
    pub gallery: String,
    /// Directory that gallery file names are resolved against.
    pub images_dir: String,
    /// Watermark image shown over gallery photos.
    pub watermark: String,
}

/// What a section triggers once its fragment is in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionRole {
    /// No follow-up.
    #[default]
    Plain,
    /// Starts the live clock and on-air readout.
    Home,
    /// Fills the country selector.
    PrayerRequests,
    /// Renders the photo grid.
    Gallery,
}

/// A fragment and the container it is injected into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSlot {
    /// Id of the placeholder element.
    pub container: String,
    /// Fragment name, fetched as `<sections_dir>/<name>.html`.
    pub name: String,
    /// Follow-up after a successful load.
    #[serde(default)]
    pub role: SectionRole,
}

impl SectionSlot {
    fn new(container: &str, name: &str, role: SectionRole) -> Self {
        Self {
            container: container.to_string(),
            name: name.to_string(),
            role,
        }
    }
}

/// Page composition, loaded strictly in this order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Header, footer and other chrome.
    pub components: Vec<SectionSlot>,
    /// Infinite-scroll sections.
    pub sections: Vec<SectionSlot>,
}

/// On-air readout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Station offset from UTC in minutes. Managua is UTC-6 year round.
    pub utc_offset_minutes: i32,
    /// Seconds between schedule refreshes.
    pub refresh_secs: u64,
    /// Seconds between clock ticks.
    pub clock_tick_secs: u64,
    /// Shown as the current program when no slot has started.
    pub placeholder_current: String,
    /// Shown as the next program when no slot has started.
    pub placeholder_next: String,
}

/// Viewport geometry. There is no layout engine, so sizes are configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Initial viewport width in CSS pixels.
    pub width: f64,
    /// Height of the fixed header subtracted from anchor scrolls.
    pub header_offset: f64,
    /// Scroll position past which the header is marked `scrolled`.
    pub header_scrolled_after: f64,
    /// Scroll position past which the scroll-to-top button shows.
    pub scroll_top_after: f64,
    /// Widths strictly above this show `visible_wide` carousel items.
    pub carousel_breakpoint: f64,
    /// Gap between carousel items.
    pub carousel_gap: f64,
    /// Rendered width of one carousel item.
    pub carousel_item_width: f64,
    /// Items visible above the breakpoint.
    pub visible_wide: usize,
    /// Items visible at or below the breakpoint.
    pub visible_narrow: usize,
    /// Quiet period before a resize is acted on.
    pub resize_debounce_ms: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source: ".".to_string(),
            index: "index.html".to_string(),
            sections_dir: "sections".to_string(),
            countries: "script/paises.json".to_string(),
            schedule: "script/programacion.json".to_string(),
            gallery: "script/galeria.json".to_string(),
            images_dir: "resources/img".to_string(),
            watermark: "resources/tv45nicaragua.png".to_string(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            components: vec![
                SectionSlot::new("header-load", "barra_inicio", SectionRole::Plain),
                SectionSlot::new("footer-load", "footer", SectionRole::Plain),
            ],
            sections: vec![
                SectionSlot::new("section-inicio", "inicio", SectionRole::Home),
                SectionSlot::new("section-nosotros", "nosotros", SectionRole::Plain),
                SectionSlot::new(
                    "section-oracion",
                    "pedidosdeoracion",
                    SectionRole::PrayerRequests,
                ),
                SectionSlot::new("section-donaciones", "donaciones", SectionRole::Plain),
                SectionSlot::new("section-galeria", "gallery", SectionRole::Gallery),
            ],
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: -6 * 60,
            refresh_secs: 60,
            clock_tick_secs: 1,
            placeholder_current: "TV45 Nicaragua".to_string(),
            placeholder_next: "Programación Regular".to_string(),
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            header_offset: 80.0,
            header_scrolled_after: 50.0,
            scroll_top_after: 300.0,
            carousel_breakpoint: 768.0,
            carousel_gap: 15.0,
            carousel_item_width: 300.0,
            visible_wide: 3,
            visible_narrow: 1,
            resize_debounce_ms: 250,
        }
    }
}

impl Config {
    /// Load configuration from the default file location.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A missing file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("TV45_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.schedule.refresh_secs == 0 {
            return Err(invalid("refresh_secs must be greater than 0"));
        }
        if self.schedule.clock_tick_secs == 0 {
            return Err(invalid("clock_tick_secs must be greater than 0"));
        }
        if self.schedule.utc_offset_minutes.abs() >= MAX_OFFSET_MINUTES {
            return Err(invalid(format!(
                "utc_offset_minutes ({}) must be within ±{MAX_OFFSET_MINUTES}",
                self.schedule.utc_offset_minutes
            )));
        }

        let viewport = &self.viewport;
        if viewport.visible_narrow == 0 || viewport.visible_wide == 0 {
            return Err(invalid("visible item counts must be at least 1"));
        }
        if viewport.visible_narrow > viewport.visible_wide {
            return Err(invalid(format!(
                "visible_narrow ({}) cannot be greater than visible_wide ({})",
                viewport.visible_narrow, viewport.visible_wide
            )));
        }
        if viewport.carousel_item_width < 0.0 || viewport.carousel_gap < 0.0 {
            return Err(invalid("carousel sizes cannot be negative"));
        }

        for slot in self.layout.components.iter().chain(&self.layout.sections) {
            if slot.container.trim().is_empty() || slot.name.trim().is_empty() {
                return Err(invalid(format!(
                    "layout entry has an empty container or name: {slot:?}"
                )));
            }
        }

        Ok(())
    }

    /// The station's offset from UTC.
    #[must_use]
    pub fn station_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.schedule.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// Path of a fragment, e.g. `sections/footer.html`.
    #[must_use]
    pub fn fragment_path(&self, name: &str) -> String {
        format!("{}/{name}.html", self.site.sections_dir.trim_end_matches('/'))
    }

    /// Get the schedule refresh interval as a Duration.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.refresh_secs)
    }

    /// Get the clock tick interval as a Duration.
    #[must_use]
    pub fn clock_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.clock_tick_secs)
    }

    /// Get the resize debounce as a Duration.
    #[must_use]
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.viewport.resize_debounce_ms)
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::ConfigValidation {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_default_layout_order() {
        let layout = LayoutConfig::default();
        let names: Vec<&str> = layout.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            ["inicio", "nosotros", "pedidosdeoracion", "donaciones", "gallery"]
        );
        assert_eq!(layout.sections[0].role, SectionRole::Home);
        assert_eq!(layout.sections[4].role, SectionRole::Gallery);
        assert_eq!(layout.components[1].name, "footer");
    }

    #[test]
    fn test_station_offset_is_managua() {
        let config = Config::default();
        assert_eq!(config.station_offset().local_minus_utc(), -6 * 3600);
    }

    #[test]
    fn test_fragment_path() {
        let mut config = Config::default();
        assert_eq!(config.fragment_path("footer"), "sections/footer.html");

        config.site.sections_dir = "parts/".to_string();
        assert_eq!(config.fragment_path("inicio"), "parts/inicio.html");
    }

    #[test]
    fn test_intervals() {
        let config = Config::default();
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.clock_interval(), Duration::from_secs(1));
        assert_eq!(config.resize_debounce(), Duration::from_millis(250));
    }

    #[test]
    fn test_validate_zero_refresh() {
        let mut config = Config::default();
        config.schedule.refresh_secs = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("refresh_secs"));
    }

    #[test]
    fn test_validate_visible_counts() {
        let mut config = Config::default();
        config.viewport.visible_narrow = 4;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("visible_narrow"));

        config.viewport.visible_narrow = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_offset_range() {
        let mut config = Config::default();
        config.schedule.utc_offset_minutes = 15 * 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_section_name() {
        let mut config = Config::default();
        config.layout.sections[1].name = " ".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("layout entry"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("tv45"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[site]
source = "https://tv45.example"

[schedule]
refresh_secs = 30

[[layout.sections]]
container = "section-inicio"
name = "inicio"
role = "home"
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.site.source, "https://tv45.example");
        assert_eq!(config.site.index, "index.html");
        assert_eq!(config.schedule.refresh_secs, 30);
        assert_eq!(config.layout.sections.len(), 1);
        assert_eq!(config.layout.sections[0].role, SectionRole::Home);
    }

    #[test]
    fn test_section_role_deserialize() {
        let slot: SectionSlot = serde_json::from_str(
            r#"{"container": "section-oracion", "name": "pedidosdeoracion", "role": "prayer_requests"}"#,
        )
        .unwrap();
        assert_eq!(slot.role, SectionRole::PrayerRequests);

        let plain: SectionSlot =
            serde_json::from_str(r#"{"container": "c", "name": "n"}"#).unwrap();
        assert_eq!(plain.role, SectionRole::Plain);
    }
}
