//! Page controller.
//!
//! [`PageController`] owns everything the page needs between events: the
//! document, the photo list behind the lightbox, the carousel position, the
//! viewport and the last on-air readout. Handlers mirror the page's event
//! wiring; [`PageController::run`] drives them from a channel alongside the
//! clock and schedule timers.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Datelike;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::carousel::{track_transform, Carousel};
use crate::clock::{format_clock, Clock};
use crate::config::{Config, SectionRole, SectionSlot};
use crate::countries::{render_options, sort_countries, Country};
use crate::dom::{Document, Selector};
use crate::error::{Error, Result};
use crate::fetch::{fetch_json, Fetcher};
use crate::form::{self, FormState};
use crate::gallery::{GalleryAssets, Key, Lightbox, LightboxCommand, Photo};
use crate::loader::{load_component, load_section};
use crate::schedule::{OnAir, Schedule};
use crate::scroll::{HeaderState, ScrollRequest};

const LIVE_CLOCK: Selector<'static> = Selector::Id("live-clock");
const CURRENT_PROGRAM: Selector<'static> = Selector::Id("current-program");
const NEXT_PROGRAM: Selector<'static> = Selector::Id("next-program");
const YEAR: Selector<'static> = Selector::Id("year");
const COUNTRY_SELECT: Selector<'static> = Selector::Id("countrySelect");
const GALLERY_TRACK: Selector<'static> = Selector::Id("gallery-track");
const GALLERY_ITEM: Selector<'static> = Selector::Class("gallery-item");
const GALLERY_MODAL: Selector<'static> = Selector::Id("gallery-modal");
const MODAL_WRAPPER: Selector<'static> = Selector::Class("modal-image-wrapper");
const MODAL_CAPTION: Selector<'static> = Selector::Id("modal-caption");
const MODAL_IMAGE: Selector<'static> = Selector::Id("modal-img");
const MODAL_WATERMARK: Selector<'static> = Selector::Class("watermark-max");
const MAIN_HEADER: Selector<'static> = Selector::Class("main-header");
const SCROLL_TOP_BUTTON: Selector<'static> = Selector::Id("scrollTopBtn");
const PLAYER_CONTAINER: Selector<'static> = Selector::Class("iframe-responsive-container");
const BODY: Selector<'static> = Selector::Tag("body");

/// Something the user or the host did to the page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// A key was pressed.
    Key(Key),
    /// The page scrolled to this vertical position.
    Scroll(f64),
    /// The viewport changed to this width.
    Resize(f64),
    /// A gallery card was clicked.
    OpenLightbox(usize),
    /// The lightbox close control was clicked.
    CloseLightbox,
    /// A lightbox arrow was clicked.
    ChangeLightboxImage(i64),
    /// A carousel arrow was clicked.
    MoveSlider(i64),
    /// The scroll-to-top button was clicked.
    ScrollToTop,
    /// A menu link to a section was clicked.
    GoTo {
        /// Target element id.
        id: String,
        /// Target's position relative to the viewport.
        element_top: f64,
    },
    /// The prayer form was submitted with these fields.
    Submit(Vec<(String, String)>),
}

impl FromStr for PageEvent {
    type Err = Error;

    /// Parse a command line such as `key ArrowRight`, `scroll 420`,
    /// `open 3`, `goto section-galeria 900` or `submit nombre=Ana pais=Nicaragua`.
    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let bad = || Error::InvalidEvent {
            line: line.to_string(),
        };
        let number = |value: Option<&str>| -> Result<f64> {
            value.and_then(|v| v.parse().ok()).ok_or_else(bad)
        };
        let step = |value: Option<&str>| -> Result<i64> {
            value.and_then(|v| v.parse().ok()).ok_or_else(bad)
        };

        let event = match command {
            "key" => Self::Key(Key::from_name(parts.next().unwrap_or_default())),
            "scroll" => Self::Scroll(number(parts.next())?),
            "resize" => Self::Resize(number(parts.next())?),
            "open" => Self::OpenLightbox(
                parts
                    .next()
                    .and_then(|v| v.parse().ok())
                    .ok_or_else(bad)?,
            ),
            "close" => Self::CloseLightbox,
            "photo" => Self::ChangeLightboxImage(step(parts.next())?),
            "slide" => Self::MoveSlider(step(parts.next())?),
            "top" => Self::ScrollToTop,
            "goto" => {
                let id = parts.next().ok_or_else(bad)?.to_string();
                Self::GoTo {
                    id,
                    element_top: number(parts.next())?,
                }
            }
            "submit" => Self::Submit(
                parts
                    .filter_map(|pair| pair.split_once('='))
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            _ => return Err(bad()),
        };
        Ok(event)
    }
}

/// Owner of the page and its session state.
#[derive(Debug)]
pub struct PageController {
    config: Config,
    fetcher: Arc<dyn Fetcher>,
    clock: Arc<dyn Clock>,
    doc: Document,
    lightbox: Lightbox,
    carousel: Carousel,
    viewport_width: f64,
    scroll_y: f64,
    form_state: FormState,
    live: bool,
    on_air: Option<OnAir>,
}

impl PageController {
    /// A controller over an already fetched page shell.
    #[must_use]
    pub fn new(
        config: Config,
        fetcher: Arc<dyn Fetcher>,
        clock: Arc<dyn Clock>,
        doc: Document,
    ) -> Self {
        let viewport_width = config.viewport.width;
        Self {
            config,
            fetcher,
            clock,
            doc,
            lightbox: Lightbox::default(),
            carousel: Carousel::default(),
            viewport_width,
            scroll_y: 0.0,
            form_state: FormState::Idle,
            live: false,
            on_air: None,
        }
    }

    /// Fetch the configured page shell and wrap it.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell cannot be fetched.
    pub async fn from_index(
        config: Config,
        fetcher: Arc<dyn Fetcher>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let html = fetcher.fetch_text(&config.site.index).await?;
        Ok(Self::new(config, fetcher, clock, Document::new(html)))
    }

    /// The page as it stands.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Consume the controller, returning the page.
    #[must_use]
    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Lightbox state.
    #[must_use]
    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    /// Carousel state.
    #[must_use]
    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    /// Last on-air readout, if the schedule has loaded.
    #[must_use]
    pub fn on_air(&self) -> Option<&OnAir> {
        self.on_air.as_ref()
    }

    /// Prayer form state.
    #[must_use]
    pub fn form_state(&self) -> FormState {
        self.form_state
    }

    /// Whether the live clock and schedule timers are running.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Load components, then sections, one after another in configured
    /// order, running each section's follow-up as it lands.
    pub async fn boot(&mut self) {
        let components: Vec<SectionSlot> = self.config.layout.components.clone();
        for slot in &components {
            let outcome =
                load_component(&mut self.doc, self.fetcher.as_ref(), &self.config, slot).await;
            if outcome.is_loaded() {
                if slot.name == "footer" {
                    let year = self.clock.now().year().to_string();
                    self.doc.set_text(YEAR, &year);
                }
                self.verify_scroll();
            }
        }

        let sections: Vec<SectionSlot> = self.config.layout.sections.clone();
        for slot in &sections {
            let outcome =
                load_section(&mut self.doc, self.fetcher.as_ref(), &self.config, slot).await;
            if outcome.is_loaded() {
                self.after_section(slot.role).await;
            }
        }

        info!("Sistema TV45 Nicaragua: Scroll Infinito activo.");
    }

    async fn after_section(&mut self, role: SectionRole) {
        match role {
            SectionRole::Home => {
                self.live = true;
                self.tick_clock();
                self.refresh_schedule().await;
            }
            SectionRole::PrayerRequests => self.init_country_selector().await,
            SectionRole::Gallery => self.init_gallery().await,
            SectionRole::Plain => {}
        }
    }

    /// Fill the country selector, sorted by name.
    pub async fn init_country_selector(&mut self) {
        if !self.doc.contains(COUNTRY_SELECT) {
            return;
        }
        let path = self.config.site.countries.clone();
        match fetch_json::<Vec<Country>>(self.fetcher.as_ref(), &path).await {
            Ok(mut countries) => {
                sort_countries(&mut countries);
                self.doc
                    .set_inner_html(COUNTRY_SELECT, &render_options(&countries));
                debug!("Country selector filled with {} entries", countries.len());
            }
            Err(e) => error!(error = %e, "Error loading country list"),
        }
    }

    /// Render the photo grid and reset the lightbox over the new list.
    pub async fn init_gallery(&mut self) {
        if !self.doc.contains(GALLERY_TRACK) {
            return;
        }
        let path = self.config.site.gallery.clone();
        match fetch_json::<Vec<Photo>>(self.fetcher.as_ref(), &path).await {
            Ok(photos) => {
                let grid = self.assets().render_grid(&photos);
                self.doc.set_inner_html(GALLERY_TRACK, &grid);
                debug!("Gallery rendered with {} photos", photos.len());
                self.lightbox = Lightbox::new(photos);
            }
            Err(e) => error!(error = %e, "Error loading gallery"),
        }
    }

    fn assets(&self) -> GalleryAssets {
        GalleryAssets {
            images_dir: self.config.site.images_dir.clone(),
            watermark: self.config.site.watermark.clone(),
        }
    }

    /// Write the current station time into the live clock.
    pub fn tick_clock(&mut self) {
        let label = format_clock(&self.clock.now());
        self.doc.set_text(LIVE_CLOCK, &label);
    }

    /// Re-read the schedule and update the on-air labels. On failure the
    /// labels keep whatever they showed before.
    pub async fn refresh_schedule(&mut self) {
        let path = self.config.site.schedule.clone();
        let schedule = match fetch_json::<Schedule>(self.fetcher.as_ref(), &path).await {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!(error = %e, "Sistema de programación no listo.");
                return;
            }
        };

        let on_air = schedule.on_air(&self.clock.now(), &self.config.schedule);
        self.doc.set_text(CURRENT_PROGRAM, &on_air.current);
        self.doc.set_text(NEXT_PROGRAM, &on_air.next);
        info!(current = %on_air.current, next = %on_air.next, "On air");
        self.on_air = Some(on_air);
    }

    /// Apply the scroll-dependent header and button state.
    pub fn verify_scroll(&mut self) {
        let state = HeaderState::at(self.scroll_y, &self.config.viewport);
        if self.doc.contains(MAIN_HEADER) {
            if state.scrolled {
                self.doc.add_class(MAIN_HEADER, "scrolled");
            } else {
                self.doc.remove_class(MAIN_HEADER, "scrolled");
            }
        }
        self.doc
            .set_style(SCROLL_TOP_BUTTON, "display", state.scroll_top_display());
    }

    /// The page scrolled.
    pub fn on_scroll(&mut self, scroll_y: f64) {
        self.scroll_y = scroll_y;
        self.verify_scroll();
    }

    /// The viewport was resized. The carousel reads the new width on its
    /// next move; the player fix waits for [`Self::apply_resize`].
    pub fn on_resize(&mut self, width: f64) {
        self.viewport_width = width;
    }

    /// Settle a resize: stretch the embedded player back to full width.
    pub fn apply_resize(&mut self) {
        self.doc.set_style_within(
            PLAYER_CONTAINER,
            Selector::Tag("iframe"),
            "width",
            "100%",
        );
    }

    /// Keyboard shortcuts, active only while the lightbox is open.
    pub fn on_key(&mut self, key: Key) {
        if !self.lightbox_shown() {
            return;
        }
        match self.lightbox.command_for(key) {
            Some(LightboxCommand::Step(direction)) => self.change_lightbox_image(direction),
            Some(LightboxCommand::Close) => self.close_lightbox(),
            None => {}
        }
    }

    fn lightbox_shown(&self) -> bool {
        self.lightbox.is_visible()
            && self.doc.style(GALLERY_MODAL, "display").as_deref() == Some("flex")
    }

    /// Open the viewer at `index`. Returns `false` if there is no modal or
    /// no such photo.
    pub fn open_lightbox(&mut self, index: usize) -> bool {
        if !self.doc.contains(GALLERY_MODAL) || self.lightbox.open(index).is_none() {
            return false;
        }
        self.update_modal_content();
        self.doc.set_style(GALLERY_MODAL, "display", "flex");
        self.doc.set_style(BODY, "overflow", "hidden");
        true
    }

    /// Hide the viewer and give the page its scrollbar back.
    pub fn close_lightbox(&mut self) {
        self.lightbox.close();
        self.doc.set_style(GALLERY_MODAL, "display", "none");
        self.doc.set_style(BODY, "overflow", "auto");
    }

    /// Show the photo `direction` steps away, wrapping around.
    pub fn change_lightbox_image(&mut self, direction: i64) {
        if self.lightbox.step(direction).is_some() {
            self.update_modal_content();
        }
    }

    fn update_modal_content(&mut self) {
        let Some(photo) = self.lightbox.current().cloned() else {
            return;
        };
        let html = self.assets().render_modal(&photo);
        if !self.doc.set_inner_html(MODAL_WRAPPER, &html) {
            return;
        }
        self.doc.set_text(MODAL_CAPTION, &photo.titulo);

        // The image is in place, so fade it in as its load handler would.
        self.doc
            .set_style(MODAL_IMAGE, "transition", "opacity 0.5s ease-in-out");
        self.doc.set_style(MODAL_IMAGE, "opacity", "1");
        self.doc.set_style(MODAL_WATERMARK, "opacity", "0.6");
    }

    /// Move the carousel by `direction` cards.
    pub fn move_slider(&mut self, direction: i64) {
        if !self.doc.contains(GALLERY_TRACK) {
            return;
        }
        let items = self.doc.count(GALLERY_ITEM);
        if let Some(offset) =
            self.carousel
                .shift(direction, items, self.viewport_width, &self.config.viewport)
        {
            self.doc
                .set_style(GALLERY_TRACK, "transform", &track_transform(offset));
        }
    }

    /// Scroll so that element `id` sits below the fixed header.
    #[must_use]
    pub fn go_to(&self, id: &str, element_top: f64) -> Option<ScrollRequest> {
        self.doc.contains(Selector::Id(id)).then(|| {
            ScrollRequest::to_anchor(element_top, self.scroll_y, self.config.viewport.header_offset)
        })
    }

    /// Scroll back to the top.
    #[must_use]
    pub fn scroll_to_top(&self) -> ScrollRequest {
        ScrollRequest::to_top()
    }

    /// Submit the prayer form. A failure re-enables the button; nothing is
    /// retried automatically.
    pub async fn submit_prayer_form(&mut self, fields: Vec<(String, String)>) -> FormState {
        let Some(submission) = form::submission(&self.doc, fields) else {
            return self.form_state;
        };

        self.form_state = FormState::Sending;
        form::mark_sending(&mut self.doc);

        match self.fetcher.submit_form(&submission).await {
            Ok(()) => {
                info!("Prayer request sent");
                form::mark_sent(&mut self.doc);
                self.form_state = FormState::Sent;
            }
            Err(e) => {
                warn!(error = %e, "Prayer request failed");
                form::mark_failed(&mut self.doc);
                self.form_state = FormState::Failed;
            }
        }
        self.form_state
    }

    /// Dispatch one event.
    pub async fn handle(&mut self, event: PageEvent) {
        match event {
            PageEvent::Key(key) => self.on_key(key),
            PageEvent::Scroll(y) => self.on_scroll(y),
            PageEvent::Resize(width) => self.on_resize(width),
            PageEvent::OpenLightbox(index) => {
                self.open_lightbox(index);
            }
            PageEvent::CloseLightbox => self.close_lightbox(),
            PageEvent::ChangeLightboxImage(direction) => self.change_lightbox_image(direction),
            PageEvent::MoveSlider(direction) => self.move_slider(direction),
            PageEvent::ScrollToTop => {
                let request = self.scroll_to_top();
                debug!(?request, "Scroll requested");
            }
            PageEvent::GoTo { id, element_top } => match self.go_to(&id, element_top) {
                Some(request) => debug!(?request, "Scroll requested"),
                None => debug!(%id, "No such anchor"),
            },
            PageEvent::Submit(fields) => {
                self.submit_prayer_form(fields).await;
            }
        }
    }

    /// Process events until the channel closes, ticking the clock and
    /// refreshing the schedule while the page is live. Resizes are acted on
    /// once they have been quiet for the configured debounce, or when the
    /// channel closes with one still pending.
    pub async fn run(mut self, mut events: mpsc::Receiver<PageEvent>) -> Self {
        let mut clock_tick = time::interval(self.config.clock_interval());
        let mut schedule_tick = time::interval(self.config.refresh_interval());
        clock_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        schedule_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // Boot already painted both readouts; skip the immediate first tick.
        clock_tick.reset();
        schedule_tick.reset();

        let debounce = self.config.resize_debounce();
        let mut resize_deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(PageEvent::Resize(width)) => {
                        self.on_resize(width);
                        resize_deadline = Some(Instant::now() + debounce);
                    }
                    Some(event) => self.handle(event).await,
                    None => {
                        if resize_deadline.take().is_some() {
                            self.apply_resize();
                        }
                        break;
                    }
                },
                _ = clock_tick.tick(), if self.live => self.tick_clock(),
                _ = schedule_tick.tick(), if self.live => self.refresh_schedule().await,
                () = sleep_until(resize_deadline), if resize_deadline.is_some() => {
                    resize_deadline = None;
                    self.apply_resize();
                }
            }
        }

        debug!("Event channel closed");
        self
    }
}

/// Parse command lines into page events until `stop` completes. Blank lines
/// are skipped and bad ones logged. Running out of input does not end the
/// session; only `stop` does. The event channel closes on return.
pub async fn forward_events<F>(
    mut lines: mpsc::UnboundedReceiver<String>,
    events: mpsc::Sender<PageEvent>,
    stop: F,
) where
    F: Future<Output = ()>,
{
    tokio::pin!(stop);
    loop {
        tokio::select! {
            () = &mut stop => break,
            line = lines.recv() => match line {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => match line.parse::<PageEvent>() {
                    Ok(event) => {
                        if events.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("{e}"),
                },
                None => {
                    debug!("Input closed; waiting for stop");
                    stop.as_mut().await;
                    break;
                }
            },
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
