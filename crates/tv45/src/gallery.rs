//! Photo gallery: thumbnail cards and the lightbox viewer.

use serde::{Deserialize, Serialize};

use crate::dom::html_escape;

/// Attributes that suppress the context menu and dragging on an image.
/// A deterrent against casual saving, not a protection.
const IMAGE_GUARD: &str = r#"oncontextmenu="return false;" ondragstart="return false;" draggable="false""#;

/// One gallery photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// File name under the images directory.
    pub archivo: String,
    /// Caption.
    pub titulo: String,
}

/// Where gallery assets live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryAssets {
    /// Directory photo file names are joined to.
    pub images_dir: String,
    /// Watermark image path.
    pub watermark: String,
}

impl GalleryAssets {
    fn photo_src(&self, photo: &Photo) -> String {
        format!("{}/{}", self.images_dir.trim_end_matches('/'), photo.archivo)
    }

    /// Thumbnail card for the photo at `index`. Clicking it opens the lightbox.
    #[must_use]
    pub fn render_card(&self, index: usize, photo: &Photo) -> String {
        let title = html_escape(&photo.titulo);
        format!(
            r#"<div class="gallery-item" onclick="openLightbox({index})">
    <div class="watermark-mini">
        <img src="{watermark}" alt="TV45">
    </div>
    <img src="{src}" alt="{title}" loading="lazy" class="gallery-img" {IMAGE_GUARD}>
    <div class="gallery-info">
        <span>{title}</span>
    </div>
</div>"#,
            watermark = html_escape(&self.watermark),
            src = html_escape(&self.photo_src(photo)),
        )
    }

    /// Cards for every photo, in list order.
    #[must_use]
    pub fn render_grid(&self, photos: &[Photo]) -> String {
        photos
            .iter()
            .enumerate()
            .map(|(i, photo)| self.render_card(i, photo))
            .collect()
    }

    /// Content of the lightbox for one photo. The image starts transparent
    /// and is revealed once shown.
    #[must_use]
    pub fn render_modal(&self, photo: &Photo) -> String {
        format!(
            r#"<img id="modal-img" src="{src}" alt="{title}" style="opacity: 0;" {IMAGE_GUARD}>
<div class="watermark-max animated-watermark">
    <img src="{watermark}" alt="TV45">
</div>"#,
            src = html_escape(&self.photo_src(photo)),
            title = html_escape(&photo.titulo),
            watermark = html_escape(&self.watermark),
        )
    }
}

/// Keys the page reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Previous photo.
    ArrowLeft,
    /// Next photo.
    ArrowRight,
    /// Close the viewer.
    Escape,
    /// Anything else.
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "Escape" => Self::Escape,
            _ => Self::Other,
        }
    }
}

/// What a key press asks the viewer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxCommand {
    /// Move by this many photos.
    Step(i64),
    /// Hide the viewer.
    Close,
}

/// Full-screen viewer state over the loaded photo list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lightbox {
    photos: Vec<Photo>,
    index: usize,
    visible: bool,
}

impl Lightbox {
    /// A closed viewer over `photos`.
    #[must_use]
    pub fn new(photos: Vec<Photo>) -> Self {
        Self {
            photos,
            index: 0,
            visible: false,
        }
    }

    /// The photo list.
    #[must_use]
    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    /// Index of the displayed photo.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether the viewer is showing.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The displayed photo.
    #[must_use]
    pub fn current(&self) -> Option<&Photo> {
        self.photos.get(self.index)
    }

    /// Show the photo at `index`. Out-of-range indices leave the viewer
    /// untouched and return `None`.
    pub fn open(&mut self, index: usize) -> Option<&Photo> {
        if index >= self.photos.len() {
            return None;
        }
        self.index = index;
        self.visible = true;
        self.photos.get(index)
    }

    /// Hide the viewer; the index is kept.
    pub fn close(&mut self) {
        self.visible = false;
    }

    /// Move by `direction` photos, wrapping around both ends.
    /// An empty list stays at index 0.
    pub fn step(&mut self, direction: i64) -> Option<&Photo> {
        let len = i64::try_from(self.photos.len()).ok().filter(|&l| l > 0)?;
        let current = i64::try_from(self.index).ok()?;
        let next = (current + direction.rem_euclid(len)).rem_euclid(len);
        self.index = usize::try_from(next).ok()?;
        self.photos.get(self.index)
    }

    /// Translate a key press. Keys only act while the viewer is visible.
    #[must_use]
    pub fn command_for(&self, key: Key) -> Option<LightboxCommand> {
        if !self.visible {
            return None;
        }
        match key {
            Key::ArrowRight => Some(LightboxCommand::Step(1)),
            Key::ArrowLeft => Some(LightboxCommand::Step(-1)),
            Key::Escape => Some(LightboxCommand::Close),
            Key::Other => None,
        }
    }
}
