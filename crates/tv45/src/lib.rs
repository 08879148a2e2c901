//! `tv45` - headless engine for the TV45 Nicaragua station page
//!
//! Assembles the single-page site from its HTML fragments and JSON data,
//! keeps the live clock and on-air labels current, and drives the gallery
//! lightbox, carousel, scroll chrome and prayer form from page events.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod carousel;
pub mod cli;
pub mod clock;
pub mod config;
pub mod countries;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod form;
pub mod gallery;
pub mod loader;
pub mod logging;
pub mod page;
pub mod schedule;
pub mod scroll;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use dom::{Document, Selector};
pub use error::{Error, Result};
pub use fetch::{fetcher_for, DirFetcher, Fetcher, HttpFetcher};
pub use logging::init_logging;
pub use page::{PageController, PageEvent};
pub use schedule::{OnAir, Schedule};
