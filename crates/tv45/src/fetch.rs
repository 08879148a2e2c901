//! Resource fetching.
//!
//! Every fragment, JSON document and form post goes through a [`Fetcher`].
//! Two implementations exist: [`DirFetcher`] reads a static site from disk
//! and [`HttpFetcher`] talks to a deployed origin.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, Result};

/// HTTP method of a form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMethod {
    /// Fields go in the query string. The browser default.
    #[default]
    Get,
    /// Fields go in a multipart body.
    Post,
}

impl FormMethod {
    /// Parse a form's `method` attribute. Anything but `post` means GET.
    #[must_use]
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("post") => Self::Post,
            _ => Self::Get,
        }
    }
}

/// A form ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    /// Target of the form, absolute or relative to the site source.
    pub action: String,
    /// How the fields are sent.
    pub method: FormMethod,
    /// Field name/value pairs in form order.
    pub fields: Vec<(String, String)>,
}

/// Asynchronous access to the site's resources.
#[async_trait]
pub trait Fetcher: Send + Sync + std::fmt::Debug {
    /// Fetch a resource as text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FetchStatus`] for a non-success response or a missing
    /// file, or a transport error.
    async fn fetch_text(&self, path: &str) -> Result<String>;

    /// Send a form. Any success status counts as accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the submission was not accepted.
    async fn submit_form(&self, form: &FormSubmission) -> Result<()>;
}

/// Fetch a resource and decode it as JSON.
///
/// # Errors
///
/// Returns the fetch error, or [`Error::Json`] if the body does not decode.
pub async fn fetch_json<T: DeserializeOwned>(fetcher: &dyn Fetcher, path: &str) -> Result<T> {
    let body = fetcher.fetch_text(path).await?;
    Ok(serde_json::from_str(&body)?)
}

/// Choose a fetcher for the configured source.
///
/// # Errors
///
/// Returns an error if an HTTP source is not a valid URL.
pub fn fetcher_for(source: &str) -> Result<Arc<dyn Fetcher>> {
    if source.starts_with("http://") || source.starts_with("https://") {
        Ok(Arc::new(HttpFetcher::new(source)?))
    } else {
        Ok(Arc::new(DirFetcher::new(source)))
    }
}

/// Serves resources from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    /// Create a fetcher rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory resources are read from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` under the root, refusing to climb out of it.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        (!escapes).then(|| self.root.join(relative))
    }
}

#[async_trait]
impl Fetcher for DirFetcher {
    async fn fetch_text(&self, path: &str) -> Result<String> {
        let not_found = || Error::FetchStatus {
            path: path.to_string(),
            status: 404,
        };
        let full = self.resolve(path).ok_or_else(not_found)?;
        trace!("Reading {}", full.display());
        match tokio::fs::read_to_string(&full).await {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }

    async fn submit_form(&self, form: &FormSubmission) -> Result<()> {
        Err(Error::unsupported(format!(
            "form submission to {} needs an HTTP source",
            form.action
        )))
    }
}

/// Fetches resources from an HTTP origin.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    /// Create a fetcher for the origin at `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` is not a valid URL.
    pub fn new(base: &str) -> Result<Self> {
        // Relative paths resolve against the base as a directory.
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        };
        let base = Url::parse(&normalized).map_err(|source| Error::InvalidUrl {
            value: base.to_string(),
            source,
        })?;
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    /// Resolve a resource path or form action against the base.
    ///
    /// # Errors
    ///
    /// Returns an error if the result is not a valid URL.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        self.base.join(path).map_err(|source| Error::InvalidUrl {
            value: path.to_string(),
            source,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, path: &str) -> Result<String> {
        let url = self.url_for(path)?;
        debug!("GET {url}");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::FetchStatus {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.text().await?)
    }

    async fn submit_form(&self, form: &FormSubmission) -> Result<()> {
        let url = self.url_for(&form.action)?;
        let request = match form.method {
            FormMethod::Get => self.client.request(Method::GET, url).query(&form.fields),
            FormMethod::Post => {
                let multipart = form
                    .fields
                    .iter()
                    .fold(reqwest::multipart::Form::new(), |acc, (name, value)| {
                        acc.text(name.clone(), value.clone())
                    });
                self.client.request(Method::POST, url).multipart(multipart)
            }
        };

        debug!(action = %form.action, method = ?form.method, "Submitting form");
        let resp = request.header(ACCEPT, "application/json").send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::FetchStatus {
                path: form.action.clone(),
                status: status.as_u16(),
            })
        }
    }
}
