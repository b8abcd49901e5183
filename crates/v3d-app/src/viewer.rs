use reqwest::Url;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("{0:?} is not a server-relative path")]
    NotRelative(String),

    #[error("cannot join {path:?}: {reason}")]
    Join { path: String, reason: String },

    #[error("{0} is not a hierarchical URL")]
    NotHierarchical(Url),

    #[error("{url} is outside the service origin {origin}")]
    OffOrigin { url: Url, origin: Url },
}

/// Anything that can display a model given its URL.
pub trait ModelViewer {
    fn present(&mut self, url: &Url);
    fn clear(&mut self);
}

/// Joins a server-relative asset path to the service origin and stamps it
/// with `t=<stamp_millis>` so a reused path is always fetched again.
///
/// Only paths rooted at the origin are accepted; absolute and
/// scheme-relative URLs are rejected.
pub fn resolve_model_url(origin: &Url, path: &str, stamp_millis: i64) -> Result<Url, ResolveError> {
    if !path.starts_with('/') || path.starts_with("//") || path.starts_with("/\\") {
        return Err(ResolveError::NotRelative(path.to_string()));
    }

    let mut url = origin.join(path).map_err(|e| ResolveError::Join {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ResolveError::NotHierarchical(url));
    }
    if url.origin() != origin.origin() {
        return Err(ResolveError::OffOrigin { url, origin: origin.clone() });
    }
    url.query_pairs_mut().append_pair("t", &stamp_millis.to_string());
    Ok(url)
}

/// Viewer hand-off slot read by the central panel
#[derive(Debug, Default, Clone)]
pub struct ViewerSlot {
    url: Option<Url>,
}

impl ViewerSlot {
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }
}

impl ModelViewer for ViewerSlot {
    fn present(&mut self, url: &Url) {
        self.url = Some(url.clone());
    }

    fn clear(&mut self) {
        self.url = None;
    }
}
