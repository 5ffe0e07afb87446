use crate::adapters::catalog::MemoryCatalog;
use crate::domain::model::DataFrame;
use crate::domain::ports::{Catalog, Client};
use crate::utils::error::Result;
use reqwest::blocking::{Client as HttpClient, ClientBuilder};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Client handle for the bundled sources: where relative files live, the
/// HTTP client for API sources and the catalog readers publish into.
#[derive(Debug, Clone)]
pub struct Session {
    base_path: PathBuf,
    http: HttpClient,
    catalog: MemoryCatalog,
}

impl Session {
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        Self::from_http(base_path, HttpClient::builder())
    }

    pub fn with_timeout(base_path: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        Self::from_http(base_path, HttpClient::builder().timeout(timeout))
    }

    fn from_http(base_path: impl Into<PathBuf>, http: ClientBuilder) -> Result<Self> {
        Ok(Self {
            base_path: base_path.into(),
            http: http.build()?,
            catalog: MemoryCatalog::new(),
        })
    }

    /// Publish into an existing catalog instead of a fresh one.
    pub fn with_catalog(mut self, catalog: MemoryCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn views(&self) -> &MemoryCatalog {
        &self.catalog
    }
}

impl Client for Session {
    type Dataset = DataFrame;

    fn catalog(&self) -> &dyn Catalog<DataFrame> {
        &self.catalog
    }
}
