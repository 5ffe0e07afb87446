use super::json_records;
use crate::adapters::session::Session;
use crate::domain::model::DataFrame;
use crate::domain::ports::Source;
use crate::utils::error::Result;
use std::collections::BTreeMap;

/// HTTP GET endpoint answering with JSON objects.
#[derive(Debug, Clone)]
pub struct ApiSource {
    endpoint: String,
    headers: BTreeMap<String, String>,
}

impl ApiSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Source for ApiSource {
    type Client = Session;

    fn consume(&self, client: &Session) -> Result<DataFrame> {
        tracing::debug!("Making API request to: {}", self.endpoint);

        let mut request = client.http().get(&self.endpoint);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send()?.error_for_status()?;
        tracing::debug!("API response status: {}", response.status());

        let body: serde_json::Value = response.json()?;
        Ok(DataFrame::from_records(json_records(body)?))
    }
}
