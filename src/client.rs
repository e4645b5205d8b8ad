use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::config::Endpoints;
use crate::domain::MapId;
use crate::error::KeggError;

/// Network seam for everything fetched from KEGG.
pub trait KeggClient: Send + Sync {
    /// HTML description page of a pathway map. Non-2xx responses are returned
    /// as text as well: KEGG reports missing maps inside a normal page.
    fn fetch_pathway_page(&self, id: &MapId) -> Result<String, KeggError>;
    fn fetch_pathway_image(&self, id: &MapId) -> Result<Vec<u8>, KeggError>;
    fn fetch_htext(&self, name: &str) -> Result<String, KeggError>;
    fn fetch_organism_list(&self) -> Result<String, KeggError>;
}

#[derive(Clone)]
pub struct KeggHttpClient {
    client: Client,
    endpoints: Endpoints,
}

impl KeggHttpClient {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self, KeggError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("kegg-pathway/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| KeggError::Http(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| KeggError::Http(err.to_string()))?;
        Ok(Self { client, endpoints })
    }

    pub fn pathway_page_url(&self, id: &MapId) -> String {
        expand_map_template(&self.endpoints.pathway_page, id)
    }

    pub fn pathway_image_url(&self, id: &MapId) -> String {
        expand_map_template(&self.endpoints.pathway_image, id)
    }

    pub fn htext_url(&self, name: &str) -> String {
        self.endpoints.htext.replace("{name}", name)
    }

    fn get(&self, url: &str) -> Result<Response, KeggError> {
        self.client
            .get(url)
            .send()
            .map_err(|err| KeggError::Http(format!("{url}: {err}")))
    }

    fn handle_status(response: Response) -> Result<Response, KeggError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "KEGG request failed".to_string());
        Err(KeggError::Status { status, message })
    }
}

impl KeggClient for KeggHttpClient {
    fn fetch_pathway_page(&self, id: &MapId) -> Result<String, KeggError> {
        let url = self.pathway_page_url(id);
        self.get(&url)?
            .text()
            .map_err(|err| KeggError::Http(format!("{url}: {err}")))
    }

    fn fetch_pathway_image(&self, id: &MapId) -> Result<Vec<u8>, KeggError> {
        let url = self.pathway_image_url(id);
        let response = Self::handle_status(self.get(&url)?)?;
        let bytes = response
            .bytes()
            .map_err(|err| KeggError::Http(format!("{url}: {err}")))?;
        Ok(bytes.to_vec())
    }

    fn fetch_htext(&self, name: &str) -> Result<String, KeggError> {
        let url = self.htext_url(name);
        Self::handle_status(self.get(&url)?)?
            .text()
            .map_err(|err| KeggError::Http(format!("{url}: {err}")))
    }

    fn fetch_organism_list(&self) -> Result<String, KeggError> {
        let url = self.endpoints.organism_list.clone();
        Self::handle_status(self.get(&url)?)?
            .text()
            .map_err(|err| KeggError::Http(format!("{url}: {err}")))
    }
}

fn expand_map_template(template: &str, id: &MapId) -> String {
    template
        .replace("{id}", id.as_str())
        .replace("{code}", id.code())
}
