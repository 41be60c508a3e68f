// SPDX-License-Identifier: Apache-2.0
use std::collections::HashMap;
use std::time::Duration;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{ClientBuilder, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use url::Url;
use crate::config::app::{AppConfig, UpstreamConfig};
use crate::driver::{FetchedManifest, Upstream};
use crate::error::error_kind::ErrorKind;
use crate::error::cache::CacheError;
use crate::models::manifest::{MANIFEST_ACCEPT, MEDIA_TYPE_OCI_MANIFEST};
use crate::registry::digest::Digest;
use crate::registry::reference::Reference;

const DOCKER_CONTENT_DIGEST:&str = "docker-content-digest";

/// Anonymous client for the registry v2 API
pub struct RegistryClient {
    client: reqwest::Client,
    upstreams: HashMap<String, UpstreamConfig>
}

impl RegistryClient {

    pub fn new(app_config: &AppConfig) -> Result<RegistryClient, CacheError> {
        // Http client for the upstream requests
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .tcp_nodelay(true)
            .build()?;

        Ok(RegistryClient {
            client,
            upstreams: app_config.upstreams(),
        })
    }

    /// Builds the upstream URL for an API path of the reference repository
    pub fn api_url(&self, reference: &Reference, path: &str) -> Result<Url, CacheError> {
        let (schema, registry) = match self.upstreams.get(&reference.host) {
            Some(upstream) => (upstream.schema.as_str(), upstream.registry.as_str()),
            None if is_local(&reference.host) => ("http", reference.host.as_str()),
            None => ("https", reference.host.as_str()),
        };

        let url = format!("{}://{}/v2/{}/{}", schema, registry, reference.name, path);
        Url::parse(&url).map_err(|e| CacheError::new(ErrorKind::NameInvalid)
            .with_context(format!("failed to build the upstream url for {}", reference))
            .with_error(e.to_string()))
    }

    /// Turn a non successful upstream status into an error
    fn check_status(response: Response, what: &str) -> Result<Response, CacheError> {
        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::new(ErrorKind::UpstreamError)
                .with_context(format!("failed to fetch {}", what))
                .with_error(format!("upstream answered {}", status)));
        }
        Ok(response)
    }
}

#[async_trait]
impl Upstream for RegistryClient {

    async fn fetch_manifest(&self, reference: &Reference) -> Result<FetchedManifest, CacheError> {
        let url = self.api_url(reference, &format!("manifests/{}", reference.api_reference()))?;

        // Log the upstream request
        tracing::info!("Upstream: GET {}", url);

        let response = self.client.get(url)
            .header(ACCEPT, MANIFEST_ACCEPT.join(", "))
            .send().await?;
        let response = RegistryClient::check_status(response, &format!("manifest {}", reference))?;

        // Get the manifest digest from the upstream response
        let digest = response.headers().get(DOCKER_CONTENT_DIGEST)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Digest::parse(value).ok());

        // Get the content-type from the upstream response
        let mime = response.headers().get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| MEDIA_TYPE_OCI_MANIFEST.to_string());

        let data = response.bytes().await?;

        Ok(FetchedManifest { digest, mime, data })
    }

    async fn fetch_blob(&self, reference: &Reference, digest: &Digest) -> Result<Bytes, CacheError> {
        let url = self.api_url(reference, &format!("blobs/{}", digest))?;

        tracing::info!("Upstream: GET {}", url);

        let response = self.client.get(url).send().await?;
        let response = RegistryClient::check_status(response, &format!("blob {}", digest))?;

        Ok(response.bytes().await?)
    }
}

/// Local registries are reached over plain http unless configured otherwise
fn is_local(host: &str) -> bool {
    let hostname = host.split(':').next().unwrap_or(host);
    hostname == "localhost" || hostname == "127.0.0.1"
}

#[cfg(test)]
mod test {
    use crate::config::app::{AppConfig, UpstreamConfig};
    use crate::registry::client::RegistryClient;
    use crate::registry::reference::Reference;

    #[test]
    fn api_url_test() {
        let mut config = AppConfig::default();
        config.upstreams.push(UpstreamConfig {
            host: "mirror.local".to_string(),
            registry: "10.0.0.1:5000".to_string(),
            schema: "http".to_string(),
        });
        let client = RegistryClient::new(&config).expect("Failed to build client");

        let reference = Reference::parse("ghcr.io/library/nginx:1.25").unwrap();
        let url = client.api_url(&reference, &format!("manifests/{}", reference.api_reference())).unwrap();
        assert_eq!("https://ghcr.io/v2/library/nginx/manifests/1.25", url.as_str());

        let reference = Reference::parse("localhost:5001/success:latest").unwrap();
        let url = client.api_url(&reference, "manifests/latest").unwrap();
        assert_eq!("http://localhost:5001/v2/success/manifests/latest", url.as_str());

        let reference = Reference::parse("mirror.local/team/app:v1").unwrap();
        let url = client.api_url(&reference, "blobs/sha256:abc").unwrap();
        assert_eq!("http://10.0.0.1:5000/v2/team/app/blobs/sha256:abc", url.as_str());
    }
}
