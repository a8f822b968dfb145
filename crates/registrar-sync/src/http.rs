//! HTTP client for the company registry's profile, filing-history, and officers endpoints.

use async_trait::async_trait;
use registrar_core::{CompanyProfile, FilingHistory, OfficerList, OfficerRecord};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::{RegistryConfig, RegistryError, RegistrySource};

/// Authenticated read-only client for the registry API.
///
/// One GET per call, no retries. Anything other than `200 OK` is an error.
pub struct RegistryClient {
    client: reqwest::Client,
    config: RegistryConfig,
}

impl RegistryClient {
    /// Build a client whose every request is bounded by `config.timeout()`.
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn profile_url(&self, company_number: &str) -> String {
        format!("{}/company/{company_number}", self.config.base_url())
    }

    fn filing_history_url(&self, company_number: &str) -> String {
        format!("{}/company/{company_number}/filing-history", self.config.base_url())
    }

    fn officers_url(&self, company_number: &str) -> String {
        format!("{}/company/{company_number}/officers", self.config.base_url())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RegistryError> {
        debug!(url = %url, "registry GET");
        let resp = self
            .client
            .get(url)
            .basic_auth(self.config.api_key(), Some(""))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        if status != StatusCode::OK {
            return Err(RegistryError::from_status(status.as_u16(), body));
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn transport_error(&self, err: reqwest::Error) -> RegistryError {
        if err.is_timeout() {
            RegistryError::Timeout(self.config.timeout())
        } else {
            RegistryError::Http(err)
        }
    }
}

#[async_trait]
impl RegistrySource for RegistryClient {
    async fn fetch_profile(&self, company_number: &str) -> Result<CompanyProfile, RegistryError> {
        let profile: CompanyProfile = self.get_json(&self.profile_url(company_number)).await?;
        info!(company_number, name = %profile.company_name, "fetched company profile");
        Ok(profile)
    }

    async fn fetch_filing_history(
        &self,
        company_number: &str,
    ) -> Result<FilingHistory, RegistryError> {
        let raw: serde_json::Value = self
            .get_json(&self.filing_history_url(company_number))
            .await?;
        let history = FilingHistory::from_value(raw)?;
        info!(company_number, count = history.items.len(), "fetched filing history");
        Ok(history)
    }

    async fn fetch_officers(
        &self,
        company_number: &str,
    ) -> Result<Vec<OfficerRecord>, RegistryError> {
        let officers: OfficerList = self.get_json(&self.officers_url(company_number)).await?;
        info!(company_number, count = officers.items.len(), "fetched officers");
        Ok(officers.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Client that ignores any proxy settings in the environment, so requests
    /// reach the loopback responder directly.
    fn local_client(base_url: &str, timeout: Duration) -> RegistryClient {
        let config = RegistryConfig::new("test-key")
            .with_base_url(base_url)
            .with_timeout(timeout);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .unwrap();
        RegistryClient { client, config }
    }

    async fn read_request(sock: &mut tokio::net::TcpStream) -> String {
        let mut req = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = sock.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            req.extend_from_slice(&buf[..n]);
            if req.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        String::from_utf8_lossy(&req).into_owned()
    }

    /// Answer exactly one request with `status_line` and `body`; the handle
    /// yields the raw request head.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let request = read_request(&mut sock).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(response.as_bytes()).await.unwrap();
            let _ = sock.shutdown().await;
            request
        });
        (format!("http://{addr}"), handle)
    }

    fn header<'a>(request: &'a str, name: &str) -> Option<&'a str> {
        request.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    #[test]
    fn endpoint_urls() {
        let client = local_client("http://localhost:4000/", Duration::from_secs(1));
        assert_eq!(
            client.profile_url("01234567"),
            "http://localhost:4000/company/01234567"
        );
        assert_eq!(
            client.filing_history_url("01234567"),
            "http://localhost:4000/company/01234567/filing-history"
        );
        assert_eq!(
            client.officers_url("01234567"),
            "http://localhost:4000/company/01234567/officers"
        );
    }

    #[tokio::test]
    async fn profile_sends_basic_auth_and_parses() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"company_number":"01234567","company_name":"ACME WIDGETS LIMITED",
                "company_status":"active","date_of_creation":"1999-03-14"}"#,
        )
        .await;
        let client = local_client(&base, Duration::from_secs(5));

        let profile = client.fetch_profile("01234567").await.unwrap();
        assert_eq!(profile.company_name, "ACME WIDGETS LIMITED");
        assert_eq!(profile.company_status, "active");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /company/01234567 "), "{request}");
        // base64("test-key:") — the key as username, empty password.
        assert_eq!(header(&request, "authorization"), Some("Basic dGVzdC1rZXk6"));
    }

    #[tokio::test]
    async fn officers_returns_items() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"items":[{"name":"SMITH, Jane","officer_role":"director",
                "appointed_on":"2015-04-01"}],"active_count":1}"#,
        )
        .await;
        let client = local_client(&base, Duration::from_secs(5));

        let officers = client.fetch_officers("01234567").await.unwrap();
        assert_eq!(officers.len(), 1);
        assert_eq!(officers[0].officer_role, "director");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /company/01234567/officers "));
    }

    #[tokio::test]
    async fn filing_history_without_items_is_empty() {
        let (base, server) = serve_once("200 OK", r#"{"total_count":0}"#).await;
        let client = local_client(&base, Duration::from_secs(5));

        let history = client.fetch_filing_history("01234567").await.unwrap();
        assert!(history.items.is_empty());
        assert_eq!(history.raw, serde_json::json!({ "total_count": 0 }));

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /company/01234567/filing-history "));
    }

    #[tokio::test]
    async fn not_found_is_distinct_from_other_errors() {
        let (base, _server) = serve_once(
            "404 Not Found",
            r#"{"errors":[{"error":"company-profile-not-found"}]}"#,
        )
        .await;
        let client = local_client(&base, Duration::from_secs(5));
        let err = client.fetch_profile("00000000").await.unwrap_err();
        assert!(
            matches!(err, RegistryError::NotFound { ref body } if body.contains("not-found"))
        );

        let (base, _server) = serve_once("500 Internal Server Error", "oops").await;
        let client = local_client(&base, Duration::from_secs(5));
        let err = client.fetch_profile("00000000").await.unwrap_err();
        assert!(matches!(err, RegistryError::Status { status: 500, ref body } if body == "oops"));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_unauthorized() {
        let (base, _server) =
            serve_once("401 Unauthorized", r#"{"error":"Invalid Authorization"}"#).await;
        let client = local_client(&base, Duration::from_secs(5));
        let err = client.fetch_officers("01234567").await.unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized { .. }));
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn malformed_body_is_json_error() {
        let (base, _server) = serve_once("200 OK", "not json").await;
        let client = local_client(&base, Duration::from_secs(5));
        let err = client.fetch_profile("01234567").await.unwrap_err();
        assert!(matches!(err, RegistryError::Json(_)));
    }

    #[tokio::test]
    async fn slow_registry_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            read_request(&mut sock).await;
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let timeout = Duration::from_millis(200);
        let client = local_client(&format!("http://{addr}"), timeout);
        let err = client.fetch_profile("01234567").await.unwrap_err();
        assert!(matches!(err, RegistryError::Timeout(t) if t == timeout));

        server.abort();
    }
}
