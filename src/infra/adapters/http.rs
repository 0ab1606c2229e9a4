//! `MetadataSource` over the ClickHouse HTTP interface.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Certificate, Client, Identity, StatusCode};
use tracing::debug;

use super::redact::redact_credentials;
use super::tsv::parse_tab_separated;
use crate::app::ports::{MetadataSource, Row, SourceError};
use crate::app::sql::bind_args;
use crate::config::ClickHouseSettings;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpSource {
    client: Client,
    endpoint: String,
    user: String,
    password: String,
}

impl HttpSource {
    /// Builds the client. Resolves the host up front when TLS validation
    /// should use a different server name.
    pub async fn connect(settings: &ClickHouseSettings) -> Result<Self, SourceError> {
        let tls = &settings.tls;
        let port = settings.port();
        let mut builder = Client::builder().timeout(REQUEST_TIMEOUT);
        let mut url_host = settings.host.clone();

        if tls.enabled {
            let material = tls
                .read_material()
                .map_err(|e| SourceError::Config(e.to_string()))?;
            if tls.skip_verify {
                builder = builder.danger_accept_invalid_certs(true);
            }
            if let Some(ca) = material.ca {
                let certificate = Certificate::from_pem(&ca)
                    .map_err(|e| SourceError::Config(format!("invalid CA certificate: {e}")))?;
                builder = builder.add_root_certificate(certificate);
            }
            if let Some(pem) = material.identity {
                let identity = Identity::from_pem(&pem)
                    .map_err(|e| SourceError::Config(format!("invalid client certificate: {e}")))?;
                builder = builder.identity(identity);
            }
            if let Some(server_name) = &tls.server_name {
                let addr = resolve(&settings.host, port).await?;
                builder = builder.resolve(server_name, addr);
                url_host.clone_from(server_name);
            }
        }

        let client = builder
            .build()
            .map_err(|e| SourceError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint(&url_host, port, tls.enabled, &settings.database),
            user: settings.user.clone(),
            password: settings.password.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn endpoint(host: &str, port: u16, secure: bool, database: &str) -> String {
    let scheme = if secure { "https" } else { "http" };
    format!(
        "{scheme}://{host}:{port}/?database={}&default_format=TabSeparated",
        urlencoding::encode(database)
    )
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr, SourceError> {
    tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| SourceError::Connection(format!("failed to resolve {host}: {e}")))?
        .next()
        .ok_or_else(|| SourceError::Connection(format!("no address found for {host}")))
}

fn transport_error(error: &reqwest::Error) -> SourceError {
    if error.is_timeout() {
        SourceError::Timeout
    } else {
        SourceError::Connection(redact_credentials(&error.to_string()))
    }
}

#[async_trait]
impl MetadataSource for HttpSource {
    async fn query(&self, statement: &str, args: &[&str]) -> Result<Vec<Row>, SourceError> {
        let sql = bind_args(statement, args)?;
        debug!(endpoint = %self.endpoint, "Sending HTTP query");

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.user, Some(&self.password))
            .body(sql)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| transport_error(&e))?;
        if status != StatusCode::OK {
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: body.trim_end().to_string(),
            });
        }

        parse_tab_separated(&body)
    }

    async fn ping(&self) -> Result<(), SourceError> {
        self.query_one("SELECT 1", &[])
            .await?
            .map(|_| ())
            .ok_or_else(|| SourceError::Malformed("empty response to SELECT 1".to_string()))
    }

    async fn close(&self) -> Result<(), SourceError> {
        Ok(())
    }
}
