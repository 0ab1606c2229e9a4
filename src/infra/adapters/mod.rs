pub mod http;
#[cfg(feature = "native")]
pub mod native;
mod redact;
pub mod tsv;

use std::sync::Arc;

use tracing::info;

use crate::app::ports::{MetadataSource, SourceError};
use crate::config::{ClickHouseSettings, Transport};

pub use http::HttpSource;
#[cfg(feature = "native")]
pub use native::NativeSource;

/// Builds the adapter for the configured transport.
pub async fn connect(settings: &ClickHouseSettings) -> Result<Arc<dyn MetadataSource>, SourceError> {
    info!(
        transport = ?settings.transport,
        host = %settings.host,
        port = settings.port(),
        database = %settings.database,
        tls = settings.tls.enabled,
        "Creating metadata source"
    );
    match settings.transport {
        Transport::Http => Ok(Arc::new(HttpSource::connect(settings).await?)),
        Transport::Native => connect_native(settings),
    }
}

#[cfg(feature = "native")]
fn connect_native(settings: &ClickHouseSettings) -> Result<Arc<dyn MetadataSource>, SourceError> {
    Ok(Arc::new(NativeSource::new(settings)?))
}

#[cfg(not(feature = "native"))]
fn connect_native(_settings: &ClickHouseSettings) -> Result<Arc<dyn MetadataSource>, SourceError> {
    Err(SourceError::Config(
        "native transport is not compiled in; enable the `native` feature or set CLICKHOUSE_USE_HTTP=true"
            .to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn http_transport_builds_http_source() {
        let settings = ClickHouseSettings {
            transport: Transport::Http,
            ..ClickHouseSettings::default()
        };

        assert!(connect(&settings).await.is_ok());
    }

    #[cfg(not(feature = "native"))]
    #[tokio::test]
    async fn native_transport_without_feature_is_config_error() {
        let result = connect(&ClickHouseSettings::default()).await;

        assert!(matches!(result, Err(SourceError::Config(_))));
    }
}
