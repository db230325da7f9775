use crate::config::StorageConfig;
use crate::GatewayResult;
use folio_storage::memory::InMemoryContentStore;
use folio_storage::ContentStore;
use std::sync::Arc;
use tracing::info;

/// Open the content store named by `config`.
pub async fn open_store(config: &StorageConfig) -> GatewayResult<Arc<dyn ContentStore>> {
    match config {
        StorageConfig::Memory => {
            info!("using in-memory content store");
            Ok(Arc::new(InMemoryContentStore::new()))
        }
        #[cfg(feature = "mysql")]
        StorageConfig::Mysql {
            url,
            max_connections,
            connect_timeout_secs,
        } => {
            let store = folio_storage::mysql::MySqlContentStore::connect_with_options(
                url,
                *max_connections,
                *connect_timeout_secs,
            )
            .await?;
            info!(max_connections, "using mysql content store");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mysql"))]
        StorageConfig::Mysql { .. } => Err(crate::GatewayError::Config(
            "storage type 'mysql' requires the `mysql` feature".to_string(),
        )),
    }
}
