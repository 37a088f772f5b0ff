//! Connection management for MongoDB
//!
//! This module provides connection management functionality including:
//! - Connection establishment with retries and termination
//! - Connection pool configuration
//! - Health checks
//! - Database lookup by name and cursor opening for exports

use async_trait::async_trait;
use mongodb::bson::{Document, doc};
use mongodb::{Client, Database, options::ClientOptions};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::error::{ConnectionError, Result};
use crate::exporter::{CursorDocumentStream, DocumentCursor, DocumentSource};

/// MongoDB connection manager
///
/// Owns the driver client (which pools connections internally) and the
/// connection state. Shared by reference across exports.
pub struct ConnectionManager {
    /// MongoDB client instance
    client: Option<Client>,

    /// Connection configuration
    config: ConnectionConfig,

    /// Current connection state
    state: Arc<RwLock<ConnectionState>>,

    /// Connection URI
    uri: String,
}

/// Connection state information
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected
    Disconnected,

    /// Currently connecting
    Connecting,

    /// Connected and ready
    Connected,

    /// Connection failed
    Failed(String),

    /// Reconnecting after failure
    Reconnecting,
}

/// Connection pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool
    pub max_size: u32,

    /// Minimum number of idle connections
    pub min_idle: u32,

    /// Connection timeout duration
    pub connection_timeout: Duration,
}

/// Health check result
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Whether the connection is healthy
    pub is_healthy: bool,

    /// Response time in milliseconds
    pub response_time_ms: u64,

    /// Server version
    pub server_version: Option<String>,
}

impl ConnectionManager {
    /// Create a new connection manager
    ///
    /// # Arguments
    /// * `uri` - MongoDB connection URI
    /// * `config` - Connection configuration
    pub fn new(uri: String, config: ConnectionConfig) -> Self {
        Self {
            client: None,
            config,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            uri,
        }
    }

    /// Establish connection to MongoDB
    ///
    /// # Returns
    /// * `Result<()>` - Success or connection error
    pub async fn connect(&mut self) -> Result<()> {
        self.set_state(ConnectionState::Connecting).await;

        let options = match Self::parse_uri(&self.uri).await {
            Ok(options) => self.configure_pool(options),
            Err(e) => {
                self.set_state(ConnectionState::Failed(e.to_string())).await;
                return Err(e);
            }
        };

        match self.connect_with_retry(options).await {
            Ok(client) => {
                self.client = Some(client);
                self.set_state(ConnectionState::Connected).await;
                info!("Connected to {}", sanitize_uri(&self.uri));
                Ok(())
            }
            Err(e) => {
                self.set_state(ConnectionState::Failed(e.to_string())).await;
                Err(e)
            }
        }
    }

    /// Disconnect from MongoDB
    ///
    /// Closes all pooled connections
    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            client.shutdown().await;
            debug!("Client shut down");
        }
        self.set_state(ConnectionState::Disconnected).await;
        Ok(())
    }

    /// Reconnect to MongoDB
    ///
    /// Drops the current client and connects again
    pub async fn reconnect(&mut self) -> Result<()> {
        self.set_state(ConnectionState::Reconnecting).await;
        self.client = None;
        self.connect().await
    }

    /// Perform health check on the connection
    ///
    /// # Returns
    /// * `Result<HealthStatus>` - Health check results or error
    pub async fn health_check(&self) -> Result<HealthStatus> {
        let started = Instant::now();
        let is_healthy = self.ping().await.is_ok();
        let response_time_ms = started.elapsed().as_millis() as u64;

        let server_version = if is_healthy {
            self.get_server_version().await.ok()
        } else {
            None
        };

        Ok(HealthStatus {
            is_healthy,
            response_time_ms,
            server_version,
        })
    }

    /// Fetch the server version via `buildInfo`
    pub async fn get_server_version(&self) -> Result<String> {
        let client = self.get_client()?;
        let info = client
            .database("admin")
            .run_command(doc! { "buildInfo": 1 })
            .await?;
        Ok(info.get_str("version").unwrap_or("unknown").to_string())
    }

    /// Get a database handle
    ///
    /// # Arguments
    /// * `name` - Database name
    ///
    /// # Returns
    /// * `Result<Database>` - Database handle or error
    pub fn get_database(&self, name: &str) -> Result<Database> {
        Ok(self.get_client()?.database(name))
    }

    /// Get the MongoDB client
    ///
    /// # Returns
    /// * `Result<&Client>` - Reference to client or error
    pub fn get_client(&self) -> Result<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| ConnectionError::NotConnected.into())
    }

    /// Get current connection state
    pub async fn get_state(&self) -> ConnectionState {
        self.state.read().await.clone()
    }

    /// Check if currently connected
    pub async fn is_connected(&self) -> bool {
        matches!(*self.state.read().await, ConnectionState::Connected)
    }

    /// Connection configuration
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Parse connection URI and create client options
    async fn parse_uri(uri: &str) -> Result<ClientOptions> {
        ClientOptions::parse(uri)
            .await
            .map_err(|e| ConnectionError::InvalidUri(format!("{}: {}", sanitize_uri(uri), e)).into())
    }

    /// Configure client options with pool settings
    fn configure_pool(&self, mut options: ClientOptions) -> ClientOptions {
        let pool = PoolConfig::from(&self.config);
        options.max_pool_size = Some(pool.max_size);
        options.min_pool_size = Some(pool.min_idle);
        options.connect_timeout = Some(pool.connection_timeout);
        options.server_selection_timeout = Some(pool.connection_timeout);
        if options.app_name.is_none() && !self.config.app_name.is_empty() {
            options.app_name = Some(self.config.app_name.clone());
        }
        options
    }

    /// Update connection state
    async fn set_state(&self, new_state: ConnectionState) {
        *self.state.write().await = new_state;
    }

    /// Attempt connection with retries
    ///
    /// Each attempt creates a client and pings the server. Attempts are
    /// separated by a linearly growing delay.
    async fn connect_with_retry(&self, options: ClientOptions) -> Result<Client> {
        let attempts = self.config.retry_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match Self::try_connect(options.clone()).await {
                Ok(client) => return Ok(client),
                Err(e) => {
                    warn!("Connection attempt {}/{} failed: {}", attempt, attempts, e);
                    last_error = e.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(Duration::from_millis(500 * u64::from(attempt))).await;
                    }
                }
            }
        }

        Err(ConnectionError::ConnectionFailed(last_error).into())
    }

    async fn try_connect(options: ClientOptions) -> Result<Client> {
        let client = Client::with_options(options)
            .map_err(|e| ConnectionError::ConnectionFailed(e.to_string()))?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| ConnectionError::PingFailed(e.to_string()))?;
        Ok(client)
    }

    /// Verify connection is alive by sending a ping
    async fn ping(&self) -> Result<()> {
        self.get_client()?
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| ConnectionError::PingFailed(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl DocumentSource for ConnectionManager {
    async fn open_cursor(
        &self,
        database: &str,
        collection: &str,
        batch_size: u32,
    ) -> Result<Box<dyn DocumentCursor>> {
        let cursor = self
            .get_database(database)?
            .collection::<Document>(collection)
            .find(doc! {})
            .batch_size(batch_size)
            .await?;
        Ok(Box::new(CursorDocumentStream::new(cursor)))
    }

    async fn close(&mut self) -> Result<()> {
        self.disconnect().await
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 10,
            min_idle: 0,
            connection_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&ConnectionConfig> for PoolConfig {
    fn from(config: &ConnectionConfig) -> Self {
        Self {
            max_size: config.max_pool_size,
            min_idle: config.min_pool_size,
            connection_timeout: config.timeout_duration(),
        }
    }
}

/// Hide credentials in a connection URI
///
/// # Arguments
/// * `uri` - The URI to sanitize
///
/// # Returns
/// * `String` - URI with everything between `://` and `@` replaced by `***`
pub fn sanitize_uri(uri: &str) -> String {
    if let Some(proto_end) = uri.find("://") {
        if let Some(host_start) = uri.rfind('@') {
            if host_start > proto_end {
                let proto = &uri[..proto_end + 3];
                let host = &uri[host_start..];
                return format!("{}***{}", proto, host);
            }
        }
    }
    uri.to_string()
}

/// Extract database name from MongoDB connection URI
///
/// # Arguments
/// * `uri` - MongoDB connection URI
///
/// # Returns
/// * `Option<String>` - Database name if found in URI
pub fn extract_database_from_uri(uri: &str) -> Option<String> {
    // Format: mongodb://[username:password@]host[:port][/database][?options]
    let after_scheme = uri.split("://").nth(1)?;
    let path_part = after_scheme.split_once('/')?.1;
    let db_name = path_part.split('?').next().unwrap_or("");
    (!db_name.is_empty()).then(|| db_name.to_string())
}
