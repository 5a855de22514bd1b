//! `PostgreSQL` Connection Pool
//!
//! Bounded pool of `tokio-postgres` clients. Each statement checks out one
//! client for its duration; the client goes back to the idle list when the
//! guard drops, whether the statement succeeded or failed.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_postgres::{Client, Config, NoTls};

use crate::error::{Result, TablecastError};

/// Pool statistics for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub idle: usize,
    pub in_use: usize,
    pub max_size: usize,
}

struct PoolInner {
    config: Config,
    idle: Mutex<Vec<Client>>,
    permits: Arc<Semaphore>,
    max_size: usize,
}

impl PoolInner {
    async fn connect(&self) -> Result<Client> {
        let (client, connection) = self.config.connect(NoTls).await.map_err(|e| {
            TablecastError::connection_failed(format!("Failed to connect to PostgreSQL: {e}"))
        })?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(error = %e, "PostgreSQL connection closed with error");
            }
        });

        Ok(client)
    }

    fn take_idle(&self) -> Option<Client> {
        let mut idle = self.idle.lock();
        while let Some(client) = idle.pop() {
            if !client.is_closed() {
                return Some(client);
            }
        }
        None
    }
}

/// Shared handle to the pool; cheap to clone
#[derive(Clone)]
pub struct PgPool {
    inner: Arc<PoolInner>,
}

impl PgPool {
    /// Create an empty pool; connections are opened lazily on acquire
    pub fn new(config: Config, max_size: usize) -> Result<Self> {
        if max_size == 0 {
            return Err(TablecastError::config_error("Pool size must be at least 1"));
        }

        Ok(Self {
            inner: Arc::new(PoolInner {
                config,
                idle: Mutex::new(Vec::with_capacity(max_size)),
                permits: Arc::new(Semaphore::new(max_size)),
                max_size,
            }),
        })
    }

    /// Check out a client, waiting while all `max_size` clients are in use
    pub async fn acquire(&self) -> Result<PooledClient> {
        let permit = Arc::clone(&self.inner.permits)
            .acquire_owned()
            .await
            .map_err(|_| TablecastError::connection_failed("Connection pool is closed"))?;

        let client = match self.inner.take_idle() {
            Some(client) => client,
            None => self.inner.connect().await?,
        };

        Ok(PooledClient { client: Some(client), pool: Arc::clone(&self.inner), _permit: permit })
    }

    /// Verify the database answers (`SELECT NOW()`)
    pub async fn ping(&self) -> Result<()> {
        let client = self.acquire().await?;
        client.query_one("SELECT NOW()", &[]).await.map_err(|e| {
            TablecastError::connection_failed(format!("Database did not answer ping: {e}"))
        })?;
        Ok(())
    }

    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let available = self.inner.permits.available_permits();
        PoolStats {
            idle: self.inner.idle.lock().len(),
            in_use: self.inner.max_size - available,
            max_size: self.inner.max_size,
        }
    }
}

/// A checked-out client that returns to the pool when dropped
pub struct PooledClient {
    client: Option<Client>,
    pool: Arc<PoolInner>,
    _permit: OwnedSemaphorePermit,
}

impl std::ops::Deref for PooledClient {
    type Target = Client;

    fn deref(&self) -> &Self::Target {
        self.client.as_ref().expect("client is present until drop")
    }
}

impl Drop for PooledClient {
    fn drop(&mut self) {
        // The permit is released after this body runs, so the client is
        // back on the idle list before a waiter can acquire.
        if let Some(client) = self.client.take() {
            if !client.is_closed() {
                self.pool.idle.lock().push(client);
            }
        }
    }
}
