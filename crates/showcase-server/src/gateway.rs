//! Persistence gateway.
//!
//! [`ProductGateway`] is the async face of the document store: one insert and
//! one newest-first listing over the `products` collection. [`SqliteGateway`]
//! opens its [`Database`] lazily on first use, shares it across requests, and
//! runs every call on the blocking pool under a timeout.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::OnceCell;
use tokio::task::JoinError;
use tracing::{info, warn};

use showcase_shared::{NewProduct, Product, ProductId};
use showcase_store::{Database, InterruptHandle, StoreError};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Document store call timed out")]
    Timeout,

    #[error("Document store worker failed: {0}")]
    Worker(String),
}

#[async_trait]
pub trait ProductGateway: Send + Sync {
    /// Persist a new product and return the id the store assigned.
    async fn insert(&self, product: NewProduct) -> Result<ProductId, GatewayError>;

    /// Every product, newest first.
    async fn list_all(&self) -> Result<Vec<Product>, GatewayError>;
}

/// The open connection plus a way to cut its current statement short.
struct StoreHandle {
    db: Mutex<Database>,
    interrupt: InterruptHandle,
}

type SharedConnection = Arc<StoreHandle>;

// Lifecycle of one store call, shared between the caller and the blocking
// worker. The worker may only run its operation after moving `QUEUED` to
// `RUNNING`; a caller that times out first moves it to `ABANDONED` instead.
// `INTERRUPTING` keeps the worker holding the connection until the caller's
// interrupt has been delivered.
const QUEUED: u8 = 0;
const RUNNING: u8 = 1;
const ABANDONED: u8 = 2;
const INTERRUPTING: u8 = 3;
const SETTLED: u8 = 4;

pub struct SqliteGateway {
    location: String,
    timeout: Duration,
    conn: OnceCell<SharedConnection>,
}

impl SqliteGateway {
    pub fn new(location: impl Into<String>, timeout: Duration) -> Self {
        Self {
            location: location.into(),
            timeout,
            conn: OnceCell::new(),
        }
    }

    /// The shared connection, opened on first use. A failed open is not
    /// cached, so the next call tries again.
    async fn handle(&self) -> Result<SharedConnection, GatewayError> {
        self.conn
            .get_or_try_init(|| async {
                let location = self.location.clone();
                let task = tokio::task::spawn_blocking(move || {
                    let db = Database::open(&location)?;
                    let existing = db.count_products()?;
                    Ok::<_, StoreError>((db, existing))
                });
                let opened = match tokio::time::timeout(self.timeout, task).await {
                    Err(_) => return Err(GatewayError::Timeout),
                    Ok(joined) => joined.map_err(worker_error)?,
                };
                match opened {
                    Ok((db, existing)) => {
                        info!(
                            location = %self.location,
                            path = ?db.path(),
                            products = existing,
                            "Document store connected"
                        );
                        Ok(Arc::new(StoreHandle {
                            interrupt: db.interrupt_handle(),
                            db: Mutex::new(db),
                        }))
                    }
                    Err(e) => {
                        warn!(
                            location = %self.location,
                            error = %e,
                            "Document store connection failed"
                        );
                        Err(GatewayError::Unavailable(e.to_string()))
                    }
                }
            })
            .await
            .cloned()
    }

    /// Run `op` on the blocking pool. A call that times out either never
    /// touches the store or has its statement interrupted, so a reported
    /// timeout leaves nothing behind.
    async fn run<T, F>(&self, op: F) -> Result<T, GatewayError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> showcase_store::Result<T> + Send + 'static,
    {
        let conn = self.handle().await?;
        let state = Arc::new(AtomicU8::new(QUEUED));

        let mut task = {
            let conn = conn.clone();
            let state = state.clone();
            tokio::task::spawn_blocking(move || {
                let guard = conn.db.lock().map_err(|_| {
                    GatewayError::Unavailable("connection lock poisoned".to_string())
                })?;
                if state
                    .compare_exchange(QUEUED, RUNNING, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    return Err(GatewayError::Timeout);
                }
                let result = op(&guard).map_err(GatewayError::from);
                while state
                    .compare_exchange(RUNNING, SETTLED, Ordering::AcqRel, Ordering::Acquire)
                    .is_err_and(|current| current == INTERRUPTING)
                {
                    std::hint::spin_loop();
                }
                result
            })
        };

        match tokio::time::timeout(self.timeout, &mut task).await {
            Ok(joined) => joined.map_err(worker_error)?,
            Err(_) => {
                if state
                    .compare_exchange(QUEUED, ABANDONED, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    warn!("Document store call timed out before it started");
                    return Err(GatewayError::Timeout);
                }
                let interrupted = state
                    .compare_exchange(RUNNING, INTERRUPTING, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok();
                if interrupted {
                    conn.interrupt.interrupt();
                    state.store(SETTLED, Ordering::Release);
                }
                // The operation already had the connection; its own outcome
                // decides what the caller sees.
                match task.await.map_err(worker_error)? {
                    Err(e) if interrupted => {
                        warn!(error = %e, "Timed out document store call was interrupted");
                        Err(GatewayError::Timeout)
                    }
                    result => result,
                }
            }
        }
    }
}

fn worker_error(e: JoinError) -> GatewayError {
    GatewayError::Worker(e.to_string())
}

#[async_trait]
impl ProductGateway for SqliteGateway {
    async fn insert(&self, product: NewProduct) -> Result<ProductId, GatewayError> {
        let stored = self.run(move |db| db.insert_product(&product)).await?;
        Ok(stored.id)
    }

    async fn list_all(&self) -> Result<Vec<Product>, GatewayError> {
        self.run(|db| db.list_products()).await
    }
}
