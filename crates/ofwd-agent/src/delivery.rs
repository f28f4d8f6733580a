//! Best-effort delivery of payloads to the decision service.
//!
//! [`DeliveryClient::deliver`] never reports failure to its caller: transport
//! errors and non-success statuses are logged here and the event ends
//! normally. Nothing is retried.

use crate::config::{DeliveryConfig, DeliveryStrategy};
use crate::error::{AgentError, Result};
use crate::payload::DeliveryPayload;
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONNECTION, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, warn};

const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// Sink for encoded payloads.
pub trait DeliveryClient: Send + Sync {
    /// Makes one attempt to hand `payload` to the remote side.
    fn deliver(&self, payload: &DeliveryPayload);
}

#[derive(Debug, Error)]
enum DeliveryError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint answered {0}")]
    Status(StatusCode),
}

/// Blocking HTTP POST, one connection per payload.
///
/// The client keeps no idle connections, so each delivery connects, sends,
/// reads the status line and closes. Connect and total request time are
/// bounded by the configured timeouts.
#[derive(Debug, Clone)]
pub struct HttpDelivery {
    client: Client,
    endpoint: Url,
}

impl HttpDelivery {
    pub fn new(config: &DeliveryConfig) -> Result<Self> {
        let endpoint = config.endpoint_url()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        let client = Client::builder()
            .default_headers(headers)
            .pool_max_idle_per_host(0)
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AgentError::DeliverySetup(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn post(&self, body: String) -> std::result::Result<StatusCode, DeliveryError> {
        // The response, and with it the connection, is released when it
        // goes out of scope; the body is never read.
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, CONTENT_TYPE_TEXT)
            .body(body)
            .send()?;

        let status = response.status();
        if status.is_success() {
            Ok(status)
        } else {
            Err(DeliveryError::Status(status))
        }
    }
}

impl DeliveryClient for HttpDelivery {
    fn deliver(&self, payload: &DeliveryPayload) {
        match self.post(payload.encode()) {
            Ok(status) => debug!(
                endpoint = %self.endpoint,
                status = status.as_u16(),
                "Delivered topology payload"
            ),
            Err(e) => warn!(endpoint = %self.endpoint, error = %e, "Topology delivery failed"),
        }
    }
}

/// Default time dropping a [`QueuedDelivery`] waits for the backlog.
const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Hands payloads to a bounded pool of worker threads.
///
/// `deliver` never blocks: when the queue is full the payload is dropped
/// and a warning logged.
///
/// # Shutdown
///
/// Dropping the queue stops accepting work and gives the workers the
/// shutdown grace (see [`with_shutdown_grace`](Self::with_shutdown_grace))
/// to drain the backlog. Payloads still queued at the deadline are
/// discarded. Drop then joins the workers, so it can still wait for the
/// deliveries in flight, each bounded by the request timeout.
pub struct QueuedDelivery {
    sender: Option<Sender<DeliveryPayload>>,
    backlog: Receiver<DeliveryPayload>,
    exited: Receiver<()>,
    workers: Vec<JoinHandle<()>>,
    shutdown_grace: Duration,
}

impl QueuedDelivery {
    pub fn new<D: DeliveryClient + 'static>(
        inner: Arc<D>,
        workers: usize,
        capacity: usize,
    ) -> Result<Self> {
        let (sender, receiver) = bounded::<DeliveryPayload>(capacity.max(1));
        let (exit_tx, exit_rx) = unbounded();

        let mut handles = Vec::with_capacity(workers.max(1));
        for index in 0..workers.max(1) {
            let receiver = receiver.clone();
            let inner = Arc::clone(&inner);
            let exit_tx = exit_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("ofwd-delivery-{index}"))
                .spawn(move || {
                    run_worker(inner.as_ref(), receiver);
                    let _ = exit_tx.send(());
                })?;
            handles.push(handle);
        }

        debug!(workers = handles.len(), capacity, "Delivery queue started");
        Ok(Self {
            sender: Some(sender),
            backlog: receiver,
            exited: exit_rx,
            workers: handles,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        })
    }

    /// Sets how long drop waits for queued payloads before discarding them.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Payloads waiting for a worker.
    pub fn pending(&self) -> usize {
        self.backlog.len()
    }

    /// Waits until every worker has exited or `deadline` passes.
    fn await_workers(&self, deadline: Instant) -> bool {
        let mut remaining = self.workers.len();
        while remaining > 0 {
            match self.exited.recv_deadline(deadline) {
                Ok(()) => remaining -= 1,
                Err(RecvTimeoutError::Timeout) => return false,
                // Every worker is gone; the join below reports panics.
                Err(RecvTimeoutError::Disconnected) => return true,
            }
        }
        true
    }
}

fn run_worker<D: DeliveryClient + ?Sized>(inner: &D, receiver: Receiver<DeliveryPayload>) {
    for payload in receiver {
        inner.deliver(&payload);
    }
}

impl DeliveryClient for QueuedDelivery {
    fn deliver(&self, payload: &DeliveryPayload) {
        let Some(sender) = self.sender.as_ref() else {
            return;
        };
        match sender.try_send(payload.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => warn!(
                src = %dropped.src(),
                dst = %dropped.dst(),
                "Delivery queue full, dropping payload"
            ),
            Err(TrySendError::Disconnected(_)) => {
                warn!("Delivery workers gone, dropping payload")
            }
        }
    }
}

impl Drop for QueuedDelivery {
    fn drop(&mut self) {
        self.sender.take();

        let deadline = Instant::now() + self.shutdown_grace;
        if !self.await_workers(deadline) {
            let discarded = self.backlog.try_iter().count();
            if discarded > 0 {
                warn!(
                    discarded,
                    grace_ms = self.shutdown_grace.as_millis() as u64,
                    "Delivery shutdown deadline passed, discarding queued payloads"
                );
            }
        }

        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                error!("Delivery worker panicked");
            }
        }
    }
}

/// Delivery strategy resolved from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Inline,
    Queued {
        workers: usize,
        capacity: usize,
        shutdown_grace: Duration,
    },
}

impl DeliveryMode {
    pub fn from_config(config: &DeliveryConfig) -> Self {
        match config.mode {
            DeliveryStrategy::Inline => DeliveryMode::Inline,
            DeliveryStrategy::Queued => DeliveryMode::Queued {
                workers: config.workers,
                capacity: config.queue_capacity,
                shutdown_grace: config.shutdown_grace(),
            },
        }
    }

    /// Wraps `client` according to the mode.
    pub fn wrap<D: DeliveryClient + 'static>(self, client: D) -> Result<Arc<dyn DeliveryClient>> {
        let client: Arc<dyn DeliveryClient> = match self {
            DeliveryMode::Inline => Arc::new(client),
            DeliveryMode::Queued {
                workers,
                capacity,
                shutdown_grace,
            } => Arc::new(
                QueuedDelivery::new(Arc::new(client), workers, capacity)?
                    .with_shutdown_grace(shutdown_grace),
            ),
        };
        Ok(client)
    }
}

/// Builds the HTTP delivery client described by `config`.
pub fn from_config(config: &DeliveryConfig) -> Result<Arc<dyn DeliveryClient>> {
    let http = HttpDelivery::new(config)?;
    debug!(endpoint = %http.endpoint(), mode = ?config.mode, "Delivery client ready");
    DeliveryMode::from_config(config).wrap(http)
}
