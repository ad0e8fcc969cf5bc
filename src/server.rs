//! Server builder and accept loop.
//!
//! The [`ServerBuilder`] provides a fluent API for the deployment-level
//! configuration (frame encoding, filter thresholds, inference limits).
//! [`Server::run`] accepts WebSocket connections and spawns one
//! independent [`Session`] task per client:
//!
//! ```text
//! Client 1 ──┐                     ┌─► Session task 1 ─┐
//! Client 2 ──┼─► TcpListener ──────┼─► Session task 2 ─┼─► Arc<dyn Detector>
//! Client N ──┘   (ws handshake)    └─► Session task N ─┘   (semaphore-bounded)
//! ```
//!
//! Sessions share nothing mutable; the only shared resource is the
//! read-only detector, and concurrent calls into it are bounded by a
//! process-wide semaphore so a non-thread-safe or rate-limited inference
//! backend is never over-driven.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use visionwire::{Server, config::FrameEncoding};
//!
//! #[tokio::main]
//! async fn main() -> visionwire::Result<()> {
//!     let detector = Arc::new(MyOnnxDetector::load("weights/best.onnx")?);
//!     let server = Server::builder()
//!         .encoding(FrameEncoding::BinaryGrayscale)
//!         .bind("127.0.0.1:8765", detector)
//!         .await?;
//!     server.run().await
//! }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::codec::FrameCodec;
use crate::config::{FilterConfig, FrameEncoding, InferenceConfig, DEFAULT_MAX_FRAME_PIXELS};
use crate::detect::{DetectionFilter, Detector};
use crate::error::Result;
use crate::session::Session;

/// Builder for configuring and binding a detection streaming server.
pub struct ServerBuilder {
    encoding: FrameEncoding,
    filter: FilterConfig,
    inference: InferenceConfig,
    max_frame_pixels: usize,
}

impl ServerBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            encoding: FrameEncoding::default(),
            filter: FilterConfig::default(),
            inference: InferenceConfig::default(),
            max_frame_pixels: DEFAULT_MAX_FRAME_PIXELS,
        }
    }

    /// Set the inbound frame encoding (one choice per deployment).
    pub fn encoding(mut self, encoding: FrameEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set the detection filter configuration.
    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    /// Set the maximum declared pixel count accepted from a client.
    pub fn max_frame_pixels(mut self, max: usize) -> Self {
        self.max_frame_pixels = max;
        self
    }

    /// Set the maximum concurrent detector invocations across sessions.
    pub fn max_concurrent_inference(mut self, limit: usize) -> Self {
        self.inference.max_concurrent = limit;
        self
    }

    /// Set a per-frame inference deadline.
    ///
    /// Off by default; an expired deadline is reported to the client like
    /// any other per-frame error and the session stays active.
    pub fn inference_timeout(mut self, timeout: Duration) -> Self {
        self.inference.timeout = Some(timeout);
        self
    }

    /// Bind the listener and attach the process-wide detector.
    pub async fn bind<A: ToSocketAddrs>(
        self,
        addr: A,
        detector: Arc<dyn Detector>,
    ) -> Result<Server> {
        let listener = TcpListener::bind(addr).await?;
        info!("listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            detector,
            codec: FrameCodec::with_max_pixels(self.encoding, self.max_frame_pixels),
            filter: DetectionFilter::new(self.filter),
            inference_slots: Arc::new(Semaphore::new(self.inference.max_concurrent)),
            inference_timeout: self.inference.timeout,
            next_session_id: AtomicU64::new(1),
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound detection streaming server.
pub struct Server {
    listener: TcpListener,
    detector: Arc<dyn Detector>,
    codec: FrameCodec,
    filter: DetectionFilter,
    inference_slots: Arc<Semaphore>,
    inference_timeout: Option<Duration>,
    next_session_id: AtomicU64,
}

impl Server {
    /// Create a new server builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// The address the listener is bound to (useful with port 0).
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, one session task per client.
    ///
    /// A session ending, cleanly or with a transport fault, never
    /// affects the accept loop or any other session.
    pub async fn run(self) -> Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let session = self.new_session();

            debug!(session = session.id(), %peer, "accepted connection");

            tokio::spawn(async move {
                match tokio_tungstenite::accept_async(stream).await {
                    Ok(ws) => {
                        if let Err(err) = session.run(ws).await {
                            error!("session ended with transport fault: {err}");
                        }
                    }
                    Err(err) => warn!(%peer, "WebSocket handshake failed: {err}"),
                }
            });
        }
    }

    fn new_session(&self) -> Session {
        Session::new(
            self.next_session_id.fetch_add(1, Ordering::Relaxed),
            self.codec.clone(),
            self.filter.clone(),
            Arc::clone(&self.detector),
            Arc::clone(&self.inference_slots),
            self.inference_timeout,
        )
    }
}
