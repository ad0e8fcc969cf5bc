//! Session lifecycle - one client connection, many frames.
//!
//! A [`Session`] owns one WebSocket connection and drives the per-frame
//! cycle: receive → decode → infer → filter → encode → send. The state
//! machine is `Connecting → Active → Closed`, with an Active self-loop per
//! processed frame.
//!
//! Per-frame isolation is an explicit branch, not an accident of unwind
//! scope: [`Session::process_message`] classifies every failure with
//! [`VisionwireError::is_per_frame`]. Decode and inference errors become
//! error responses on the same connection and the session stays Active;
//! anything outside that taxonomy, like transport-level conditions,
//! ends the loop.
//!
//! Within a session everything is strictly sequential: the loop suspends
//! only while waiting for the next inbound message or for the detector.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Semaphore;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, error, info, warn};

use crate::codec::FrameCodec;
use crate::detect::{DetectionFilter, Detector, RawDetection};
use crate::error::{Result, VisionwireError};
use crate::response::{Response, ResponseCodec};

/// Lifecycle state of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Handshake accepted, no frames processed yet.
    Connecting,
    /// Processing frames, one per inbound message.
    Active,
    /// Disconnected or faulted; no further messages are processed.
    Closed,
}

/// One client connection's streaming state machine.
pub struct Session {
    id: u64,
    state: SessionState,
    codec: FrameCodec,
    filter: DetectionFilter,
    detector: Arc<dyn Detector>,
    /// Bounds concurrent detector calls across all sessions.
    inference_slots: Arc<Semaphore>,
    inference_timeout: Option<Duration>,
}

impl Session {
    /// Create a session in the `Connecting` state.
    pub fn new(
        id: u64,
        codec: FrameCodec,
        filter: DetectionFilter,
        detector: Arc<dyn Detector>,
        inference_slots: Arc<Semaphore>,
        inference_timeout: Option<Duration>,
    ) -> Self {
        Self {
            id,
            state: SessionState::Connecting,
            codec,
            filter,
            detector,
            inference_slots,
            inference_timeout,
        }
    }

    /// Session identifier (unique per server instance).
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drive the session until the client disconnects or the transport
    /// faults.
    ///
    /// Returns `Ok(())` for a clean disconnect (expected, logged only) and
    /// an error for an unexpected transport fault. Per-frame failures
    /// never end the loop.
    pub async fn run<S>(mut self, ws: WebSocketStream<S>) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (mut sink, mut stream) = ws.split();

        self.state = SessionState::Active;
        debug!(session = self.id, "session active");

        while let Some(next) = stream.next().await {
            let message = match next {
                Ok(message) => message,
                Err(err) if is_clean_close(&err) => break,
                Err(err) => {
                    self.state = SessionState::Closed;
                    error!(session = self.id, "transport fault: {err}");
                    return Err(err.into());
                }
            };

            match message {
                Message::Close(_) => break,
                // Transport control traffic, not frames.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
                message @ (Message::Binary(_) | Message::Text(_)) => {
                    // Exactly one response per frame message, error or not.
                    let response = match self.process_message(&message).await {
                        Ok(response) => response,
                        Err(err) => {
                            self.state = SessionState::Closed;
                            error!(session = self.id, "unrecoverable frame fault: {err}");
                            return Err(err);
                        }
                    };
                    let text = ResponseCodec::encode(&response)?;

                    if let Err(err) = sink.send(Message::text(text)).await {
                        if is_clean_close(&err) {
                            break;
                        }
                        self.state = SessionState::Closed;
                        error!(session = self.id, "transport fault on send: {err}");
                        return Err(err.into());
                    }
                }
            }
        }

        self.state = SessionState::Closed;
        info!(session = self.id, "client disconnected, session closed");
        Ok(())
    }

    /// Process one inbound frame message into exactly one response.
    ///
    /// This is the per-frame isolation point: every failure classified as
    /// recoverable by [`VisionwireError::is_per_frame`] maps to
    /// `Ok(Response::error(..))` and the caller keeps the session alive;
    /// anything else propagates and ends the session. Public so a unary
    /// (request-per-call) transport binding can reuse the
    /// decode→infer→filter→encode cycle without the loop.
    pub async fn process_message(&self, message: &Message) -> Result<Response> {
        match self.process_inner(message).await {
            Ok(detections) => Ok(Response::predictions(detections)),
            Err(err) if err.is_per_frame() => {
                warn!(session = self.id, "frame failed: {err}");
                Ok(Response::error(err.to_string()))
            }
            Err(err) => Err(err),
        }
    }

    async fn process_inner(&self, message: &Message) -> Result<Vec<RawDetection>> {
        let frame = self.codec.decode(message)?;
        let image_area = frame.area();

        let raw = self.run_inference(frame).await?;
        Ok(self.filter.filter(raw, image_area))
    }

    /// Invoke the detector on the blocking pool, bounded by the shared
    /// semaphore and the optional per-frame deadline.
    ///
    /// The permit moves into the blocking task: a timed-out call keeps
    /// holding its slot until the detector actually returns, so the
    /// concurrency bound holds even when the session has given up on the
    /// frame.
    async fn run_inference(&self, frame: crate::frame::Frame) -> Result<Vec<RawDetection>> {
        let permit = Arc::clone(&self.inference_slots)
            .acquire_owned()
            .await
            .map_err(|_| VisionwireError::Inference("inference slots closed".to_string()))?;

        let detector = Arc::clone(&self.detector);
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            detector.infer(&frame)
        });

        let joined = match self.inference_timeout {
            Some(limit) => tokio::time::timeout(limit, handle)
                .await
                .map_err(|_| VisionwireError::InferenceTimeout(limit))?,
            None => handle.await,
        };

        joined.map_err(|err| {
            VisionwireError::Inference(format!("inference task failed: {err}"))
        })?
    }
}

/// Whether a WebSocket error means the peer went away in an expected way.
///
/// A client dropping the TCP connection without a close handshake is
/// routine for browser tabs; it closes the session cleanly rather than
/// being escalated as a fault.
fn is_clean_close(err: &WsError) -> bool {
    matches!(
        err,
        WsError::ConnectionClosed
            | WsError::AlreadyClosed
            | WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake)
    )
}
