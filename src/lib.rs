//! # visionwire
//!
//! Streaming object-detection server: clients push video frames over a
//! persistent WebSocket connection, each frame runs through an external
//! detection model, and a cleaned set of bounding boxes comes back.
//!
//! ## Architecture
//!
//! ```text
//! inbound message ─► FrameCodec ─► Frame ─► Detector ─► raw detections
//!                                                            │
//! outbound message ◄─ ResponseCodec ◄─ DetectionFilter ◄─────┘
//!                                      (area reject + NMS)
//! ```
//!
//! - **Codec** ([`codec`]): two deployment-selectable frame encodings,
//!   binary grayscale (big-endian header + pixel bytes) and structured
//!   JSON RGBA. Both normalize to 3-channel RGB.
//! - **Detection** ([`detect`]): the [`Detector`] trait is the seam to the
//!   inference backend; [`detect::DetectionFilter`] rejects oversized
//!   boxes and suppresses overlaps with greedy NMS.
//! - **Session** ([`session`]): one task per connection driving
//!   `Connecting → Active → Closed`; a bad frame yields an error response,
//!   never a dropped connection.
//! - **Server** ([`server`]): accept loop, shared read-only detector,
//!   semaphore-bounded inference.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use visionwire::Server;
//!
//! #[tokio::main]
//! async fn main() -> visionwire::Result<()> {
//!     let detector = Arc::new(load_detector()?);
//!     Server::builder()
//!         .bind("0.0.0.0:8765", detector)
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

pub mod codec;
pub mod config;
pub mod detect;
pub mod error;
pub mod frame;
pub mod response;
pub mod server;
pub mod session;

pub use detect::{BoundingBox, Detector, RawDetection};
pub use error::{DecodeError, Result, VisionwireError};
pub use frame::Frame;
pub use response::{Prediction, Response};
pub use server::{Server, ServerBuilder};
pub use session::{Session, SessionState};
