//! Static boxes - minimal runnable server example.
//!
//! This example demonstrates:
//! - Implementing the `Detector` trait (here: a stub returning fixed boxes)
//! - Configuring a server with the builder pattern
//! - The per-frame request/response cadence
//!
//! # Running with a browser client
//!
//! ```js
//! const ws = new WebSocket('ws://127.0.0.1:8765');
//! ws.onopen = () => {
//!     // 2x2 grayscale frame: u32 BE width, u32 BE height, 4 pixel bytes.
//!     const buf = new Uint8Array([0, 0, 0, 2, 0, 0, 0, 2, 10, 20, 30, 40]);
//!     ws.send(buf);
//! };
//! ws.onmessage = (e) => console.log(e.data); // {"predictions": [...]}
//! ```

use std::sync::Arc;

use visionwire::{Detector, Frame, RawDetection, Server, VisionwireError};

/// Stand-in for a real inference backend: two fixed boxes scaled to the
/// frame, regardless of content.
struct StaticBoxes;

impl Detector for StaticBoxes {
    fn infer(&self, frame: &Frame) -> Result<Vec<RawDetection>, VisionwireError> {
        let (w, h) = (frame.width() as f32, frame.height() as f32);
        Ok(vec![
            RawDetection::new([0.1 * w, 0.1 * h, 0.3 * w, 0.4 * h], 0.92, 0),
            RawDetection::new([0.5 * w, 0.5 * h, 0.7 * w, 0.9 * h], 0.81, 2),
        ])
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let server = Server::builder()
        .bind("127.0.0.1:8765", Arc::new(StaticBoxes))
        .await?;

    server.run().await?;
    Ok(())
}
