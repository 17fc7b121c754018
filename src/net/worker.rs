//! Background execution of collaborator calls.
//!
//! Each call runs on a spawned thread and reports back over an `mpsc`
//! channel that the UI polls once per frame with `try_recv`. Calls may
//! overlap: a restart can leave an old call in flight while the new cycle
//! dispatches its own, so every outcome carries its cycle tag and the
//! journey discards the stale ones. Metadata-before-image ordering is the
//! journey's job — it only issues the image request once the metadata
//! outcome has arrived.

use std::sync::{mpsc, Arc};

use crate::journey::Request;
use crate::net::client::{Collaborator, ConstellationMetadata, GenerateError};
use crate::sketch::{self, FRAME_HEIGHT, FRAME_WIDTH};

/// A finished collaborator call, tagged with the cycle it was issued for.
#[derive(Debug)]
pub enum Outcome {
    Metadata {
        cycle: u64,
        result: Result<ConstellationMetadata, GenerateError>,
    },
    Image {
        cycle: u64,
        result: Result<Vec<u8>, GenerateError>,
    },
    Edit {
        cycle: u64,
        result: Result<Vec<u8>, GenerateError>,
    },
}

/// Runs collaborator calls on background threads, one channel per call.
pub struct GenerationWorker {
    client: Arc<dyn Collaborator>,
    pending: Vec<mpsc::Receiver<Outcome>>,
}

impl GenerationWorker {
    pub fn new(client: Arc<dyn Collaborator>) -> Self {
        Self {
            client,
            pending: Vec::new(),
        }
    }

    /// Whether any call is currently in flight.
    pub fn busy(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Run `request` in the background. `notify` is invoked when the result
    /// is ready (the app passes a `request_repaint` closure). Never refuses:
    /// a request for a fresh cycle must not wait on a stale call that is
    /// still in flight.
    pub fn dispatch(&mut self, request: Request, notify: impl FnOnce() + Send + 'static) {
        let (tx, rx) = mpsc::channel();
        self.pending.push(rx);
        let client = Arc::clone(&self.client);

        std::thread::spawn(move || {
            let outcome = run_request(client.as_ref(), request);
            let _ = tx.send(outcome);
            notify();
        });
    }

    /// Poll for a finished call. Call every frame; returns at most one
    /// outcome per call.
    pub fn poll(&mut self) -> Option<Outcome> {
        let mut i = 0;
        while i < self.pending.len() {
            match self.pending[i].try_recv() {
                Ok(outcome) => {
                    self.pending.remove(i);
                    return Some(outcome);
                }
                Err(mpsc::TryRecvError::Empty) => i += 1,
                Err(mpsc::TryRecvError::Disconnected) => {
                    // Worker thread died without reporting; drop the channel
                    // so it does not linger as phantom in-flight work.
                    log::error!("generation worker channel disconnected");
                    self.pending.remove(i);
                }
            }
        }
        None
    }
}

fn run_request(client: &dyn Collaborator, request: Request) -> Outcome {
    match request {
        Request::Metadata {
            cycle,
            points,
            viewport,
        } => Outcome::Metadata {
            cycle,
            result: client.generate_metadata(&points, viewport),
        },
        Request::Image {
            cycle,
            prompt,
            points,
        } => {
            let projection = sketch::project(&points, FRAME_WIDTH, FRAME_HEIGHT);
            let result = sketch::encode_png(&projection.raster)
                .map_err(|e| GenerateError {
                    message: format!("sketch encoding failed: {}", e),
                    phase: "image",
                })
                .and_then(|png| client.generate_image(&prompt, &png));
            Outcome::Image { cycle, result }
        }
        Request::Edit {
            cycle,
            image_png,
            instruction,
        } => Outcome::Edit {
            cycle,
            result: client.edit_image(&image_png, &instruction),
        },
    }
}
