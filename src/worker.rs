use std::collections::HashSet;
use std::sync::mpsc;
use std::thread;

use crate::config::Config;
use crate::error::LoadError;
use crate::metadata::{self, DocumentMetadata};
use crate::render;

pub struct FetchRequest {
    pub generation: u64,
    pub doc_ref: String,
    pub config: Config,
}

/// Metadata plus the raw document bytes for one load cycle. Only plain bytes
/// cross the channel; decoding and painting stay on the UI thread.
pub struct FetchedDocument {
    pub meta: DocumentMetadata,
    pub pdf_bytes: Vec<u8>,
}

pub struct FetchResult {
    pub generation: u64,
    pub doc_ref: String,
    pub outcome: Result<FetchedDocument, LoadError>,
}

/// Background thread for the network half of a load cycle: the metadata
/// round trip and the document-byte fetch. Results are tagged with the
/// generation captured at submit time so the session can discard stale ones.
pub struct FetchWorker {
    tx: mpsc::Sender<FetchRequest>,
    rx: mpsc::Receiver<FetchResult>,
    in_flight: HashSet<u64>,
}

fn run_fetch(request: &FetchRequest) -> Result<FetchedDocument, LoadError> {
    let meta = metadata::fetch_metadata(&request.config, &request.doc_ref)?;
    let pdf_bytes =
        render::load_document_bytes(&meta.storage_path, request.config.request_timeout_secs)?;
    Ok(FetchedDocument { meta, pdf_bytes })
}

impl FetchWorker {
    pub fn new() -> Self {
        let (req_tx, req_rx) = mpsc::channel::<FetchRequest>();
        let (res_tx, res_rx) = mpsc::channel::<FetchResult>();

        thread::Builder::new()
            .name("fetch-worker".into())
            .spawn(move || {
                while let Ok(request) = req_rx.recv() {
                    let outcome = run_fetch(&request);
                    if let Err(e) = &outcome {
                        log::warn!("Fetch failed for {}: {}", request.doc_ref, e);
                    }
                    let result = FetchResult {
                        generation: request.generation,
                        doc_ref: request.doc_ref,
                        outcome,
                    };
                    if res_tx.send(result).is_err() {
                        break; // main thread dropped its receiver
                    }
                }
                log::info!("Fetch worker thread exiting");
            })
            .expect("Failed to spawn fetch worker thread");

        Self {
            tx: req_tx,
            rx: res_rx,
            in_flight: HashSet::new(),
        }
    }

    /// Non-blocking submit. Returns false if this generation is already in
    /// flight.
    pub fn submit(&mut self, request: FetchRequest) -> bool {
        if !self.in_flight.insert(request.generation) {
            return false; // already in flight
        }
        self.tx.send(request).is_ok()
    }

    /// Non-blocking poll for completed results.
    pub fn poll(&mut self) -> Option<FetchResult> {
        match self.rx.try_recv() {
            Ok(result) => {
                self.in_flight.remove(&result.generation);
                Some(result)
            }
            Err(_) => None,
        }
    }

    /// True if there are no pending requests.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }
}

impl Default for FetchWorker {
    fn default() -> Self {
        Self::new()
    }
}
