use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use parking_lot::Mutex;
use tracing::{debug, error, info};
use crate::core::config::ImporterConfig;
use crate::core::error::{Error, Result};
use crate::core::types::PlaceId;
use crate::index::client::IndexClient;
use crate::index::operation::{BulkItemResult, BulkOperation, BulkResponse};

/// Writes bulk requests to newline-delimited JSON files instead of an index.
///
/// Useful to inspect what an import would send. Nothing is ever read back,
/// so every place is reported as absent and upserts always become creates.
///
/// The part of a request going to one file is encoded first and written
/// with a single call. If a write fails, the operations of that part and of
/// the rest of the request are reported as failed items; earlier parts stay
/// on disk and are reported as written.
pub struct JsonDumpClient {
    dir: PathBuf,
    index_name: String,
    doc_type: String,
    docs_per_file: usize,
    state: Mutex<DumpState>,
}

struct DumpState {
    file: Option<File>,
    file_number: usize,
    docs_in_file: usize,
    files: Vec<PathBuf>,
}

impl JsonDumpClient {
    pub fn new(config: &ImporterConfig) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.json_dump_dir)?;

        Ok(JsonDumpClient {
            dir: config.json_dump_dir.clone(),
            index_name: config.index_name.clone(),
            doc_type: config.doc_type.clone(),
            docs_per_file: config.json_docs_per_file,
            state: Mutex::new(DumpState {
                file: None,
                file_number: 0,
                docs_in_file: 0,
                files: Vec::new(),
            }),
        })
    }

    /// Files written so far, in creation order
    pub fn files(&self) -> Vec<PathBuf> {
        self.state.lock().files.clone()
    }

    fn file_path(&self, number: usize) -> PathBuf {
        self.dir.join(format!("{}_{:05}.json", self.index_name, number))
    }

    // State only moves to the next file once it is created
    fn roll_over(&self, state: &mut DumpState) -> Result<()> {
        let path = self.file_path(state.file_number);
        let file = File::create(&path)?;
        info!(path = %path.display(), "opened json dump file");

        state.file = Some(file);
        state.files.push(path);
        state.file_number += 1;
        state.docs_in_file = 0;
        Ok(())
    }

    fn encode(&self, operations: &[BulkOperation]) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        for operation in operations {
            for line in operation.to_bulk_lines(&self.index_name, &self.doc_type) {
                serde_json::to_writer(&mut buf, &line)?;
                buf.push(b'\n');
            }
        }
        Ok(buf)
    }

    fn write_chunk(state: &mut DumpState, buf: &[u8]) -> Result<()> {
        match state.file.as_mut() {
            Some(file) => {
                file.write_all(buf)?;
                file.flush()?;
                Ok(())
            }
            None => Err(Error::unavailable("no dump file open")),
        }
    }

    fn fail_all(items: &mut Vec<BulkItemResult>, operations: &[BulkOperation], err: &Error) {
        items.extend(
            operations
                .iter()
                .map(|op| BulkItemResult::failed(op.id(), op.action(), err.to_string())),
        );
    }
}

impl IndexClient for JsonDumpClient {
    fn exists(&self, _id: PlaceId) -> Result<bool> {
        Ok(false)
    }

    fn bulk(&self, operations: Vec<BulkOperation>) -> Result<BulkResponse> {
        let mut state = self.state.lock();
        let mut items = Vec::with_capacity(operations.len());
        let mut pending = operations.as_slice();

        while !pending.is_empty() {
            if state.file.is_none() || state.docs_in_file >= self.docs_per_file {
                if let Err(e) = self.roll_over(&mut state) {
                    error!(error = %e, failed = pending.len(), "could not open json dump file");
                    Self::fail_all(&mut items, pending, &e);
                    break;
                }
            }

            let room = self.docs_per_file - state.docs_in_file;
            let (chunk, rest) = pending.split_at(room.min(pending.len()));
            let buf = self.encode(chunk)?;

            if let Err(e) = Self::write_chunk(&mut state, &buf) {
                error!(error = %e, failed = pending.len(), "could not write json dump file");
                Self::fail_all(&mut items, pending, &e);
                break;
            }
            state.docs_in_file += chunk.len();
            items.extend(chunk.iter().map(|op| BulkItemResult::ok(op.id(), op.action())));
            pending = rest;
        }

        debug!(operations = items.len(), file = state.file_number, "dumped bulk request");
        Ok(BulkResponse::new(items))
    }
}
