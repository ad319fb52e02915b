//! FileTransport - appends one line per delivered destination

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use contracts::{ContractError, Transport};
use tracing::{debug, error, instrument};

/// Transport that writes each destination to a file
#[derive(Debug)]
pub struct FileTransport {
    name: String,
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileTransport {
    /// Open `path` for appending, creating parent directories as needed
    pub fn open(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        truncate: bool,
    ) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if truncate {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }
        let file = options.open(&path)?;

        Ok(Self {
            name: name.into(),
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Create from config params
    ///
    /// Params:
    /// - `path` (required): output file
    /// - `truncate` (optional, default false): start from an empty file
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let path = params
            .get("path")
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ContractError::transport_setup(&name, "missing 'path' param"))?;
        let truncate = params
            .get("truncate")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self::open(&name, path, truncate)
            .map_err(|e| ContractError::transport_setup(&name, format!("cannot open {path}: {e}")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&self) -> Result<MutexGuard<'_, BufWriter<File>>, ContractError> {
        self.writer
            .lock()
            .map_err(|_| ContractError::transport_setup(&self.name, "writer lock poisoned"))
    }
}

impl Transport for FileTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_transport_send",
        skip(self, _message),
        fields(transport = %self.name)
    )]
    async fn send(&self, destination: &str, _message: &str) -> Result<(), ContractError> {
        let mut writer = self.writer()?;
        writeln!(writer, "{destination}").map_err(|e| {
            error!(transport = %self.name, destination, error = %e, "Write failed");
            ContractError::transport_send(&self.name, destination, e.to_string())
        })
    }

    #[instrument(name = "file_transport_close", skip(self))]
    async fn close(&self) -> Result<(), ContractError> {
        self.writer()?.flush()?;
        debug!(transport = %self.name, path = %self.path.display(), "FileTransport closed");
        Ok(())
    }
}
