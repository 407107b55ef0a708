use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::core::error::{Error, ErrorKind, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    pub index_name: String,                     // Target index
    pub doc_type: String,                       // Document type inside the index
    pub json_dump_dir: PathBuf,                 // JsonDumpClient output directory
    pub json_docs_per_file: usize,              // Documents per dump file before rolling over
}

impl Default for ImporterConfig {
    fn default() -> Self {
        ImporterConfig {
            index_name: "photon".to_string(),
            doc_type: "place".to_string(),
            json_dump_dir: PathBuf::from("/tmp"),
            json_docs_per_file: 100_000,
        }
    }
}

impl ImporterConfig {
    /// Load a JSON config file. Missing keys keep their default.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: ImporterConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.index_name.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "index_name must not be empty".to_string(),
            ));
        }
        if self.doc_type.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "doc_type must not be empty".to_string(),
            ));
        }
        if self.json_docs_per_file == 0 {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "json_docs_per_file must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
