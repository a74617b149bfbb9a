//! E-book delivery configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Location of the purchasable e-book on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct EbookConfig {
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Name offered to the browser in `Content-Disposition`
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Default for EbookConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            file_name: default_file_name(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("assets/ebooks/zenith-meditation-guide.pdf")
}

fn default_file_name() -> String {
    "zenith-meditation-guide.pdf".to_string()
}
