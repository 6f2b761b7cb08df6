use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::DeployConfig;
use crate::error::Result;

/// Hosting descriptor dropped next to the built html.
#[derive(Debug, Serialize)]
struct Descriptor {
    #[serde(rename = "cleanUrls")]
    clean_urls: bool,
}

/// Writes the descriptor into `html_dir`, replacing any previous one.
///
/// Returns the written path, or `None` when descriptors are disabled.
pub fn write_descriptor(html_dir: &Path, deploy: &DeployConfig) -> Result<Option<PathBuf>> {
    if !deploy.write_descriptor {
        return Ok(None);
    }

    let descriptor = Descriptor {
        clean_urls: deploy.clean_urls,
    };
    let body = serde_json::to_string_pretty(&descriptor)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let path = html_dir.join(&deploy.descriptor_file);
    fs::write(&path, body + "\n")?;
    Ok(Some(path))
}
