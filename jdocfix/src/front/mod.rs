//! Front ends: turn a source file into declarations the core can fix.

pub mod java;

use anyhow::{anyhow, Result};
use std::path::Path;

pub use java::JavaFile;

/// Parse a source file based on its extension.
pub fn parse_file(path: &Path, content: &str) -> Result<JavaFile> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("java") => java::parse(content),
        _ => Err(anyhow!("unsupported file type: {}", path.display())),
    }
}
