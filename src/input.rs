//! Raw input loading for the CLI: plain-text files or stdin.
//!
//! Thin I/O only: size limits, lossy UTF-8 decoding, emptiness check. No
//! format decoding happens here; anything other than plain text is rejected.

use std::path::Path;

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::config::TriageConfig;
use crate::error::InputError;

/// File extensions accepted as plain text.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt"];

/// Read a plain-text email from a file.
pub async fn read_file(path: &Path, config: &TriageConfig) -> Result<String, InputError> {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        let ext = ext.to_lowercase();
        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(InputError::UnsupportedFormat(ext));
        }
    }

    let size = tokio::fs::metadata(path).await?.len();
    if size > config.max_file_bytes {
        return Err(InputError::FileTooLarge {
            size,
            max: config.max_file_bytes,
        });
    }

    let bytes = tokio::fs::read(path).await?;
    debug!(path = %path.display(), bytes = bytes.len(), "Read input file");
    validate_content(decode_lossy(&bytes), config)
}

/// Read a plain-text email from stdin.
pub async fn read_stdin(config: &TriageConfig) -> Result<String, InputError> {
    read_limited(tokio::io::stdin(), config).await
}

/// Read at most one byte past the file limit, then validate.
async fn read_limited<R>(reader: R, config: &TriageConfig) -> Result<String, InputError>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    reader
        .take(config.max_file_bytes.saturating_add(1))
        .read_to_end(&mut bytes)
        .await?;

    let size = bytes.len() as u64;
    if size > config.max_file_bytes {
        return Err(InputError::FileTooLarge {
            size,
            max: config.max_file_bytes,
        });
    }
    validate_content(decode_lossy(&bytes), config)
}

/// Reject empty or oversized content.
pub fn validate_content(content: String, config: &TriageConfig) -> Result<String, InputError> {
    if content.trim().is_empty() {
        return Err(InputError::Empty);
    }
    let chars = content.chars().count();
    if chars > config.max_content_chars {
        return Err(InputError::ContentTooLong {
            chars,
            max: config.max_content_chars,
        });
    }
    Ok(content)
}

/// Decode UTF-8, dropping invalid sequences.
fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|c| *c != char::REPLACEMENT_CHARACTER)
        .collect()
}
