//! Reading ordered parts into memory.

use std::io;

use sonic_core::{AppError, AudioFile};

use super::order::OrderedFileSet;
use super::spool::UploadedFile;

/// An accepted part could not be written to or read back from its buffer.
/// This is an environment fault, not bad input.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("failed to spool {name:?}: {source}")]
    Spool {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {name:?}: {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl PayloadError {
    pub fn spool(name: &str, source: io::Error) -> Self {
        PayloadError::Spool {
            name: name.to_string(),
            source,
        }
    }

    pub fn read(name: &str, source: io::Error) -> Self {
        PayloadError::Read {
            name: name.to_string(),
            source,
        }
    }
}

impl From<PayloadError> for AppError {
    fn from(err: PayloadError) -> Self {
        AppError::UploadRead(err.to_string())
    }
}

/// Read every ordered file to completion, preserving order. The first failed read
/// fails the whole operation and already-read buffers are dropped.
pub async fn read_payloads(files: &OrderedFileSet<'_>) -> Result<Vec<AudioFile>, PayloadError> {
    let mut payloads = Vec::with_capacity(files.len());
    for file in files.iter() {
        let data = file
            .read_all()
            .await
            .map_err(|source| PayloadError::read(file.name(), source))?;
        payloads.push(AudioFile::new(file.name(), data));
    }

    tracing::debug!(
        file_count = payloads.len(),
        total_bytes = payloads.iter().map(AudioFile::len).sum::<usize>(),
        "Read upload payloads"
    );
    Ok(payloads)
}

/// Read the optional cover image part. An absent cover is not an error.
pub async fn read_cover(cover: Option<&UploadedFile>) -> Result<Option<Vec<u8>>, PayloadError> {
    match cover {
        Some(cover) => cover
            .read_all()
            .await
            .map(|data| Some(Vec::from(data)))
            .map_err(|source| PayloadError::read(cover.name(), source)),
        None => Ok(None),
    }
}
