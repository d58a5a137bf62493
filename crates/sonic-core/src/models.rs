//! Request-scoped payload models shared by the dispatcher and the audio engine.

use std::fmt;

use bytes::Bytes;

/// An uploaded audio file read into memory, paired with its original name.
///
/// `data` shares the spooled part's buffer when the part was held in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioFile {
    pub name: String,
    pub data: Bytes,
}

impl AudioFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// Payloads can be tens of megabytes; never dump them into logs.
impl fmt::Debug for AudioFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioFile")
            .field("name", &self.name)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// The single file produced by the remote engine, returned verbatim to the client.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioResult {
    pub filename: String,
    /// Extension reported by the engine (e.g. "mp3", "zip"); informational only.
    pub format: String,
    pub data: Vec<u8>,
}

impl fmt::Debug for AudioResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioResult")
            .field("filename", &self.filename)
            .field("format", &self.format)
            .field("bytes", &self.data.len())
            .finish()
    }
}
