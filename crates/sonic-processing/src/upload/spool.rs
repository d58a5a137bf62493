//! Bounded spooling of multipart parts
//!
//! Parts are buffered in memory while the request's shared memory budget lasts. A part
//! that would overrun the budget is moved to an anonymous temporary file and continues
//! there, releasing its memory. Every chunk counts against the body ceiling, so an
//! oversized body fails as soon as the ceiling is crossed instead of after buffering.

use std::fmt;
use std::io;

use bytes::{Bytes, BytesMut};
use tempfile::{NamedTempFile, TempPath};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::payload::PayloadError;
use super::UploadError;
use crate::validator::{UploadLimits, ValidationError};

enum PartBody {
    Memory(Bytes),
    /// Removed from disk when the path is dropped.
    Disk(TempPath),
}

/// One accepted `files` (or `cover`) part.
pub struct UploadedFile {
    name: String,
    declared_size: u64,
    body: PartBody,
}

impl UploadedFile {
    pub fn in_memory(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            declared_size: data.len() as u64,
            body: PartBody::Memory(data),
        }
    }

    /// Override the recorded size. Zero means "unknown" and forces measurement.
    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.declared_size = size;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_size(&self) -> u64 {
        self.declared_size
    }

    pub fn is_spilled(&self) -> bool {
        matches!(self.body, PartBody::Disk(_))
    }

    /// Count the part's bytes by reading them to the end and discarding them.
    pub async fn measure(&self) -> io::Result<u64> {
        match &self.body {
            PartBody::Memory(data) => Ok(data.len() as u64),
            PartBody::Disk(path) => {
                let mut file = File::open(path).await?;
                tokio::io::copy(&mut file, &mut tokio::io::sink()).await
            }
        }
    }

    /// The whole part as one buffer. In-memory parts hand out a shared view of the
    /// spooled buffer; spilled parts are read back from disk.
    pub async fn read_all(&self) -> io::Result<Bytes> {
        match &self.body {
            PartBody::Memory(data) => Ok(data.clone()),
            PartBody::Disk(path) => {
                let mut file = File::open(path).await?;
                let mut data = Vec::with_capacity(self.declared_size as usize);
                file.read_to_end(&mut data).await?;
                Ok(Bytes::from(data))
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn spill_path(&self) -> Option<&std::path::Path> {
        match &self.body {
            PartBody::Memory(_) => None,
            PartBody::Disk(path) => Some(&**path),
        }
    }
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("name", &self.name)
            .field("declared_size", &self.declared_size)
            .field("spilled", &self.is_spilled())
            .finish()
    }
}

struct DiskSpill {
    file: File,
    path: TempPath,
}

/// A part being received.
pub struct SpooledPart {
    name: String,
    memory: BytesMut,
    disk: Option<DiskSpill>,
    len: u64,
}

impl SpooledPart {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Per-request spooler; owns the memory budget and the running body byte count.
#[derive(Debug)]
pub struct PartSpooler {
    limits: UploadLimits,
    memory_remaining: usize,
    body_bytes: u64,
}

impl PartSpooler {
    pub fn new(limits: UploadLimits) -> Self {
        Self {
            memory_remaining: limits.memory_buffer,
            body_bytes: 0,
            limits,
        }
    }

    /// Bytes seen so far across every part of the request.
    pub fn body_bytes(&self) -> u64 {
        self.body_bytes
    }

    /// Count bytes of a part that is not kept (settings text, unknown fields).
    pub fn account(&mut self, len: usize) -> Result<(), ValidationError> {
        self.body_bytes = self.body_bytes.saturating_add(len as u64);
        if self.body_bytes > self.limits.body_ceiling {
            return Err(ValidationError::BodyTooLarge {
                max: self.limits.body_ceiling,
            });
        }
        Ok(())
    }

    pub fn begin(&self, name: impl Into<String>) -> SpooledPart {
        SpooledPart {
            name: name.into(),
            memory: BytesMut::new(),
            disk: None,
            len: 0,
        }
    }

    pub async fn write(&mut self, part: &mut SpooledPart, chunk: &[u8]) -> Result<(), UploadError> {
        self.account(chunk.len())?;

        if part.disk.is_none() && chunk.len() <= self.memory_remaining {
            part.memory.extend_from_slice(chunk);
            self.memory_remaining -= chunk.len();
        } else {
            if part.disk.is_none() {
                self.spill(part).await?;
            }
            if let Some(disk) = part.disk.as_mut() {
                disk.file
                    .write_all(chunk)
                    .await
                    .map_err(|source| PayloadError::spool(&part.name, source))?;
            }
        }

        part.len += chunk.len() as u64;
        Ok(())
    }

    pub async fn finish(&mut self, part: SpooledPart) -> Result<UploadedFile, UploadError> {
        let SpooledPart {
            name,
            memory,
            disk,
            len,
        } = part;

        let body = match disk {
            Some(mut disk) => {
                disk.file
                    .flush()
                    .await
                    .map_err(|source| PayloadError::spool(&name, source))?;
                PartBody::Disk(disk.path)
            }
            None => PartBody::Memory(memory.freeze()),
        };

        Ok(UploadedFile {
            name,
            declared_size: len,
            body,
        })
    }

    async fn spill(&mut self, part: &mut SpooledPart) -> Result<(), PayloadError> {
        let (file, path) = NamedTempFile::new()
            .map_err(|source| PayloadError::spool(&part.name, source))?
            .into_parts();
        let mut file = File::from_std(file);

        if !part.memory.is_empty() {
            file.write_all(&part.memory)
                .await
                .map_err(|source| PayloadError::spool(&part.name, source))?;
        }

        self.memory_remaining += part.memory.len();
        part.memory = BytesMut::new();
        part.disk = Some(DiskSpill { file, path });

        tracing::debug!(
            part = %part.name,
            buffered = part.len,
            "Spooling upload part to temporary storage"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(memory_buffer: usize, body_ceiling: u64) -> UploadLimits {
        UploadLimits {
            max_files: 10,
            max_upload_size: body_ceiling,
            body_ceiling,
            memory_buffer,
            max_settings: 1024,
        }
    }

    async fn spool(spooler: &mut PartSpooler, name: &str, chunks: &[&[u8]]) -> UploadedFile {
        let mut part = spooler.begin(name);
        for chunk in chunks {
            spooler.write(&mut part, chunk).await.unwrap();
        }
        spooler.finish(part).await.unwrap()
    }

    #[tokio::test]
    async fn small_parts_stay_in_memory() {
        let mut spooler = PartSpooler::new(limits(64, 1024));
        let file = spool(&mut spooler, "a.mp3", &[b"hello ", b"world"]).await;
        assert!(!file.is_spilled());
        assert_eq!(file.declared_size(), 11);
        assert_eq!(file.read_all().await.unwrap(), &b"hello world"[..]);
        assert_eq!(spooler.body_bytes(), 11);
    }

    #[tokio::test]
    async fn parts_over_budget_spill_to_disk() {
        let mut spooler = PartSpooler::new(limits(8, 1024));
        let first = spool(&mut spooler, "a.wav", &[b"0123", b"4567", b"89"]).await;
        assert!(first.is_spilled());
        assert_eq!(first.declared_size(), 10);
        assert_eq!(first.measure().await.unwrap(), 10);
        assert_eq!(first.read_all().await.unwrap(), &b"0123456789"[..]);

        // The spilled part released its memory, so the next small part fits in memory.
        let second = spool(&mut spooler, "b.wav", &[b"abcdefgh"]).await;
        assert!(!second.is_spilled());
        assert_eq!(second.read_all().await.unwrap(), &b"abcdefgh"[..]);
    }

    #[tokio::test]
    async fn in_memory_reads_share_the_spooled_buffer() {
        let mut spooler = PartSpooler::new(limits(64, 1024));
        let file = spool(&mut spooler, "a.mp3", &[b"shared"]).await;
        let first = file.read_all().await.unwrap();
        let second = file.read_all().await.unwrap();
        assert_eq!(first.as_ptr(), second.as_ptr());
    }

    #[tokio::test]
    async fn body_ceiling_fails_fast() {
        let mut spooler = PartSpooler::new(limits(1024, 10));
        let mut part = spooler.begin("a.mp3");
        spooler.write(&mut part, b"0123456789").await.unwrap();
        let err = spooler.write(&mut part, b"x").await.unwrap_err();
        assert!(matches!(
            err,
            UploadError::Validation(ValidationError::BodyTooLarge { max: 10 })
        ));
    }

    #[test]
    fn account_counts_discarded_bytes() {
        let mut spooler = PartSpooler::new(limits(16, 8));
        spooler.account(8).unwrap();
        assert!(spooler.account(1).is_err());
    }
}
