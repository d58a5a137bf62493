use async_trait::async_trait;
use sonic_core::{AudioFile, AudioResult, BoostMode, CompressPolicy, MetadataTags, TrimMode};

use crate::error::EngineError;

/// The remote audio engine, one method per operation family.
///
/// Each method performs exactly one remote call and takes ownership of the payloads so
/// they can be moved into the outgoing message without another copy.
#[async_trait]
pub trait AudioEngine: Send + Sync {
    async fn compress(
        &self,
        files: Vec<AudioFile>,
        policy: CompressPolicy,
    ) -> Result<AudioResult, EngineError>;

    async fn convert(
        &self,
        files: Vec<AudioFile>,
        format: String,
        bitrate: i32,
    ) -> Result<AudioResult, EngineError>;

    async fn trim(
        &self,
        file: AudioFile,
        start_seconds: i32,
        end_seconds: i32,
        mode: TrimMode,
    ) -> Result<AudioResult, EngineError>;

    async fn merge(&self, files: Vec<AudioFile>, format: String)
        -> Result<AudioResult, EngineError>;

    async fn metadata(
        &self,
        file: AudioFile,
        tags: MetadataTags,
    ) -> Result<AudioResult, EngineError>;

    async fn boost(&self, files: Vec<AudioFile>, mode: BoostMode)
        -> Result<AudioResult, EngineError>;
}
