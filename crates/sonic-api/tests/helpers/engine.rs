//! In-memory `AudioEngine` doubles.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use sonic_core::{AudioFile, AudioResult, BoostMode, CompressPolicy, MetadataTags, TrimMode};
use sonic_engine::{AudioEngine, EngineError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Compress {
        files: Vec<AudioFile>,
        policy: CompressPolicy,
    },
    Convert {
        files: Vec<AudioFile>,
        format: String,
        bitrate: i32,
    },
    Trim {
        file: AudioFile,
        start_seconds: i32,
        end_seconds: i32,
        mode: TrimMode,
    },
    Merge {
        files: Vec<AudioFile>,
        format: String,
    },
    Metadata {
        file: AudioFile,
        tags: MetadataTags,
    },
    Boost {
        files: Vec<AudioFile>,
        mode: BoostMode,
    },
}

#[derive(Debug, Clone)]
pub enum Reply {
    Result(AudioResult),
    Unavailable(String),
    Timeout,
}

pub struct RecordingEngine {
    reply: Reply,
    calls: Mutex<Vec<EngineCall>>,
}

impl Default for RecordingEngine {
    fn default() -> Self {
        Self::replying(AudioResult {
            filename: "result.mp3".to_string(),
            format: "mp3".to_string(),
            data: b"processed audio".to_vec(),
        })
    }
}

impl RecordingEngine {
    pub fn replying(result: AudioResult) -> Self {
        Self::with_reply(Reply::Result(result))
    }

    pub fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: EngineCall) -> Result<AudioResult, EngineError> {
        self.calls.lock().unwrap().push(call);
        match &self.reply {
            Reply::Result(result) => Ok(result.clone()),
            Reply::Unavailable(message) => Err(EngineError::Unavailable(message.clone())),
            Reply::Timeout => Err(EngineError::Timeout(Duration::from_secs(60))),
        }
    }
}

#[async_trait]
impl AudioEngine for RecordingEngine {
    async fn compress(
        &self,
        files: Vec<AudioFile>,
        policy: CompressPolicy,
    ) -> Result<AudioResult, EngineError> {
        self.record(EngineCall::Compress { files, policy })
    }

    async fn convert(
        &self,
        files: Vec<AudioFile>,
        format: String,
        bitrate: i32,
    ) -> Result<AudioResult, EngineError> {
        self.record(EngineCall::Convert {
            files,
            format,
            bitrate,
        })
    }

    async fn trim(
        &self,
        file: AudioFile,
        start_seconds: i32,
        end_seconds: i32,
        mode: TrimMode,
    ) -> Result<AudioResult, EngineError> {
        self.record(EngineCall::Trim {
            file,
            start_seconds,
            end_seconds,
            mode,
        })
    }

    async fn merge(
        &self,
        files: Vec<AudioFile>,
        format: String,
    ) -> Result<AudioResult, EngineError> {
        self.record(EngineCall::Merge { files, format })
    }

    async fn metadata(
        &self,
        file: AudioFile,
        tags: MetadataTags,
    ) -> Result<AudioResult, EngineError> {
        self.record(EngineCall::Metadata { file, tags })
    }

    async fn boost(
        &self,
        files: Vec<AudioFile>,
        mode: BoostMode,
    ) -> Result<AudioResult, EngineError> {
        self.record(EngineCall::Boost { files, mode })
    }
}

/// Holds every call until released, so a test can keep a request in flight.
#[derive(Default)]
pub struct GatedEngine {
    pub started: Notify,
    pub release: Notify,
}

impl GatedEngine {
    async fn hold(&self) -> Result<AudioResult, EngineError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(AudioResult {
            filename: "held.mp3".to_string(),
            format: "mp3".to_string(),
            data: b"released".to_vec(),
        })
    }
}

#[async_trait]
impl AudioEngine for GatedEngine {
    async fn compress(&self, _: Vec<AudioFile>, _: CompressPolicy) -> Result<AudioResult, EngineError> {
        self.hold().await
    }

    async fn convert(
        &self,
        _: Vec<AudioFile>,
        _: String,
        _: i32,
    ) -> Result<AudioResult, EngineError> {
        self.hold().await
    }

    async fn trim(
        &self,
        _: AudioFile,
        _: i32,
        _: i32,
        _: TrimMode,
    ) -> Result<AudioResult, EngineError> {
        self.hold().await
    }

    async fn merge(&self, _: Vec<AudioFile>, _: String) -> Result<AudioResult, EngineError> {
        self.hold().await
    }

    async fn metadata(&self, _: AudioFile, _: MetadataTags) -> Result<AudioResult, EngineError> {
        self.hold().await
    }

    async fn boost(&self, _: Vec<AudioFile>, _: BoostMode) -> Result<AudioResult, EngineError> {
        self.hold().await
    }
}
