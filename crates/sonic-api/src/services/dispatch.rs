//! Tool dispatch pipeline
//!
//! One request moves strictly forward through
//! `Received → Validated → ConfigParsed → Ordered → PayloadsRead → ToolResolved → Invoked`.
//! The first failing step ends the request; the last stage reached is logged with the
//! error. Exactly one engine call is made, after every local check has passed.

use std::fmt;

use sonic_core::{AppError, AudioFile, AudioResult, ConfigError, ConfigMap, ToolInvocation};
use sonic_engine::AudioEngine;
use sonic_processing::{order_files, read_cover, read_payloads, UploadLimits, ValidatedFileSet};

use crate::utils::upload::RawUpload;

pub const FILE_ORDER_KEY: &str = "fileOrder";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validated,
    ConfigParsed,
    Ordered,
    PayloadsRead,
    ToolResolved,
    Invoked,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Validated => "validated",
            Stage::ConfigParsed => "config_parsed",
            Stage::Ordered => "ordered",
            Stage::PayloadsRead => "payloads_read",
            Stage::ToolResolved => "tool_resolved",
            Stage::Invoked => "invoked",
        };
        f.write_str(name)
    }
}

/// A failed request: the error plus the last stage it reached.
#[derive(Debug)]
pub struct DispatchFailure {
    pub stage: Stage,
    pub error: AppError,
}

impl From<DispatchFailure> for AppError {
    fn from(failure: DispatchFailure) -> Self {
        failure.error
    }
}

pub struct ToolDispatcher<'a> {
    engine: &'a dyn AudioEngine,
    limits: &'a UploadLimits,
    stage: Stage,
}

impl<'a> ToolDispatcher<'a> {
    pub fn new(engine: &'a dyn AudioEngine, limits: &'a UploadLimits) -> Self {
        Self {
            engine,
            limits,
            stage: Stage::Received,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn advance(&mut self, next: Stage) {
        tracing::trace!(from = %self.stage, to = %next, "Dispatch stage");
        self.stage = next;
    }

    pub async fn run(mut self, upload: RawUpload) -> Result<AudioResult, DispatchFailure> {
        match self.pipeline(upload).await {
            Ok(result) => Ok(result),
            Err(error) => {
                tracing::debug!(stage = %self.stage, error = %error, "Dispatch failed");
                Err(DispatchFailure {
                    stage: self.stage,
                    error,
                })
            }
        }
    }

    async fn pipeline(&mut self, upload: RawUpload) -> Result<AudioResult, AppError> {
        let RawUpload {
            files,
            cover,
            settings,
        } = upload;

        let files = ValidatedFileSet::validate(files, self.limits).await?;
        self.advance(Stage::Validated);

        let settings = ConfigMap::parse(settings.as_deref())?;
        if !settings.contains_key(FILE_ORDER_KEY) {
            return Err(ConfigError::MissingKey(FILE_ORDER_KEY).into());
        }
        let file_order = settings.get_string_list(FILE_ORDER_KEY);
        tracing::debug!(
            keys = ?settings.keys().collect::<Vec<_>>(),
            "Settings parsed"
        );
        self.advance(Stage::ConfigParsed);

        let ordered = order_files(&files, &file_order)?;
        self.advance(Stage::Ordered);

        let mut payloads = read_payloads(&ordered).await?;
        let cover = read_cover(cover.as_ref()).await?;
        drop(ordered);
        drop(files);
        self.advance(Stage::PayloadsRead);

        let invocation = ToolInvocation::from_settings(&settings, cover)?;
        tracing::info!(
            tool = %invocation.kind(),
            variant = invocation.variant().unwrap_or("-"),
            file_count = payloads.len(),
            "Tool resolved"
        );
        self.advance(Stage::ToolResolved);

        let engine = self.engine;
        let result = match invocation {
            ToolInvocation::Compress(policy) => engine.compress(payloads, policy).await,
            ToolInvocation::Convert { format, bitrate } => {
                engine.convert(payloads, format, bitrate).await
            }
            ToolInvocation::Trim {
                start_seconds,
                end_seconds,
                mode,
            } => {
                let first = take_first(&mut payloads)?;
                engine.trim(first, start_seconds, end_seconds, mode).await
            }
            ToolInvocation::Merge { format } => engine.merge(payloads, format).await,
            ToolInvocation::Metadata(tags) => {
                let first = take_first(&mut payloads)?;
                engine.metadata(first, tags).await
            }
            ToolInvocation::Boost(mode) => engine.boost(payloads, mode).await,
        };
        self.advance(Stage::Invoked);

        let result = result?;
        tracing::info!(
            filename = %result.filename,
            format = %result.format,
            bytes = result.data.len(),
            "Audio engine returned result"
        );
        Ok(result)
    }
}

/// Single-file tools act on the first ordered file; the rest are dropped.
fn take_first(payloads: &mut Vec<AudioFile>) -> Result<AudioFile, AppError> {
    if payloads.is_empty() {
        return Err(AppError::Internal(
            "ordered file set is empty after validation".to_string(),
        ));
    }
    Ok(payloads.swap_remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sonic_core::{BoostMode, CompressPolicy, MetadataTags, TrimMode};
    use sonic_engine::EngineError;
    use sonic_processing::UploadedFile;

    /// Answers every call with the name of the first file it was given.
    struct EchoEngine;

    fn echo(files: &[AudioFile]) -> Result<AudioResult, EngineError> {
        let first = files.first().map(|f| f.name.clone()).unwrap_or_default();
        Ok(AudioResult {
            filename: first,
            format: "mp3".to_string(),
            data: vec![files.len() as u8],
        })
    }

    #[async_trait]
    impl AudioEngine for EchoEngine {
        async fn compress(
            &self,
            files: Vec<AudioFile>,
            _: CompressPolicy,
        ) -> Result<AudioResult, EngineError> {
            echo(&files)
        }
        async fn convert(
            &self,
            files: Vec<AudioFile>,
            _: String,
            _: i32,
        ) -> Result<AudioResult, EngineError> {
            echo(&files)
        }
        async fn trim(
            &self,
            file: AudioFile,
            _: i32,
            _: i32,
            _: TrimMode,
        ) -> Result<AudioResult, EngineError> {
            echo(&[file])
        }
        async fn merge(&self, files: Vec<AudioFile>, _: String) -> Result<AudioResult, EngineError> {
            echo(&files)
        }
        async fn metadata(
            &self,
            file: AudioFile,
            _: MetadataTags,
        ) -> Result<AudioResult, EngineError> {
            echo(&[file])
        }
        async fn boost(&self, files: Vec<AudioFile>, _: BoostMode) -> Result<AudioResult, EngineError> {
            echo(&files)
        }
    }

    fn upload(names: &[&str], settings: Option<&str>) -> RawUpload {
        RawUpload {
            files: names
                .iter()
                .map(|n| UploadedFile::in_memory(n.to_string(), b"data".to_vec()))
                .collect(),
            cover: None,
            settings: settings.map(str::to_string),
        }
    }

    async fn run(upload: RawUpload) -> Result<AudioResult, DispatchFailure> {
        let limits = UploadLimits::default();
        ToolDispatcher::new(&EchoEngine, &limits).run(upload).await
    }

    #[tokio::test]
    async fn trim_uses_first_ordered_file() {
        let result = run(upload(
            &["a.mp3", "b.mp3"],
            Some(r#"{"tool":"trim","fileOrder":["b.mp3","a.mp3"]}"#),
        ))
        .await
        .unwrap();
        assert_eq!(result.filename, "b.mp3");
        assert_eq!(result.data, vec![1]);
    }

    #[tokio::test]
    async fn failures_report_the_stage_reached() {
        let cases = [
            (upload(&[], Some(r#"{"tool":"merge"}"#)), Stage::Received),
            (upload(&["a.mp3"], None), Stage::Validated),
            (upload(&["a.mp3"], Some(r#"{"tool":"merge"}"#)), Stage::Validated),
            (
                upload(&["a.mp3"], Some(r#"{"tool":"merge","fileOrder":["x.mp3"]}"#)),
                Stage::ConfigParsed,
            ),
            (
                upload(&["a.mp3"], Some(r#"{"tool":"reverse","fileOrder":["a.mp3"]}"#)),
                Stage::PayloadsRead,
            ),
        ];
        for (upload, stage) in cases {
            let failure = run(upload).await.unwrap_err();
            assert_eq!(failure.stage, stage);
        }
    }

    #[tokio::test]
    async fn missing_file_order_is_a_settings_error() {
        let failure = run(upload(&["a.mp3"], Some(r#"{"tool":"merge"}"#)))
            .await
            .unwrap_err();
        assert_eq!(
            failure.error.to_string(),
            "Invalid settings: missing required setting 'fileOrder'"
        );
    }
}
