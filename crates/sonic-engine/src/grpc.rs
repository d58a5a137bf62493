//! gRPC implementation of [`AudioEngine`]
//!
//! One lazily-connected channel per operation family, created at startup and cloned into
//! each call. Every call is capped by the configured message size and bounded by the
//! per-call timeout; dropping the returned future abandons the call.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use sonic_core::{
    AudioFile, AudioResult, BoostMode, CompressPolicy, GatewayConfig, MetadataTags, TrimMode,
};
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};

use crate::engine::AudioEngine;
use crate::error::EngineError;
use crate::proto::{self, paths};

#[derive(Clone, Debug)]
pub struct GrpcAudioEngine {
    compress: Channel,
    convert: Channel,
    trim: Channel,
    merge: Channel,
    metadata: Channel,
    boost: Channel,
    timeout: Duration,
    max_message_bytes: usize,
}

impl GrpcAudioEngine {
    /// Build the engine client. No connection is made until the first call.
    /// Must be called from within a tokio runtime.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, EngineError> {
        let endpoint = Endpoint::from_shared(config.engine_addr.clone())
            .map_err(|e| EngineError::InvalidAddress {
                addr: config.engine_addr.clone(),
                message: e.to_string(),
            })?
            .connect_timeout(config.engine_connect_timeout());

        tracing::info!(
            addr = %config.engine_addr,
            timeout_secs = config.engine_timeout_secs,
            max_message_bytes = config.engine_max_message_bytes,
            "Audio engine client configured"
        );

        Ok(Self {
            compress: endpoint.connect_lazy(),
            convert: endpoint.connect_lazy(),
            trim: endpoint.connect_lazy(),
            merge: endpoint.connect_lazy(),
            metadata: endpoint.connect_lazy(),
            boost: endpoint.connect_lazy(),
            timeout: config.engine_timeout(),
            max_message_bytes: config.engine_max_message_bytes,
        })
    }

    async fn call<Req, Resp>(
        &self,
        channel: &Channel,
        path: &'static str,
        request: Req,
    ) -> Result<Resp, EngineError>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let start = Instant::now();
        let mut grpc = Grpc::new(channel.clone())
            .max_decoding_message_size(self.max_message_bytes)
            .max_encoding_message_size(self.max_message_bytes);

        let result = tokio::time::timeout(self.timeout, async move {
            grpc.ready()
                .await
                .map_err(|e| EngineError::Unavailable(e.to_string()))?;
            let codec: ProstCodec<Req, Resp> = ProstCodec::default();
            grpc.unary(
                tonic::Request::new(request),
                PathAndQuery::from_static(path),
                codec,
            )
            .await
            .map(tonic::Response::into_inner)
            .map_err(EngineError::from)
        })
        .await;

        match result {
            Ok(Ok(response)) => {
                tracing::info!(
                    method = path,
                    duration_ms = start.elapsed().as_millis(),
                    "Audio engine call completed"
                );
                Ok(response)
            }
            Ok(Err(e)) => {
                tracing::error!(
                    method = path,
                    duration_ms = start.elapsed().as_millis(),
                    error = %e,
                    "Audio engine call failed"
                );
                Err(e)
            }
            Err(_) => {
                tracing::error!(
                    method = path,
                    timeout_secs = self.timeout.as_secs(),
                    "Audio engine call timed out"
                );
                Err(EngineError::Timeout(self.timeout))
            }
        }
    }
}

/// Split files into the parallel `file_data` / `filenames` lists, preserving order.
fn split_files(files: Vec<AudioFile>) -> (Vec<Bytes>, Vec<String>) {
    files.into_iter().map(|f| (f.data, f.name)).unzip()
}

fn into_result(response: proto::AudioResponse) -> AudioResult {
    let filename = if response.filename.is_empty() {
        match response.format.as_str() {
            "" => "output".to_string(),
            ext => format!("output.{}", ext),
        }
    } else {
        response.filename
    };
    AudioResult {
        filename,
        format: response.format,
        data: response.file_data,
    }
}

fn trim_request(
    file: AudioFile,
    start_seconds: i32,
    end_seconds: i32,
    mode: TrimMode,
) -> proto::TrimRequest {
    proto::TrimRequest {
        file_data: file.data,
        filename: file.name,
        start_s: Some(start_seconds),
        end_s: Some(end_seconds),
        action: mode.as_str().to_string(),
    }
}

fn metadata_request(file: AudioFile, tags: MetadataTags) -> proto::MetadataRequest {
    proto::MetadataRequest {
        file_data: file.data,
        filename: file.name,
        title: Some(tags.title),
        artist: Some(tags.artist),
        album: Some(tags.album),
        year: Some(tags.year),
        cover_art: tags.cover,
    }
}

#[async_trait]
impl AudioEngine for GrpcAudioEngine {
    async fn compress(
        &self,
        files: Vec<AudioFile>,
        policy: CompressPolicy,
    ) -> Result<AudioResult, EngineError> {
        let (file_data, filenames) = split_files(files);
        let response: proto::AudioResponse = match policy {
            CompressPolicy::TargetSize { megabytes } => {
                let request = proto::CompressSizeRequest {
                    file_data,
                    filenames,
                    size: megabytes,
                };
                self.call(&self.compress, paths::COMPRESS_SIZE, request)
                    .await?
            }
            CompressPolicy::Percentage { percent } => {
                let request = proto::CompressPercentageRequest {
                    file_data,
                    filenames,
                    percentage: percent,
                };
                self.call(&self.compress, paths::COMPRESS_PERCENTAGE, request)
                    .await?
            }
            CompressPolicy::Quality { label } => {
                let request = proto::CompressQualityRequest {
                    file_data,
                    filenames,
                    quality: label,
                };
                self.call(&self.compress, paths::COMPRESS_QUALITY, request)
                    .await?
            }
        };
        Ok(into_result(response))
    }

    async fn convert(
        &self,
        files: Vec<AudioFile>,
        format: String,
        bitrate: i32,
    ) -> Result<AudioResult, EngineError> {
        let (file_data, filenames) = split_files(files);
        let request = proto::ConvertRequest {
            file_data,
            filenames,
            output_format: format,
            bitrate,
        };
        let response: proto::AudioResponse =
            self.call(&self.convert, paths::CONVERT, request).await?;
        Ok(into_result(response))
    }

    async fn trim(
        &self,
        file: AudioFile,
        start_seconds: i32,
        end_seconds: i32,
        mode: TrimMode,
    ) -> Result<AudioResult, EngineError> {
        let request = trim_request(file, start_seconds, end_seconds, mode);
        let response: proto::AudioResponse = self.call(&self.trim, paths::TRIM, request).await?;
        Ok(into_result(response))
    }

    async fn merge(
        &self,
        files: Vec<AudioFile>,
        format: String,
    ) -> Result<AudioResult, EngineError> {
        let (file_data, filenames) = split_files(files);
        let request = proto::MergeRequest {
            file_data,
            filenames,
            output_format: format,
        };
        let response: proto::AudioResponse =
            self.call(&self.merge, paths::MERGE, request).await?;
        Ok(into_result(response))
    }

    async fn metadata(
        &self,
        file: AudioFile,
        tags: MetadataTags,
    ) -> Result<AudioResult, EngineError> {
        let request = metadata_request(file, tags);
        let response: proto::AudioResponse =
            self.call(&self.metadata, paths::METADATA, request).await?;
        Ok(into_result(response))
    }

    async fn boost(
        &self,
        files: Vec<AudioFile>,
        mode: BoostMode,
    ) -> Result<AudioResult, EngineError> {
        let (file_data, filenames) = split_files(files);
        let response: proto::AudioResponse = match mode {
            BoostMode::Manual { gain } => {
                let request = proto::BoostManualRequest {
                    file_data,
                    filenames,
                    gain,
                };
                self.call(&self.boost, paths::BOOST_MANUAL, request).await?
            }
            BoostMode::Normalize => {
                let request = proto::BoostNormalizeRequest {
                    file_data,
                    filenames,
                };
                self.call(&self.boost, paths::BOOST_NORMALIZE, request)
                    .await?
            }
        };
        Ok(into_result(response))
    }
}
