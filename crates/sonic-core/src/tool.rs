//! Tool decoding
//!
//! Turns a [`ConfigMap`] into exactly one [`ToolInvocation`], carrying only the typed
//! parameters its remote operation needs. An unknown `tool` and an unknown method/mode
//! within a known tool are distinct errors.

use std::fmt;
use std::str::FromStr;

use crate::settings::{ConfigError, ConfigMap, SettingValue};
use crate::timecode::parse_seconds;

pub const DEFAULT_TARGET_SIZE: &str = "1";
pub const DEFAULT_PERCENTAGE: i32 = 1;
pub const DEFAULT_QUALITY: &str = "medium";
pub const DEFAULT_FORMAT: &str = "mp3";
pub const DEFAULT_BITRATE: i32 = 128;
pub const DEFAULT_TRIM_START: &str = "00:00";
pub const DEFAULT_TRIM_END: &str = "59:59";
pub const DEFAULT_GAIN: i32 = 0;

/// Top-level `tool` selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Compress,
    Convert,
    Trim,
    Merge,
    Metadata,
    Boost,
}

impl ToolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Compress => "compress",
            ToolKind::Convert => "convert",
            ToolKind::Trim => "trim",
            ToolKind::Merge => "merge",
            ToolKind::Metadata => "metadata",
            ToolKind::Boost => "boost",
        }
    }
}

impl FromStr for ToolKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compress" => Ok(ToolKind::Compress),
            "convert" => Ok(ToolKind::Convert),
            "trim" => Ok(ToolKind::Trim),
            "merge" => Ok(ToolKind::Merge),
            "metadata" => Ok(ToolKind::Metadata),
            "boost" => Ok(ToolKind::Boost),
            other => Err(ConfigError::InvalidTool(other.to_string())),
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Size policy for `compress`, selected by `method`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressPolicy {
    /// `method = "mb"`: target output size in megabytes.
    TargetSize { megabytes: i32 },
    /// `method = "percentage"`: target bitrate as a percentage of the original.
    Percentage { percent: i32 },
    /// `method = "quality"`: named quality preset (low/medium/high).
    Quality { label: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimMode {
    Keep,
    Remove,
}

impl TrimMode {
    /// Wire value of the trim `action`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrimMode::Keep => "keep",
            TrimMode::Remove => "remove",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostMode {
    Manual { gain: i32 },
    Normalize,
}

/// Tags written by the `metadata` tool
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MetadataTags {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    /// Raw image bytes from the `cover` part, if one was uploaded.
    pub cover: Option<Vec<u8>>,
}

impl fmt::Debug for MetadataTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataTags")
            .field("title", &self.title)
            .field("artist", &self.artist)
            .field("album", &self.album)
            .field("year", &self.year)
            .field("cover_bytes", &self.cover.as_ref().map(Vec::len))
            .finish()
    }
}

/// One decoded audio operation; built once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocation {
    Compress(CompressPolicy),
    Convert {
        format: String,
        bitrate: i32,
    },
    /// Operates on the first ordered file only. `start >= end` is passed through as-is.
    Trim {
        start_seconds: i32,
        end_seconds: i32,
        mode: TrimMode,
    },
    Merge {
        format: String,
    },
    /// Operates on the first ordered file only.
    Metadata(MetadataTags),
    Boost(BoostMode),
}

impl ToolInvocation {
    /// Decode the invocation described by `settings`. `cover` is the content of the
    /// optional `cover` part and is only used by the metadata tool.
    pub fn from_settings(
        settings: &ConfigMap,
        cover: Option<Vec<u8>>,
    ) -> Result<Self, ConfigError> {
        let kind = match settings.get("tool") {
            None => return Err(ConfigError::MissingTool),
            Some(SettingValue::Str(name)) => name.parse::<ToolKind>()?,
            Some(other) => {
                return Err(ConfigError::InvalidTool(format!(
                    "expected a string, got {}",
                    other.kind()
                )))
            }
        };

        let invocation = match kind {
            ToolKind::Compress => ToolInvocation::Compress(compress_policy(settings)?),
            ToolKind::Convert => ToolInvocation::Convert {
                format: settings.get_str_or("format", DEFAULT_FORMAT),
                bitrate: settings.get_or("bitrate", DEFAULT_BITRATE),
            },
            ToolKind::Trim => {
                let mode = match settings.get_str_or("mode", "keep").as_str() {
                    "keep" => TrimMode::Keep,
                    "remove" => TrimMode::Remove,
                    other => return Err(ConfigError::InvalidTrimMode(other.to_string())),
                };
                let start = settings.get_str_or("start", DEFAULT_TRIM_START);
                let end = settings.get_str_or("end", DEFAULT_TRIM_END);
                ToolInvocation::Trim {
                    start_seconds: parse_seconds("start", &start)?,
                    end_seconds: parse_seconds("end", &end)?,
                    mode,
                }
            }
            ToolKind::Merge => ToolInvocation::Merge {
                format: settings.get_str_or("format", DEFAULT_FORMAT),
            },
            ToolKind::Metadata => ToolInvocation::Metadata(MetadataTags {
                title: settings.get_str_or("title", ""),
                artist: settings.get_str_or("artist", ""),
                album: settings.get_str_or("album", ""),
                year: settings.get_str_or("year", ""),
                cover,
            }),
            ToolKind::Boost => match settings.get_str_or("mode", "").as_str() {
                "manual" => ToolInvocation::Boost(BoostMode::Manual {
                    gain: settings.get_or("gain", DEFAULT_GAIN),
                }),
                "normalize" => ToolInvocation::Boost(BoostMode::Normalize),
                other => return Err(ConfigError::InvalidBoostMode(other.to_string())),
            },
        };

        Ok(invocation)
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            ToolInvocation::Compress(_) => ToolKind::Compress,
            ToolInvocation::Convert { .. } => ToolKind::Convert,
            ToolInvocation::Trim { .. } => ToolKind::Trim,
            ToolInvocation::Merge { .. } => ToolKind::Merge,
            ToolInvocation::Metadata(_) => ToolKind::Metadata,
            ToolInvocation::Boost(_) => ToolKind::Boost,
        }
    }

    /// The method/mode selector, for log records.
    pub fn variant(&self) -> Option<&'static str> {
        match self {
            ToolInvocation::Compress(CompressPolicy::TargetSize { .. }) => Some("mb"),
            ToolInvocation::Compress(CompressPolicy::Percentage { .. }) => Some("percentage"),
            ToolInvocation::Compress(CompressPolicy::Quality { .. }) => Some("quality"),
            ToolInvocation::Trim { mode, .. } => Some(mode.as_str()),
            ToolInvocation::Boost(BoostMode::Manual { .. }) => Some("manual"),
            ToolInvocation::Boost(BoostMode::Normalize) => Some("normalize"),
            _ => None,
        }
    }

    /// Whether the remote operation takes a single file rather than the whole ordered set.
    pub fn is_single_file(&self) -> bool {
        matches!(
            self,
            ToolInvocation::Trim { .. } | ToolInvocation::Metadata(_)
        )
    }
}

fn compress_policy(settings: &ConfigMap) -> Result<CompressPolicy, ConfigError> {
    match settings.get_str_or("method", "").as_str() {
        "mb" => Ok(CompressPolicy::TargetSize {
            megabytes: target_size(settings)?,
        }),
        "percentage" => Ok(CompressPolicy::Percentage {
            percent: settings.get_or("percentage", DEFAULT_PERCENTAGE),
        }),
        "quality" => Ok(CompressPolicy::Quality {
            label: settings.get_str_or("quality", DEFAULT_QUALITY),
        }),
        other => Err(ConfigError::InvalidCompressMethod(other.to_string())),
    }
}

/// `size` may arrive as a string or an integer; anything else falls back to the default.
fn target_size(settings: &ConfigMap) -> Result<i32, ConfigError> {
    let raw = match settings.get("size") {
        Some(SettingValue::Int(megabytes)) => megabytes.to_string(),
        _ => settings.get_str_or("size", DEFAULT_TARGET_SIZE),
    };
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ConfigError::InvalidTargetSize(raw))
}
