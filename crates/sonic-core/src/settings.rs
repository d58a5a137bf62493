//! Settings document model
//!
//! The `settings` form field carries a JSON object describing which tool to run and its
//! parameters. It is parsed once per request into a [`ConfigMap`]: a closed, weakly-typed
//! bag of [`SettingValue`]s with typed extraction.
//!
//! Extraction never fails. Asking for a key that is absent, or that holds a value of a
//! different type, yields the caller's default. Callers that need a key to be present
//! (`tool`, `fileOrder`) check for it themselves.

use std::collections::BTreeMap;

use serde_json::Value;

/// Key removed from every parsed document; cover art travels as a binary part.
pub const COVER_KEY: &str = "cover";

/// Errors raised while parsing the settings document or decoding a tool from it
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing settings JSON")]
    MissingSettings,

    #[error("malformed settings JSON: {0}")]
    Malformed(String),

    #[error("missing required setting '{0}'")]
    MissingKey(&'static str),

    #[error("invalid tool: missing 'tool' setting")]
    MissingTool,

    #[error("invalid tool: {0}")]
    InvalidTool(String),

    #[error("invalid compress method: {0:?}")]
    InvalidCompressMethod(String),

    #[error("invalid trim mode: {0:?}")]
    InvalidTrimMode(String),

    #[error("invalid boost mode: {0:?}")]
    InvalidBoostMode(String),

    #[error("invalid {key} time {value:?}: {reason}")]
    InvalidTime {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid target size {0:?}")]
    InvalidTargetSize(String),
}

/// A single settings value. JSON values outside this set (null, objects, fractional
/// numbers) are not representable and are dropped at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Str(String),
    Int(i64),
    Bool(bool),
    /// Arrays keep only their string elements, in order.
    StrList(Vec<String>),
}

impl SettingValue {
    fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(SettingValue::Str(s)),
            Value::Bool(b) => Some(SettingValue::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Some(SettingValue::Int(i));
                }
                // 128.0 is an integer for our purposes; 2.5 is not.
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                    .map(|f| SettingValue::Int(f as i64))
            }
            Value::Array(items) => Some(SettingValue::StrList(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            )),
            Value::Null | Value::Object(_) => None,
        }
    }

    /// Short type name used in log records.
    pub fn kind(&self) -> &'static str {
        match self {
            SettingValue::Str(_) => "string",
            SettingValue::Int(_) => "int",
            SettingValue::Bool(_) => "bool",
            SettingValue::StrList(_) => "list",
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Str(value.to_string())
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Int(value)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(value: Vec<String>) -> Self {
        SettingValue::StrList(value)
    }
}

/// Types that can be extracted from a [`SettingValue`] without coercion across kinds.
pub trait FromSettingValue: Sized {
    fn from_setting(value: &SettingValue) -> Option<Self>;
}

impl FromSettingValue for String {
    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromSettingValue for i64 {
    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromSettingValue for i32 {
    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Int(i) => i32::try_from(*i).ok(),
            _ => None,
        }
    }
}

impl FromSettingValue for bool {
    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromSettingValue for Vec<String> {
    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::StrList(items) => Some(items.clone()),
            _ => None,
        }
    }
}

/// Parsed settings document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMap {
    values: BTreeMap<String, SettingValue>,
}

impl ConfigMap {
    /// Parse the raw `settings` field. Absent or empty input is `MissingSettings`;
    /// anything else that is not a JSON object, whitespace included, is `Malformed`.
    pub fn parse(raw: Option<&str>) -> Result<Self, ConfigError> {
        let raw = match raw {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Err(ConfigError::MissingSettings),
        };

        let value: Value =
            serde_json::from_str(raw).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        Self::from_json(value)
    }

    /// Build from an already-parsed JSON value, which must be an object.
    pub fn from_json(value: Value) -> Result<Self, ConfigError> {
        let Value::Object(object) = value else {
            return Err(ConfigError::Malformed(
                "expected a JSON object".to_string(),
            ));
        };

        let mut values = BTreeMap::new();
        for (key, value) in object {
            if key == COVER_KEY {
                continue;
            }
            match SettingValue::from_json(value) {
                Some(setting) => {
                    values.insert(key, setting);
                }
                None => tracing::debug!(key = %key, "Dropping unsupported settings value"),
            }
        }

        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
        let key = key.into();
        if key != COVER_KEY {
            self.values.insert(key, value.into());
        }
    }

    /// Typed extraction with fallback. A present value of the wrong type (or an integer
    /// out of range for `T`) returns `default`, never an error.
    pub fn get_or<T: FromSettingValue>(&self, key: &str, default: T) -> T {
        self.values
            .get(key)
            .and_then(T::from_setting)
            .unwrap_or(default)
    }

    /// String extraction with a borrowed default.
    pub fn get_str_or(&self, key: &str, default: &str) -> String {
        self.get_or(key, default.to_string())
    }

    /// The string elements of a list value, in order. Non-list values yield an empty list.
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        self.get_or(key, Vec::new())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, SettingValue)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (K, SettingValue)>>(iter: I) -> Self {
        let mut map = ConfigMap::default();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}
