use std::time::Duration;

use serde::Deserialize;

use crate::args::parsers::parse_duration_arg;
use crate::args::{FailurePolicy, HttpMethod};
use crate::error::ValidationError;

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub chain: Option<ChainConfig>,
    pub stress: Option<StressConfig>,
    pub serve: Option<ServeConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChainConfig {
    pub handlers: Option<usize>,
    pub stop_at: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StressConfig {
    pub url: Option<String>,
    #[serde(alias = "count")]
    pub requests: Option<usize>,
    pub method: Option<HttpMethod>,
    pub data: Option<String>,
    pub content_type: Option<String>,
    pub echo: Option<bool>,
    pub max_in_flight: Option<usize>,
    pub timeout: Option<DurationValue>,
    pub expect_status: Option<u16>,
    pub failure_policy: Option<FailurePolicy>,
    pub quiet: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServeConfig {
    pub listen: Option<String>,
}

/// Either whole seconds or a string such as `"250ms"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => parse_duration_arg(text),
        }
    }
}
