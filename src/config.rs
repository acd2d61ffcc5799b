use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

use crate::{Error, InternalResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Upper bound on one driven chain, applied by the driver only.
    #[serde(default = "default_chain_timeout", with = "duration_ms")]
    pub chain_timeout: Duration,

    #[serde(default)]
    pub provider: ProviderConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            chain_timeout: default_chain_timeout(),
            provider: ProviderConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    /// Simulated latency of one unit of external work.
    #[serde(default = "default_unit_delay", with = "duration_ms")]
    pub unit_delay: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            unit_delay: default_unit_delay(),
        }
    }
}

fn default_chain_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_unit_delay() -> Duration {
    Duration::from_secs(3)
}

// Duration型のシリアライズ/デシリアライズヘルパー
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

impl DriverConfig {
    // JSONファイルから設定を読み込む
    pub fn from_file(path: impl AsRef<Path>) -> InternalResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::internal(format!("Failed to read config file: {}", e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::internal(format!("Failed to parse config file: {}", e)))
    }
}
