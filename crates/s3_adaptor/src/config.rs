use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::AdaptorError;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// Object granularity in bytes.
    #[serde(default = "default_block_size")]
    pub block_size: u64,
    /// Logical chunking granularity in bytes; must be a multiple of
    /// `block_size`.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,

    pub meta_server_eps: String,
    pub allocate_server_eps: String,

    #[serde(default = "default_rpc_timeout")]
    pub rpc_timeout_seconds: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

fn default_block_size() -> u64 {
    1024 * 1024
}
fn default_chunk_size() -> u64 {
    16 * 1024 * 1024
}
fn default_rpc_timeout() -> u64 {
    30
}
fn default_connect_timeout() -> u64 {
    5
}

impl Config {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn validate(&self) -> Result<(), AdaptorError> {
        if self.block_size == 0 {
            return Err(AdaptorError::InvalidConfig(
                "block_size must be positive".to_string(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(AdaptorError::InvalidConfig(
                "chunk_size must be positive".to_string(),
            ));
        }
        if self.chunk_size % self.block_size != 0 {
            return Err(AdaptorError::InvalidConfig(format!(
                "chunk_size {} is not a multiple of block_size {}",
                self.chunk_size, self.block_size
            )));
        }
        Ok(())
    }

    /// Load from an optional config file with `S3_ADAPTOR_*` environment
    /// overrides, for host processes bootstrapping the adaptor.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ::config::ConfigError> {
        let builder = ::config::Config::builder();
        let builder = match config_file {
            Some(path) => builder.add_source(::config::File::from(path).required(true)),
            None => builder,
        };
        builder
            .add_source(::config::Environment::with_prefix("S3_ADAPTOR"))
            .build()?
            .try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_size: default_block_size(),
            chunk_size: default_chunk_size(),
            meta_server_eps: "127.0.0.1:6700".to_string(),
            allocate_server_eps: "127.0.0.1:6701".to_string(),
            rpc_timeout_seconds: default_rpc_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_size % config.block_size, 0);
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let config = Config {
            block_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn chunk_size_must_be_block_multiple() {
        let config = Config {
            block_size: 4,
            chunk_size: 18,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
