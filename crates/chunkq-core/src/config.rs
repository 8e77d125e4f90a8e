use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Expected shape of a chunk POST response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Body must parse as JSON; a parse failure counts as a failed attempt.
    #[default]
    Json,
    /// Body is taken as text (lossy UTF-8).
    Text,
}

/// Encoding of the `chunk` field in the POST body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyFormat {
    /// `application/x-www-form-urlencoded`, one `chunk[]=<id>` pair per identifier.
    #[default]
    Form,
    /// `application/json`, `{"chunk":[...]}`.
    Json,
}

impl std::str::FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(DataType::Json),
            "text" => Ok(DataType::Text),
            other => Err(format!("unknown data type '{}' (expected json or text)", other)),
        }
    }
}

impl std::str::FromStr for BodyFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "form" => Ok(BodyFormat::Form),
            "json" => Ok(BodyFormat::Json),
            other => Err(format!("unknown body format '{}' (expected form or json)", other)),
        }
    }
}

/// Request options handed to libcurl (optional section in config.toml).
/// Unset values leave libcurl's own defaults in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestConfig {
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Global configuration loaded from `~/.config/chunkq/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkqConfig {
    /// Maximum number of chunk requests in flight at once.
    pub concurrent_downloads_max: usize,
    /// A chunk is given up once its failure count exceeds this value.
    pub max_download_retries: u32,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub body_format: BodyFormat,
    /// Log every chunk event at info level instead of debug.
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub request: Option<RequestConfig>,
}

impl Default for ChunkqConfig {
    fn default() -> Self {
        Self {
            concurrent_downloads_max: 10,
            max_download_retries: 3,
            data_type: DataType::Json,
            body_format: BodyFormat::Form,
            verbose: false,
            request: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("chunkq")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ChunkqConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as `load_or_init` for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<ChunkqConfig> {
    if !path.exists() {
        let default_cfg = ChunkqConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: ChunkqConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_enums_parse_from_cli_strings() {
        assert_eq!("json".parse::<DataType>().unwrap(), DataType::Json);
        assert_eq!("TEXT".parse::<DataType>().unwrap(), DataType::Text);
        assert!("xml".parse::<DataType>().is_err());
        assert_eq!("form".parse::<BodyFormat>().unwrap(), BodyFormat::Form);
        assert_eq!("json".parse::<BodyFormat>().unwrap(), BodyFormat::Json);
        assert!("multipart".parse::<BodyFormat>().is_err());
    }

    #[test]
    fn default_config_values() {
        let cfg = ChunkqConfig::default();
        assert_eq!(cfg.concurrent_downloads_max, 10);
        assert_eq!(cfg.max_download_retries, 3);
        assert_eq!(cfg.data_type, DataType::Json);
        assert_eq!(cfg.body_format, BodyFormat::Form);
        assert!(!cfg.verbose);
        assert!(cfg.request.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = ChunkqConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ChunkqConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.concurrent_downloads_max, cfg.concurrent_downloads_max);
        assert_eq!(parsed.max_download_retries, cfg.max_download_retries);
        assert_eq!(parsed.data_type, cfg.data_type);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            concurrent_downloads_max = 4
            max_download_retries = 1
            data_type = "text"
            body_format = "json"
            verbose = true

            [request]
            connect_timeout_secs = 5
        "#;
        let cfg: ChunkqConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.concurrent_downloads_max, 4);
        assert_eq!(cfg.max_download_retries, 1);
        assert_eq!(cfg.data_type, DataType::Text);
        assert_eq!(cfg.body_format, BodyFormat::Json);
        assert!(cfg.verbose);
        let req = cfg.request.unwrap();
        assert_eq!(req.connect_timeout_secs, Some(5));
        assert!(req.timeout_secs.is_none());
    }

    #[test]
    fn load_or_init_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.concurrent_downloads_max, 10);

        fs::write(
            &path,
            "concurrent_downloads_max = 2\nmax_download_retries = 0\n",
        )
        .unwrap();
        let cfg = load_or_init_at(&path).unwrap();
        assert_eq!(cfg.concurrent_downloads_max, 2);
        assert_eq!(cfg.max_download_retries, 0);
        assert_eq!(cfg.data_type, DataType::Json);
    }
}
