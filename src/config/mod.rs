//! Application Configuration
//!
//! Server, model, and canvas settings stored in TOML format. The request size
//! limit and upstream timeout are configuration, not constants.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Model provider settings
    pub model: ModelConfig,
    /// Canvas session defaults
    pub canvas: CanvasSettings,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Address to bind
    pub bind_addr: String,
    /// Maximum request body size in megabytes (base64 PNG payloads are large)
    pub max_body_mb: u64,
    /// Allow cross-origin requests from any origin
    pub allow_any_origin: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_addr: "0.0.0.0".to_string(),
            max_body_mb: 50,
            allow_any_origin: true,
        }
    }
}

impl ServerConfig {
    /// Body limit in bytes
    pub fn max_body_bytes(&self) -> usize {
        (self.max_body_mb as usize) * 1024 * 1024
    }
}

/// Model provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name passed to the provider
    pub model: String,
    /// API endpoint base URL
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Upstream request timeout in seconds; none uses the client default
    pub request_timeout_secs: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GEMINI_KEY".to_string(),
            request_timeout_secs: None,
        }
    }
}

/// Canvas session defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    /// Surface width in pixels
    pub width: u32,
    /// Surface height in pixels
    pub height: u32,
    /// Stroke thickness in pixels
    pub stroke_width: u32,
    /// Default stroke color as RGBA
    pub color: [u8; 4],
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            stroke_width: 3,
            color: [255, 255, 255, 255],
        }
    }
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "mathsketch", "mathsketch")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.server.max_body_mb, 50);
        assert!(config.server.allow_any_origin);

        assert_eq!(config.model.model, "gemini-1.5-flash");
        assert_eq!(config.model.api_key_env, "GEMINI_KEY");
        assert!(config.model.request_timeout_secs.is_none());

        assert_eq!(config.canvas.width, 1280);
        assert_eq!(config.canvas.height, 720);
        assert_eq!(config.canvas.stroke_width, 3);
    }

    #[test]
    fn test_max_body_bytes() {
        let server = ServerConfig::default();
        assert_eq!(server.max_body_bytes(), 50 * 1024 * 1024);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = AppConfig::default();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.server.port, parsed.server.port);
        assert_eq!(config.model.model, parsed.model.model);
        assert_eq!(config.canvas.color, parsed.canvas.color);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: AppConfig = toml::from_str("[server]\nport = 8080\n").unwrap();
        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.server.max_body_mb, 50);
        assert_eq!(parsed.model.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_save_and_load_config() {
        let mut config = AppConfig::default();
        config.server.port = 4100;
        config.model.request_timeout_secs = Some(30);

        let temp_file = NamedTempFile::new().unwrap();
        save_config(&config, temp_file.path()).unwrap();

        let loaded = load_config(temp_file.path()).unwrap();
        assert_eq!(loaded.server.port, 4100);
        assert_eq!(loaded.model.request_timeout_secs, Some(30));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}
