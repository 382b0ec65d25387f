mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config = parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(content)?;

    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./formatfusion.toml",
        "~/.config/formatfusion/config.toml",
        "/etc/formatfusion/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

fn expand_paths(config: &mut Config) {
    let expand = |p: &mut Option<std::path::PathBuf>| {
        if let Some(path) = p.as_mut() {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            *path = expanded.into();
        }
    };

    expand(&mut config.server.static_dir);
    expand(&mut config.tools.ffmpeg_path);
    expand(&mut config.tools.ffprobe_path);
    expand(&mut config.conversion.temp_dir);
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    // Validate server config
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.server.max_upload_mb == 0 {
        anyhow::bail!("server.max_upload_mb must be greater than 0");
    }

    if config.server.upload_ttl_secs == 0 {
        anyhow::bail!("server.upload_ttl_secs must be greater than 0");
    }

    if config.conversion.video_timeout_secs == Some(0)
        || config.conversion.audio_timeout_secs == Some(0)
    {
        anyhow::bail!("Conversion timeouts must be greater than 0 when set");
    }

    // Tool paths fall back to PATH lookup, so a missing file is only a warning
    for path in [&config.tools.ffmpeg_path, &config.tools.ffprobe_path]
        .into_iter()
        .flatten()
    {
        if !path.exists() {
            tracing::warn!("Configured tool path does not exist: {:?}", path);
        }
    }

    if let Some(ref dir) = config.server.static_dir {
        if !dir.exists() {
            tracing::warn!("Static directory does not exist: {:?}", dir);
        }
    }

    Ok(())
}
