use serde::{Deserialize, Serialize};

use std::{env, fs, path::Path};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Route `POST /api/notes` through the note validator
    pub strict_create: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            strict_create: false,
        }
    }
}

impl Config {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        serde_yaml::from_str(contents).map_err(Into::into)
    }

    /// Overrides fields with `HOST`, `PORT` and `STRICT_CREATE` when `lookup` has them.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }

        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse::<u16>()
                .map_err(|e| format!("Failed to parse PORT: {e}"))?;
        }

        if let Some(strict) = lookup("STRICT_CREATE") {
            self.strict_create = strict
                .parse::<bool>()
                .map_err(|e| format!("Failed to parse STRICT_CREATE: {e}"))?;
        }

        Ok(self)
    }
}

fn read_config(path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    Config::from_yaml(&contents)
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    // Retrieve env variable
    let config_path = env::var("NOTES_API_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        return read_config(&config_path);
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return read_config("config.yaml");
    }

    // Fallback to config.example.yaml
    if Path::new("config.example.yaml").exists() {
        tracing::warn!(
            "Config file '{}' and 'config.yaml' not found, falling back to 'config.example.yaml'",
            config_path
        );
        return read_config("config.example.yaml");
    }

    // Fallback to environment variables
    tracing::info!("No config file found, loading configuration from environment variables");
    Config::default()
        .with_env(|key| env::var(key).ok())
        .map_err(|e| {
            format!(
                "Config file not found and environment variables are invalid. \
                 Tried: '{config_path}', 'config.yaml', 'config.example.yaml', and environment variables. \
                 Error: {e}"
            )
            .into()
        })
}
