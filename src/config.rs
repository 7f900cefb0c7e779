/*
 * Copyright (C) 2026 Mark Wells Dev
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Backend used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";

/// Unprefixed environment variables, mapped onto config keys.
const PLAIN_ENV: &[(&str, &str)] = &[
    ("api_url", "API_URL"),
    ("auth_token", "AUTH_TOKEN"),
    ("transport", "TRANSPORT"),
];

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the e-commerce REST API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token for authenticated endpoints (cart, orders)
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Protocol transport
    #[serde(default)]
    pub transport: Transport,

    /// Timeout for backend requests in seconds (default: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Log output format on stderr
    #[serde(default)]
    pub log_format: LogFormat,
}

/// Supported transports. Only stdio is implemented.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout.
    #[default]
    Stdio,
}

/// Log record format.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per record.
    Json,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

const fn default_request_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from standard paths or a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be read or a value has the
    /// wrong type.
    pub fn load(explicit_file: Option<PathBuf>) -> Result<Self> {
        let user_file = dirs::config_dir().map(|dir| dir.join("cartopher").join("config.toml"));
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::load_from(user_file.as_deref(), explicit_file.as_deref(), &env)
    }

    /// Load configuration from the given sources, lowest priority first:
    /// defaults, `user_file` (if it exists), `explicit_file`, `CARTOPHER_*`
    /// variables in `env`, then the plain `API_URL`/`AUTH_TOKEN`/`TRANSPORT`.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be read or a value has the
    /// wrong type.
    pub fn load_from(
        user_file: Option<&Path>,
        explicit_file: Option<&Path>,
        env: &HashMap<String, String>,
    ) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("transport", "stdio")?
            .set_default("request_timeout", 30)?
            .set_default("log_format", "text")?;

        if let Some(path) = user_file.filter(|p| p.exists()) {
            builder = builder.add_source(config::File::from(path));
        }

        if let Some(path) = explicit_file {
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("CARTOPHER").source(Some(env.clone())),
        );

        for (key, var) in PLAIN_ENV {
            let value = env.get(*var).filter(|v| !v.is_empty()).cloned();
            builder = builder.set_override_option(*key, value)?;
        }

        let config = builder
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// The configured token, if it is non-empty.
    pub fn token(&self) -> Option<&str> {
        self.auth_token.as_deref().filter(|t| !t.is_empty())
    }
}
