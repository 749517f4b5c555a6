use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use heymoji_core::config::{AppConfig, LoadOptions, LogFormat};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use toml::Value;

use crate::commands::{serialize_payload, CommandResult};

const COMMAND: &str = "config";
const CONFIG_FILE_CANDIDATES: [&str; 2] = ["heymoji.toml", "config/heymoji.toml"];

#[derive(Debug, Serialize)]
struct ConfigField {
    key: &'static str,
    value: String,
    source: String,
}

#[derive(Debug, Serialize)]
struct ConfigReport {
    command: &'static str,
    status: &'static str,
    precedence: &'static str,
    config_file: Option<String>,
    fields: Vec<ConfigField>,
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            );
        }
    };

    let config_file_path = detect_config_path();
    let sources = SourceResolver {
        document: load_config_file_doc(config_file_path.as_deref()),
        path: config_file_path.as_deref(),
    };

    let fields = effective_values(&config)
        .into_iter()
        .map(|(key, value, env_key)| ConfigField {
            key,
            value,
            source: sources.resolve(key, env_key),
        })
        .collect();

    let report = ConfigReport {
        command: COMMAND,
        status: "ok",
        precedence: "env > file > default",
        config_file: config_file_path.map(|path| path.display().to_string()),
        fields,
    };

    CommandResult { exit_code: 0, output: serialize_payload(&report) }
}

fn effective_values(config: &AppConfig) -> Vec<(&'static str, String, &'static str)> {
    vec![
        ("database.url", config.database.url.clone(), "HEYMOJI_DATABASE_URL"),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            "HEYMOJI_DATABASE_MAX_CONNECTIONS",
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            "HEYMOJI_DATABASE_TIMEOUT_SECS",
        ),
        (
            "slack.bot_token",
            redact_token(config.slack.bot_token.expose_secret()),
            "HEYMOJI_SLACK_BOT_TOKEN",
        ),
        (
            "slack.signing_secret",
            redact_optional(config.slack.signing_secret.as_ref()),
            "HEYMOJI_SLACK_SIGNING_SECRET",
        ),
        ("slack.api_base_url", config.slack.api_base_url.clone(), "HEYMOJI_SLACK_API_BASE_URL"),
        ("slack.bot_name", config.slack.bot_name.clone(), "HEYMOJI_SLACK_BOT_NAME"),
        (
            "slack.error_channel",
            or_unset(config.slack.error_channel.as_deref()),
            "HEYMOJI_SLACK_ERROR_CHANNEL",
        ),
        ("reactions.allowed", config.reactions.allowed.join(","), "HEYMOJI_REACTIONS_ALLOWED"),
        (
            "reactions.special_emoji",
            or_unset(config.reactions.special_emoji.as_deref()),
            "HEYMOJI_REACTIONS_SPECIAL_EMOJI",
        ),
        (
            "reactions.special_emoji_monthly_limit",
            config.reactions.special_emoji_monthly_limit.to_string(),
            "HEYMOJI_REACTIONS_SPECIAL_EMOJI_MONTHLY_LIMIT",
        ),
        ("commands.help", config.commands.help.clone(), ""),
        ("commands.create_user", config.commands.create_user.clone(), ""),
        ("commands.update_user", config.commands.update_user.clone(), ""),
        ("commands.hide_user", config.commands.hide_user.clone(), ""),
        ("commands.show_user", config.commands.show_user.clone(), ""),
        ("commands.show_best_members", config.commands.show_best_members.clone(), ""),
        ("leaderboard.size", config.leaderboard.size.to_string(), "HEYMOJI_LEADERBOARD_SIZE"),
        (
            "leaderboard.rank_url",
            or_unset(config.leaderboard.rank_url.as_deref()),
            "HEYMOJI_LEADERBOARD_RANK_URL",
        ),
        ("server.bind_address", config.server.bind_address.clone(), "HEYMOJI_SERVER_BIND_ADDRESS"),
        ("server.port", config.server.port.to_string(), "HEYMOJI_SERVER_PORT"),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            "HEYMOJI_SERVER_GRACEFUL_SHUTDOWN_SECS",
        ),
        ("logging.level", config.logging.level.clone(), "HEYMOJI_LOGGING_LEVEL"),
        (
            "logging.format",
            log_format_name(config.logging.format).to_string(),
            "HEYMOJI_LOGGING_FORMAT",
        ),
    ]
}

struct SourceResolver<'a> {
    document: Option<Value>,
    path: Option<&'a Path>,
}

impl SourceResolver<'_> {
    /// Empty `env_key` means the field has no environment override.
    fn resolve(&self, key_path: &str, env_key: &str) -> String {
        if !env_key.is_empty() && env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }

        if let Some(document) = &self.document {
            if contains_path(document, key_path) {
                let file_path = self
                    .path
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

fn detect_config_path() -> Option<PathBuf> {
    CONFIG_FILE_CANDIDATES.iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn log_format_name(format: LogFormat) -> &'static str {
    match format {
        LogFormat::Compact => "compact",
        LogFormat::Pretty => "pretty",
        LogFormat::Json => "json",
    }
}

fn or_unset(value: Option<&str>) -> String {
    value.unwrap_or("<unset>").to_string()
}

fn redact_optional(secret: Option<&SecretString>) -> String {
    let label = if secret.is_some() { "<redacted>" } else { "<unset>" };
    label.to_string()
}

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
