use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::command::CommandKind;
use crate::domain::reaction::normalize_reaction_name;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub slack: SlackConfig,
    pub reactions: ReactionsConfig,
    pub commands: CommandsConfig,
    pub leaderboard: LeaderboardConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SlackConfig {
    pub bot_token: SecretString,
    pub signing_secret: Option<SecretString>,
    pub api_base_url: String,
    pub bot_name: String,
    pub error_channel: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ReactionsConfig {
    pub allowed: Vec<String>,
    pub emoji_display: Vec<EmojiDisplay>,
    pub special_emoji: Option<String>,
    pub special_emoji_monthly_limit: u32,
}

/// Maps one or more Slack reaction names onto the glyph shown in leaderboards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiDisplay {
    pub emoji: String,
    pub names: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandsConfig {
    pub help: String,
    pub create_user: String,
    pub update_user: String,
    pub hide_user: String,
    pub show_user: String,
    pub show_best_members: String,
}

#[derive(Clone, Debug)]
pub struct LeaderboardConfig {
    pub size: usize,
    pub rank_url: Option<String>,
    pub default_avatar_url: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub slack_bot_token: Option<String>,
    pub slack_signing_secret: Option<String>,
    pub slack_error_channel: Option<String>,
    pub server_port: Option<u16>,
    pub allowed_reactions: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

pub const DEFAULT_ALLOWED_REACTIONS: &[&str] =
    &["pray", "heart", "eye_shaking", "+1", "기도", "기쁨", "kkkk", "trophy", "트로피"];

fn default_emoji_display() -> Vec<EmojiDisplay> {
    [
        ("❤️", &["heart"][..]),
        ("🤣", &["kkkk", "기쁨"][..]),
        ("🙏", &["pray", "기도"][..]),
        ("👍", &["+1"][..]),
        ("👀", &["eye_shaking"][..]),
        ("🏆", &["trophy", "트로피"][..]),
    ]
    .into_iter()
    .map(|(emoji, names)| EmojiDisplay {
        emoji: emoji.to_string(),
        names: names.iter().map(|name| name.to_string()).collect(),
    })
    .collect()
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            help: "help".to_string(),
            create_user: "create-user".to_string(),
            update_user: "update-user".to_string(),
            hide_user: "hide-user".to_string(),
            show_user: "show-user".to_string(),
            show_best_members: "show-best".to_string(),
        }
    }
}

impl CommandsConfig {
    pub fn keyword(&self, kind: CommandKind) -> &str {
        match kind {
            CommandKind::Help => &self.help,
            CommandKind::CreateUser => &self.create_user,
            CommandKind::UpdateUser => &self.update_user,
            CommandKind::HideUser => &self.hide_user,
            CommandKind::ShowUser => &self.show_user,
            CommandKind::ShowBestMembers => &self.show_best_members,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://heymoji.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            slack: SlackConfig {
                bot_token: String::new().into(),
                signing_secret: None,
                api_base_url: "https://slack.com/api".to_string(),
                bot_name: "heymojiBOT".to_string(),
                error_channel: None,
            },
            reactions: ReactionsConfig {
                allowed: DEFAULT_ALLOWED_REACTIONS.iter().map(|name| name.to_string()).collect(),
                emoji_display: default_emoji_display(),
                special_emoji: Some("trophy".to_string()),
                special_emoji_monthly_limit: 5,
            },
            commands: CommandsConfig::default(),
            leaderboard: LeaderboardConfig {
                size: 5,
                rank_url: None,
                default_avatar_url: "https://github.com/JAY-Chan9yu/heymoji/blob/master/frontend/src/assets/logos/heymoji.png?raw=true".to_string(),
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("heymoji.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(slack) = patch.slack {
            if let Some(bot_token) = slack.bot_token {
                self.slack.bot_token = secret_value(bot_token);
            }
            if let Some(signing_secret) = slack.signing_secret {
                self.slack.signing_secret = Some(secret_value(signing_secret));
            }
            if let Some(api_base_url) = slack.api_base_url {
                self.slack.api_base_url = api_base_url;
            }
            if let Some(bot_name) = slack.bot_name {
                self.slack.bot_name = bot_name;
            }
            if let Some(error_channel) = slack.error_channel {
                self.slack.error_channel = Some(error_channel);
            }
        }

        if let Some(reactions) = patch.reactions {
            if let Some(allowed) = reactions.allowed {
                self.reactions.allowed = allowed;
            }
            if let Some(emoji_display) = reactions.emoji_display {
                self.reactions.emoji_display = emoji_display;
            }
            if let Some(special_emoji) = reactions.special_emoji {
                self.reactions.special_emoji = non_empty(special_emoji);
            }
            if let Some(limit) = reactions.special_emoji_monthly_limit {
                self.reactions.special_emoji_monthly_limit = limit;
            }
        }

        if let Some(commands) = patch.commands {
            let slots = [
                (commands.help, &mut self.commands.help),
                (commands.create_user, &mut self.commands.create_user),
                (commands.update_user, &mut self.commands.update_user),
                (commands.hide_user, &mut self.commands.hide_user),
                (commands.show_user, &mut self.commands.show_user),
                (commands.show_best_members, &mut self.commands.show_best_members),
            ];
            for (value, slot) in slots {
                if let Some(value) = value {
                    *slot = value;
                }
            }
        }

        if let Some(leaderboard) = patch.leaderboard {
            if let Some(size) = leaderboard.size {
                self.leaderboard.size = size;
            }
            if let Some(rank_url) = leaderboard.rank_url {
                self.leaderboard.rank_url = non_empty(rank_url);
            }
            if let Some(default_avatar_url) = leaderboard.default_avatar_url {
                self.leaderboard.default_avatar_url = default_avatar_url;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("HEYMOJI_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("HEYMOJI_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("HEYMOJI_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("HEYMOJI_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("HEYMOJI_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("HEYMOJI_SLACK_BOT_TOKEN") {
            self.slack.bot_token = secret_value(value);
        }
        if let Some(value) = read_env("HEYMOJI_SLACK_SIGNING_SECRET") {
            self.slack.signing_secret = Some(secret_value(value));
        }
        if let Some(value) = read_env("HEYMOJI_SLACK_API_BASE_URL") {
            self.slack.api_base_url = value;
        }
        if let Some(value) = read_env("HEYMOJI_SLACK_BOT_NAME") {
            self.slack.bot_name = value;
        }
        if let Some(value) = read_env("HEYMOJI_SLACK_ERROR_CHANNEL") {
            self.slack.error_channel = Some(value);
        }

        if let Some(value) = read_env("HEYMOJI_REACTIONS_ALLOWED") {
            self.reactions.allowed = parse_list(&value);
        }
        if let Some(value) = read_env("HEYMOJI_REACTIONS_SPECIAL_EMOJI") {
            self.reactions.special_emoji = non_empty(value);
        }
        if let Some(value) = read_env("HEYMOJI_REACTIONS_SPECIAL_EMOJI_MONTHLY_LIMIT") {
            self.reactions.special_emoji_monthly_limit =
                parse_u32("HEYMOJI_REACTIONS_SPECIAL_EMOJI_MONTHLY_LIMIT", &value)?;
        }

        if let Some(value) = read_env("HEYMOJI_LEADERBOARD_SIZE") {
            self.leaderboard.size = parse_u32("HEYMOJI_LEADERBOARD_SIZE", &value)? as usize;
        }
        if let Some(value) = read_env("HEYMOJI_LEADERBOARD_RANK_URL") {
            self.leaderboard.rank_url = Some(value);
        }
        if let Some(value) = read_env("HEYMOJI_LEADERBOARD_DEFAULT_AVATAR_URL") {
            self.leaderboard.default_avatar_url = value;
        }

        if let Some(value) = read_env("HEYMOJI_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("HEYMOJI_SERVER_PORT") {
            self.server.port = parse_u16("HEYMOJI_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("HEYMOJI_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("HEYMOJI_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("HEYMOJI_LOGGING_LEVEL").or_else(|| read_env("HEYMOJI_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("HEYMOJI_LOGGING_FORMAT").or_else(|| read_env("HEYMOJI_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(bot_token) = overrides.slack_bot_token {
            self.slack.bot_token = secret_value(bot_token);
        }
        if let Some(signing_secret) = overrides.slack_signing_secret {
            self.slack.signing_secret = Some(secret_value(signing_secret));
        }
        if let Some(error_channel) = overrides.slack_error_channel {
            self.slack.error_channel = Some(error_channel);
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(allowed) = overrides.allowed_reactions {
            self.reactions.allowed = allowed;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_slack(&self.slack)?;
        validate_reactions(&self.reactions)?;
        validate_commands(&self.commands)?;
        validate_leaderboard(&self.leaderboard)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("heymoji.toml"), PathBuf::from("config/heymoji.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_slack(slack: &SlackConfig) -> Result<(), ConfigError> {
    let bot_token = slack.bot_token.expose_secret();
    if bot_token.is_empty() {
        return Err(ConfigError::Validation(
            "slack.bot_token is required. Get it from https://api.slack.com/apps > Your App > OAuth & Permissions > Bot User OAuth Token".to_string()
        ));
    }
    if !bot_token.starts_with("xoxb-") {
        let hint = if bot_token.starts_with("xapp-") {
            " (hint: you may have used an app-level token instead of the bot token)"
        } else {
            ""
        };
        return Err(ConfigError::Validation(format!(
            "slack.bot_token must start with `xoxb-`{hint}. Get it from https://api.slack.com/apps"
        )));
    }

    if let Some(secret) = &slack.signing_secret {
        if secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "slack.signing_secret must not be blank when set".to_string(),
            ));
        }
    }

    let base_url = slack.api_base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "slack.api_base_url must start with http:// or https://".to_string(),
        ));
    }

    Ok(())
}

fn validate_reactions(reactions: &ReactionsConfig) -> Result<(), ConfigError> {
    let allowed: Vec<String> = reactions
        .allowed
        .iter()
        .map(|name| normalize_reaction_name(name))
        .filter(|name| !name.is_empty())
        .collect();
    if allowed.is_empty() {
        return Err(ConfigError::Validation(
            "reactions.allowed must list at least one reaction name".to_string(),
        ));
    }

    if let Some(special) = &reactions.special_emoji {
        let normalized = normalize_reaction_name(special);
        if normalized.is_empty() || !allowed.contains(&normalized) {
            return Err(ConfigError::Validation(format!(
                "reactions.special_emoji `{special}` must also appear in reactions.allowed"
            )));
        }
        if reactions.special_emoji_monthly_limit == 0 {
            return Err(ConfigError::Validation(
                "reactions.special_emoji_monthly_limit must be greater than zero".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_commands(commands: &CommandsConfig) -> Result<(), ConfigError> {
    let mut seen: Vec<String> = Vec::with_capacity(CommandKind::ALL.len());
    for kind in CommandKind::ALL {
        let keyword = commands.keyword(kind).trim().to_lowercase();
        if keyword.is_empty() || keyword.contains(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "commands keyword for {kind:?} must be a single non-empty token"
            )));
        }
        if seen.contains(&keyword) {
            return Err(ConfigError::Validation(format!(
                "commands keyword `{keyword}` is assigned to more than one command"
            )));
        }
        seen.push(keyword);
    }

    Ok(())
}

fn validate_leaderboard(leaderboard: &LeaderboardConfig) -> Result<(), ConfigError> {
    if leaderboard.size == 0 || leaderboard.size > 50 {
        return Err(ConfigError::Validation("leaderboard.size must be in range 1..=50".to_string()));
    }

    if let Some(rank_url) = &leaderboard.rank_url {
        if !rank_url.starts_with("http://") && !rank_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "leaderboard.rank_url must start with http:// or https://".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    slack: Option<SlackPatch>,
    reactions: Option<ReactionsPatch>,
    commands: Option<CommandsPatch>,
    leaderboard: Option<LeaderboardPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SlackPatch {
    bot_token: Option<String>,
    signing_secret: Option<String>,
    api_base_url: Option<String>,
    bot_name: Option<String>,
    error_channel: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ReactionsPatch {
    allowed: Option<Vec<String>>,
    emoji_display: Option<Vec<EmojiDisplay>>,
    special_emoji: Option<String>,
    special_emoji_monthly_limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct CommandsPatch {
    help: Option<String>,
    create_user: Option<String>,
    update_user: Option<String>,
    hide_user: Option<String>,
    show_user: Option<String>,
    show_best_members: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LeaderboardPatch {
    size: Option<usize>,
    rank_url: Option<String>,
    default_avatar_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
