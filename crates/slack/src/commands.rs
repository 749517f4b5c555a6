use std::collections::BTreeMap;

use heymoji_core::config::CommandsConfig;
use heymoji_core::domain::command::CommandKind;
use heymoji_core::domain::member::UserAttributes;
use heymoji_core::domain::reaction::Period;
use heymoji_core::errors::DispatchError;

/// Attribute keys a command may set with `key=value`.
pub const NAMED_ATTRIBUTES: [&str; 6] =
    ["slack_id", "username", "avatar_url", "department", "year", "month"];

pub type CommandAttributes = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandKeyword {
    Known(CommandKind),
    Unrecognized(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCommand {
    pub keyword: CommandKeyword,
    pub attributes: CommandAttributes,
}

/// Keyword lookup table, one entry per [`CommandKind`] in [`CommandKind::ALL`] order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandKeywords {
    keywords: [String; 6],
}

impl CommandKeywords {
    pub fn from_config(config: &CommandsConfig) -> Self {
        Self { keywords: CommandKind::ALL.map(|kind| normalize_keyword(config.keyword(kind))) }
    }

    pub fn lookup(&self, candidate: &str) -> Option<CommandKind> {
        self.keywords
            .iter()
            .position(|keyword| keyword == candidate)
            .map(|position| CommandKind::ALL[position])
    }

    pub fn keyword(&self, kind: CommandKind) -> &str {
        &self.keywords[kind.index()]
    }
}

impl Default for CommandKeywords {
    fn default() -> Self {
        Self::from_config(&CommandsConfig::default())
    }
}

#[derive(Clone, Debug, Default)]
pub struct CommandParser {
    keywords: CommandKeywords,
}

impl CommandParser {
    pub fn new(keywords: CommandKeywords) -> Self {
        Self { keywords }
    }

    pub fn keywords(&self) -> &CommandKeywords {
        &self.keywords
    }

    pub fn parse(&self, raw_text: &str) -> ParsedCommand {
        let mut tokens = raw_text.split_whitespace().skip_while(|token| is_addressee(token));

        let Some(candidate) = tokens.next().map(normalize_keyword) else {
            return ParsedCommand {
                keyword: CommandKeyword::Unrecognized(String::new()),
                attributes: CommandAttributes::new(),
            };
        };
        let Some(kind) = self.keywords.lookup(&candidate) else {
            return ParsedCommand {
                keyword: CommandKeyword::Unrecognized(candidate),
                attributes: CommandAttributes::new(),
            };
        };

        let schema = kind.positional_schema();
        let mut attributes = CommandAttributes::new();
        let mut next_slot = 0;

        for token in tokens {
            if let Some((key, value)) = split_named(token) {
                if NAMED_ATTRIBUTES.contains(&key.as_str()) && !value.is_empty() {
                    attributes.insert(key, normalize_value(value));
                }
                continue;
            }

            while next_slot < schema.len() && attributes.contains_key(schema[next_slot]) {
                next_slot += 1;
            }
            if let Some(slot) = schema.get(next_slot) {
                attributes.insert((*slot).to_string(), normalize_value(token));
                next_slot += 1;
            }
        }

        ParsedCommand { keyword: CommandKeyword::Known(kind), attributes }
    }
}

/// Year and month requested by the leaderboard command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BestMemberQuery {
    pub year: i32,
    pub month: u32,
}

impl BestMemberQuery {
    pub fn from_attributes(attributes: &CommandAttributes) -> Result<Self, DispatchError> {
        let year = required(attributes, "year")?;
        let month = required(attributes, "month")?;

        let year: i32 = year.parse().map_err(|_| {
            DispatchError::InvalidCommandArguments(format!("year `{year}` is not a number"))
        })?;
        let month: u32 = month.parse().map_err(|_| {
            DispatchError::InvalidCommandArguments(format!("month `{month}` is not a number"))
        })?;
        let period = Period::new(year, month)?;

        Ok(Self { year: period.year(), month: period.month() })
    }

    pub fn period(&self) -> Result<Period, DispatchError> {
        Ok(Period::new(self.year, self.month)?)
    }
}

pub fn user_attributes(attributes: &CommandAttributes) -> Result<UserAttributes, DispatchError> {
    let slack_id = required(attributes, "slack_id")?.to_string();
    Ok(UserAttributes {
        slack_id,
        username: attributes.get("username").cloned(),
        avatar_url: attributes.get("avatar_url").cloned(),
        department: attributes.get("department").cloned(),
    })
}

fn required<'a>(attributes: &'a CommandAttributes, key: &str) -> Result<&'a str, DispatchError> {
    attributes
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| DispatchError::InvalidCommandArguments(format!("missing `{key}`")))
}

fn normalize_keyword(token: &str) -> String {
    token.trim().trim_start_matches(['-', '/']).to_lowercase()
}

fn is_addressee(token: &str) -> bool {
    (token.starts_with("<@") && token.ends_with('>')) || (token.starts_with('@') && token.len() > 1)
}

fn split_named(token: &str) -> Option<(String, &str)> {
    let (key, value) = token.trim_start_matches('-').split_once('=')?;
    if key.is_empty() {
        return None;
    }
    Some((key.to_ascii_lowercase().replace('-', "_"), value))
}

/// Unwraps Slack's angle-bracket escapes: `<@U123|name>` becomes `U123` and
/// `<https://x|label>` becomes `https://x`.
pub fn normalize_value(token: &str) -> String {
    let Some(inner) = token.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) else {
        return token.to_string();
    };
    let target = inner.split('|').next().unwrap_or(inner);
    target.strip_prefix('@').unwrap_or(target).to_string()
}

#[cfg(test)]
mod tests {
    use heymoji_core::config::CommandsConfig;
    use heymoji_core::domain::command::CommandKind;

    use super::{
        normalize_value, user_attributes, BestMemberQuery, CommandKeyword, CommandKeywords,
        CommandParser,
    };

    fn parser() -> CommandParser {
        CommandParser::default()
    }

    #[test]
    fn show_best_fills_year_and_month_positionally() {
        let parsed = parser().parse("@bot show-best 2024 3");

        assert_eq!(parsed.keyword, CommandKeyword::Known(CommandKind::ShowBestMembers));
        assert_eq!(parsed.attributes.get("year").map(String::as_str), Some("2024"));
        assert_eq!(parsed.attributes.get("month").map(String::as_str), Some("3"));
    }

    #[test]
    fn unknown_keyword_yields_sentinel_with_empty_attributes() {
        let parsed = parser().parse("<@UBOT> frobnicate 1 2");
        assert_eq!(parsed.keyword, CommandKeyword::Unrecognized("frobnicate".to_string()));
        assert!(parsed.attributes.is_empty());

        let empty = parser().parse("   <@UBOT>  ");
        assert_eq!(empty.keyword, CommandKeyword::Unrecognized(String::new()));
    }

    #[test]
    fn keyword_match_ignores_case_and_leading_dashes() {
        assert_eq!(parser().parse("--HELP").keyword, CommandKeyword::Known(CommandKind::Help));
        assert_eq!(parser().parse("/help").keyword, CommandKeyword::Known(CommandKind::Help));
    }

    #[test]
    fn create_user_mixes_named_and_positional_attributes() {
        let parsed = parser().parse(
            "<@UBOT> create-user <@U123|kim> --department=platform kim avatar_url=<https://a.test/k.png> color=red",
        );

        assert_eq!(parsed.keyword, CommandKeyword::Known(CommandKind::CreateUser));
        assert_eq!(parsed.attributes.get("slack_id").map(String::as_str), Some("U123"));
        assert_eq!(parsed.attributes.get("username").map(String::as_str), Some("kim"));
        assert_eq!(parsed.attributes.get("department").map(String::as_str), Some("platform"));
        assert_eq!(
            parsed.attributes.get("avatar_url").map(String::as_str),
            Some("https://a.test/k.png")
        );
        assert!(!parsed.attributes.contains_key("color"));
    }

    #[test]
    fn named_slot_is_skipped_by_positional_tokens() {
        let parsed = parser().parse("create-user slack-id=U9 lee extra");
        assert_eq!(parsed.attributes.get("slack_id").map(String::as_str), Some("U9"));
        assert_eq!(parsed.attributes.get("username").map(String::as_str), Some("lee"));
        assert_eq!(parsed.attributes.len(), 2);
    }

    #[test]
    fn configured_keywords_replace_defaults() {
        let config = CommandsConfig { show_best_members: "Best".to_string(), ..Default::default() };
        let parser = CommandParser::new(CommandKeywords::from_config(&config));

        assert_eq!(parser.parse("best 2024 1").keyword, CommandKeyword::Known(CommandKind::ShowBestMembers));
        assert!(matches!(parser.parse("show-best 2024 1").keyword, CommandKeyword::Unrecognized(_)));
        assert_eq!(parser.keywords().keyword(CommandKind::ShowBestMembers), "best");
    }

    #[test]
    fn best_member_query_rejects_bad_numbers() {
        let parsed = parser().parse("show-best 2024 13");
        let error = BestMemberQuery::from_attributes(&parsed.attributes).expect_err("month 13");
        assert_eq!(error.error_class(), "invalid_command_arguments");

        let parsed = parser().parse("show-best twenty 3");
        assert!(BestMemberQuery::from_attributes(&parsed.attributes).is_err());

        let parsed = parser().parse("show-best 2024");
        assert!(BestMemberQuery::from_attributes(&parsed.attributes).is_err());

        let parsed = parser().parse("show-best 2024 03");
        let query = BestMemberQuery::from_attributes(&parsed.attributes).expect("valid");
        assert_eq!((query.year, query.month), (2024, 3));
    }

    #[test]
    fn user_attributes_require_slack_id() {
        let parsed = parser().parse("hide-user");
        assert!(user_attributes(&parsed.attributes).is_err());

        let parsed = parser().parse("update-user <@U5> username=park");
        let attributes = user_attributes(&parsed.attributes).expect("attributes");
        assert_eq!(attributes.slack_id, "U5");
        assert_eq!(attributes.username.as_deref(), Some("park"));
    }

    #[test]
    fn value_normalization_unwraps_slack_escapes() {
        assert_eq!(normalize_value("<@U123|kim>"), "U123");
        assert_eq!(normalize_value("<@U123>"), "U123");
        assert_eq!(normalize_value("plain"), "plain");
    }
}
