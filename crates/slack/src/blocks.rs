use serde::Serialize;

use heymoji_core::config::{CommandsConfig, EmojiDisplay, LeaderboardConfig};
use heymoji_core::domain::command::CommandKind;
use heymoji_core::domain::leaderboard::{RankedMember, ReactionTally};
use heymoji_core::domain::reaction::Period;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    Plain { text: String },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ButtonElement {
    pub action_id: String,
    pub text: TextObject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ButtonStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ButtonElement {
    pub fn new(action_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            action_id: action_id.into(),
            text: TextObject::plain(label),
            style: None,
            url: None,
        }
    }

    pub fn style(mut self, style: ButtonStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Turns the button into a link; Slack still delivers an interaction payload.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "image")]
pub struct ImageElement {
    pub image_url: String,
    pub alt_text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section {
        block_id: String,
        text: TextObject,
        #[serde(skip_serializing_if = "Option::is_none")]
        accessory: Option<ImageElement>,
    },
    Divider { block_id: String },
    Actions { block_id: String, elements: Vec<ButtonElement> },
    Context { block_id: String, elements: Vec<TextObject> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageTemplate {
    pub fallback_text: String,
    pub blocks: Vec<Block>,
}

pub struct MessageBuilder {
    fallback_text: String,
    blocks: Vec<Block>,
}

impl MessageBuilder {
    pub fn new(fallback_text: impl Into<String>) -> Self {
        Self { fallback_text: fallback_text.into(), blocks: Vec::new() }
    }

    pub fn section<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut SectionBuilder),
    {
        let mut builder = SectionBuilder::default();
        build(&mut builder);
        let (text, accessory) = builder.build();
        self.blocks.push(Block::Section { block_id: block_id.into(), text, accessory });
        self
    }

    pub fn divider(mut self, block_id: impl Into<String>) -> Self {
        self.blocks.push(Block::Divider { block_id: block_id.into() });
        self
    }

    pub fn actions<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut ActionsBuilder),
    {
        let mut builder = ActionsBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Actions { block_id: block_id.into(), elements: builder.build() });
        self
    }

    pub fn context<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut ContextBuilder),
    {
        let mut builder = ContextBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Context { block_id: block_id.into(), elements: builder.build() });
        self
    }

    pub fn build(self) -> MessageTemplate {
        MessageTemplate { fallback_text: self.fallback_text, blocks: self.blocks }
    }
}

#[derive(Default)]
pub struct SectionBuilder {
    text: Option<TextObject>,
    accessory: Option<ImageElement>,
}

impl SectionBuilder {
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::plain(text));
        self
    }

    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::mrkdwn(text));
        self
    }

    pub fn image(&mut self, image_url: impl Into<String>, alt_text: impl Into<String>) -> &mut Self {
        self.accessory =
            Some(ImageElement { image_url: image_url.into(), alt_text: alt_text.into() });
        self
    }

    fn build(self) -> (TextObject, Option<ImageElement>) {
        (self.text.unwrap_or_else(|| TextObject::plain("")), self.accessory)
    }
}

#[derive(Default)]
pub struct ActionsBuilder {
    elements: Vec<ButtonElement>,
}

impl ActionsBuilder {
    pub fn button(&mut self, button: ButtonElement) -> &mut Self {
        self.elements.push(button);
        self
    }

    fn build(self) -> Vec<ButtonElement> {
        self.elements
    }
}

#[derive(Default)]
pub struct ContextBuilder {
    elements: Vec<TextObject>,
}

impl ContextBuilder {
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.elements.push(TextObject::plain(text));
        self
    }

    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.elements.push(TextObject::mrkdwn(text));
        self
    }

    fn build(self) -> Vec<TextObject> {
        self.elements
    }
}

pub fn help_message(commands: &CommandsConfig, bot_name: &str) -> MessageTemplate {
    let lines = CommandKind::ALL
        .iter()
        .map(|kind| {
            let keyword = commands.keyword(*kind);
            let (arguments, summary) = command_usage(*kind);
            if arguments.is_empty() {
                format!("• `@{bot_name} {keyword}` {summary}")
            } else {
                format!("• `@{bot_name} {keyword} {arguments}` {summary}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    MessageBuilder::new(format!("{bot_name} command help"))
        .section("heymoji.help.summary.v1", |section| {
            section.mrkdwn(format!("*Available commands*\n{lines}"));
        })
        .context("heymoji.help.context.v1", |context| {
            context.plain("Named arguments use key=value, e.g. department=platform.");
        })
        .build()
}

fn command_usage(kind: CommandKind) -> (&'static str, &'static str) {
    match kind {
        CommandKind::Help => ("", "show this message"),
        CommandKind::CreateUser => {
            ("@member <username> [avatar_url=..] [department=..]", "register a member")
        }
        CommandKind::UpdateUser => {
            ("@member [username=..] [avatar_url=..] [department=..]", "update member details")
        }
        CommandKind::HideUser => ("@member", "hide a member from the leaderboard"),
        CommandKind::ShowUser => ("@member", "show a hidden member again"),
        CommandKind::ShowBestMembers => ("<year> <month>", "post the monthly leaderboard"),
    }
}

pub fn unknown_command_message(token: &str, help_keyword: &str, bot_name: &str) -> MessageTemplate {
    let summary = if token.is_empty() {
        "No command given.".to_string()
    } else {
        format!("Unknown command `{token}`.")
    };

    MessageBuilder::new(summary.clone())
        .section("heymoji.unknown_command.summary.v1", |section| {
            section.mrkdwn(format!(
                ":warning: {summary} Mention `@{bot_name} {help_keyword}` to list commands."
            ));
        })
        .build()
}

pub fn failure_message(summary: &str, correlation_id: &str) -> MessageTemplate {
    MessageBuilder::new(summary.to_owned())
        .section("heymoji.error.summary.v1", |section| {
            section.mrkdwn(format!(":warning: {summary}"));
        })
        .context("heymoji.error.context.v1", |context| {
            context.plain(format!("Correlation ID: {correlation_id}"));
        })
        .build()
}

pub fn member_saved_message(kind: CommandKind, slack_id: &str) -> MessageTemplate {
    let verb = match kind {
        CommandKind::CreateUser => "registered",
        CommandKind::HideUser => "hidden from the leaderboard",
        CommandKind::ShowUser => "visible on the leaderboard again",
        _ => "updated",
    };

    MessageBuilder::new(format!("Member {slack_id} {verb}"))
        .section("heymoji.member.saved.v1", |section| {
            section.mrkdwn(format!(":white_check_mark: <@{slack_id}> {verb}."));
        })
        .build()
}

/// Maps reaction names to the glyph shown on the leaderboard.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmojiDisplayTable {
    entries: Vec<EmojiDisplay>,
}

impl EmojiDisplayTable {
    pub fn new(entries: Vec<EmojiDisplay>) -> Self {
        Self { entries }
    }

    pub fn glyph(&self, reaction_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.names.iter().any(|name| name == reaction_name))
            .map(|entry| entry.emoji.as_str())
    }

    /// Sums tallies per glyph in table order. Names without a glyph keep their
    /// `:shortcode:` form and follow the configured ones.
    pub fn summarize(&self, reactions: &[ReactionTally]) -> String {
        let mut parts = Vec::new();
        for entry in &self.entries {
            let total: i64 = reactions
                .iter()
                .filter(|tally| entry.names.iter().any(|name| *name == tally.reaction_name))
                .map(|tally| tally.count)
                .sum();
            if total > 0 {
                parts.push(format!("{} {total}", entry.emoji));
            }
        }
        for tally in reactions {
            if tally.count > 0 && self.glyph(&tally.reaction_name).is_none() {
                parts.push(format!(":{}: {}", tally.reaction_name, tally.count));
            }
        }
        parts.join("  ")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardStyle {
    pub display: EmojiDisplayTable,
    pub rank_url: Option<String>,
    pub default_avatar_url: String,
}

impl LeaderboardStyle {
    pub fn from_config(leaderboard: &LeaderboardConfig, emoji_display: &[EmojiDisplay]) -> Self {
        Self {
            display: EmojiDisplayTable::new(emoji_display.to_vec()),
            rank_url: leaderboard.rank_url.clone(),
            default_avatar_url: leaderboard.default_avatar_url.clone(),
        }
    }

    pub fn render(&self, period: &Period, members: &[RankedMember]) -> MessageTemplate {
        let title = format!("{period} best members");

        if members.is_empty() {
            return MessageBuilder::new(title.clone())
                .section("heymoji.leaderboard.header.v1", |section| {
                    section.mrkdwn(format!(":trophy: *{title}*"));
                })
                .section("heymoji.leaderboard.empty.v1", |section| {
                    section.plain(format!("No reactions were recorded for {period}."));
                })
                .build();
        }

        let mut builder = MessageBuilder::new(title.clone())
            .section("heymoji.leaderboard.header.v1", |section| {
                section.mrkdwn(format!(":trophy: *{title}*"));
            })
            .divider("heymoji.leaderboard.divider.v1");

        for (index, member) in members.iter().enumerate() {
            let rank = index + 1;
            let breakdown = self.display.summarize(&member.reactions);
            let avatar =
                member.avatar_url.clone().unwrap_or_else(|| self.default_avatar_url.clone());
            builder = builder.section(format!("heymoji.leaderboard.rank.{rank}.v1"), |section| {
                section
                    .mrkdwn(format!(
                        "{} <@{}> *{}* · {} points\n{breakdown}",
                        rank_badge(rank),
                        member.slack_id,
                        member.username,
                        member.score
                    ))
                    .image(avatar, member.username.clone());
            });
        }

        if let Some(rank_url) = &self.rank_url {
            builder = builder.actions("heymoji.leaderboard.actions.v1", |actions| {
                actions.button(
                    ButtonElement::new("heymoji.leaderboard.full_ranking.v1", "Full ranking")
                        .style(ButtonStyle::Primary)
                        .url(rank_url.clone()),
                );
            });
        }

        builder.build()
    }
}

fn rank_badge(rank: usize) -> String {
    match rank {
        1 => ":first_place_medal:".to_string(),
        2 => ":second_place_medal:".to_string(),
        3 => ":third_place_medal:".to_string(),
        other => format!("*{other}.*"),
    }
}
