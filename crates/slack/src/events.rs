use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use heymoji_core::config::ReactionsConfig;
use heymoji_core::domain::member::SlackUserId;
use heymoji_core::domain::reaction::{normalize_reaction_name, ReactionChange};
use heymoji_core::errors::DispatchError;

/// Nested `event.type` values the bot subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlackEventType {
    ReactionAdded,
    ReactionRemoved,
    AppMention,
    Message,
}

impl SlackEventType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "reaction_added" => Some(Self::ReactionAdded),
            "reaction_removed" => Some(Self::ReactionRemoved),
            "app_mention" => Some(Self::AppMention),
            "message" => Some(Self::Message),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReactionAdded => "reaction_added",
            Self::ReactionRemoved => "reaction_removed",
            Self::AppMention => "app_mention",
            Self::Message => "message",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundEvent {
    ChallengeHandshake { challenge: String },
    Reaction(ReactionEvent),
    Mention(MentionEvent),
}

impl InboundEvent {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ChallengeHandshake { .. } => "challenge",
            Self::Reaction(event) => match event.kind {
                ReactionChange::Added => SlackEventType::ReactionAdded.as_str(),
                ReactionChange::Removed => SlackEventType::ReactionRemoved.as_str(),
            },
            Self::Mention(event) => match event.kind {
                MentionKind::AppMention => SlackEventType::AppMention.as_str(),
                MentionKind::AppMessage => SlackEventType::Message.as_str(),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactionEvent {
    pub kind: ReactionChange,
    pub actor_id: SlackUserId,
    pub target_user_id: SlackUserId,
    pub reaction_name: String,
    pub channel: String,
    /// Message ts or file id of the reacted item; empty when Slack omits both.
    pub item_id: String,
    pub event_ts: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MentionKind {
    AppMention,
    AppMessage,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MentionEvent {
    pub kind: MentionKind,
    pub channel: String,
    pub user_id: SlackUserId,
    pub raw_text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropReason {
    SelfReaction,
    ReactionNotAllowed(String),
    MissingTargetUser,
    BotMessage,
    MessageSubtype(String),
    SpecialGrantExhausted,
    UncreditedSpecialReaction,
}

impl DropReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SelfReaction => "self_reaction",
            Self::ReactionNotAllowed(_) => "reaction_not_allowed",
            Self::MissingTargetUser => "missing_target_user",
            Self::BotMessage => "bot_message",
            Self::MessageSubtype(_) => "message_subtype",
            Self::SpecialGrantExhausted => "special_grant_exhausted",
            Self::UncreditedSpecialReaction => "uncredited_special_reaction",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classified {
    Event(InboundEvent),
    Dropped(DropReason),
}

/// Classification result plus the delivery id Slack attaches to event callbacks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedPayload {
    pub event_id: Option<String>,
    pub event_type: Option<String>,
    pub classified: Classified,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl EventContext {
    pub fn new(correlation_id: impl Into<String>) -> Self {
        Self { correlation_id: correlation_id.into() }
    }
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

/// Filters reaction events before they can touch storage.
#[derive(Clone, Debug)]
pub struct ReactionPolicy {
    allowed: HashSet<String>,
}

impl ReactionPolicy {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: allowed
                .into_iter()
                .map(|name| normalize_reaction_name(name.as_ref()))
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &ReactionsConfig) -> Self {
        Self::new(&config.allowed)
    }

    pub fn admit(&self, event: ReactionEvent) -> Classified {
        if event.actor_id == event.target_user_id {
            return Classified::Dropped(DropReason::SelfReaction);
        }
        if !self.allowed.contains(&event.reaction_name) {
            return Classified::Dropped(DropReason::ReactionNotAllowed(event.reaction_name));
        }
        Classified::Event(InboundEvent::Reaction(event))
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawEvent {
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    item_user: Option<String>,
    #[serde(default)]
    reaction: Option<String>,
    #[serde(default)]
    item: Option<RawItem>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    bot_id: Option<String>,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    event_ts: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawItem {
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    file: Option<String>,
}

pub struct EventClassifier {
    policy: ReactionPolicy,
}

impl EventClassifier {
    pub fn new(policy: ReactionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ReactionPolicy {
        &self.policy
    }

    pub fn classify(&self, body: &[u8]) -> Result<ClassifiedPayload, DispatchError> {
        let payload: Value = serde_json::from_slice(body)
            .map_err(|error| DispatchError::MalformedPayload(error.to_string()))?;
        if !payload.is_object() {
            return Err(DispatchError::MalformedPayload("payload is not a json object".to_string()));
        }

        if let Some(challenge) = payload.get("challenge").and_then(Value::as_str) {
            return Ok(ClassifiedPayload {
                event_id: None,
                event_type: None,
                classified: Classified::Event(InboundEvent::ChallengeHandshake {
                    challenge: challenge.to_string(),
                }),
            });
        }

        let event_id = payload.get("event_id").and_then(Value::as_str).map(str::to_string);
        let event = payload
            .get("event")
            .filter(|event| event.is_object())
            .ok_or_else(|| DispatchError::MalformedPayload("missing `event` object".to_string()))?;
        let type_name = event
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| DispatchError::MalformedPayload("missing `event.type`".to_string()))?;
        let event_type = SlackEventType::parse(&type_name)
            .ok_or_else(|| DispatchError::UnknownEventType(type_name.clone()))?;
        let event = RawEvent::deserialize(event)
            .map_err(|error| DispatchError::MalformedPayload(error.to_string()))?;

        let classified = match event_type {
            SlackEventType::ReactionAdded => self.reaction(ReactionChange::Added, event)?,
            SlackEventType::ReactionRemoved => self.reaction(ReactionChange::Removed, event)?,
            SlackEventType::AppMention => mention(MentionKind::AppMention, event)?,
            SlackEventType::Message => mention(MentionKind::AppMessage, event)?,
        };

        Ok(ClassifiedPayload {
            event_id,
            event_type: Some(type_name),
            classified,
        })
    }

    fn reaction(&self, kind: ReactionChange, event: RawEvent) -> Result<Classified, DispatchError> {
        let actor_id = required(event.user, "event.user")?;
        let reaction = required(event.reaction, "event.reaction")?;
        let Some(target_user_id) = event.item_user.filter(|user| !user.is_empty()) else {
            return Ok(Classified::Dropped(DropReason::MissingTargetUser));
        };
        let item = event.item.unwrap_or_default();
        let channel = item.channel.unwrap_or_default();
        let item_id = item.ts.or(item.file).unwrap_or_default();

        Ok(self.policy.admit(ReactionEvent {
            kind,
            actor_id: SlackUserId(actor_id),
            target_user_id: SlackUserId(target_user_id),
            reaction_name: normalize_reaction_name(&reaction),
            channel,
            item_id,
            event_ts: event.event_ts,
        }))
    }
}

fn mention(kind: MentionKind, event: RawEvent) -> Result<Classified, DispatchError> {
    if event.bot_id.is_some() {
        return Ok(Classified::Dropped(DropReason::BotMessage));
    }
    if let Some(subtype) = event.subtype {
        return Ok(Classified::Dropped(if subtype == "bot_message" {
            DropReason::BotMessage
        } else {
            DropReason::MessageSubtype(subtype)
        }));
    }

    Ok(Classified::Event(InboundEvent::Mention(MentionEvent {
        kind,
        channel: required(event.channel, "event.channel")?,
        user_id: SlackUserId(required(event.user, "event.user")?),
        raw_text: event.text.unwrap_or_default(),
    })))
}

fn required(value: Option<String>, field: &str) -> Result<String, DispatchError> {
    value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| DispatchError::MalformedPayload(format!("missing `{field}`")))
}

#[cfg(test)]
mod tests {
    use heymoji_core::domain::reaction::ReactionChange;
    use heymoji_core::errors::DispatchError;

    use super::{
        Classified, DropReason, EventClassifier, InboundEvent, MentionKind, ReactionPolicy,
    };

    fn classifier() -> EventClassifier {
        EventClassifier::new(ReactionPolicy::new(["heart", ":pray:", "trophy"]))
    }

    fn reaction_payload(kind: &str, actor: &str, target: &str, reaction: &str) -> String {
        format!(
            r#"{{"type":"event_callback","event_id":"Ev1","event":{{"type":"{kind}","user":"{actor}","item_user":"{target}","reaction":"{reaction}","item":{{"type":"message","channel":"C1","ts":"1709251200.000100"}},"event_ts":"1709251200.000200"}}}}"#
        )
    }

    #[test]
    fn challenge_wins_over_every_other_field() {
        let payload = br#"{"token":"t","challenge":"abc123","type":"url_verification","event":{"type":"bogus"}}"#;
        let classified = classifier().classify(payload).expect("classified");

        assert_eq!(
            classified.classified,
            Classified::Event(InboundEvent::ChallengeHandshake { challenge: "abc123".to_string() })
        );
    }

    #[test]
    fn reaction_added_is_admitted_with_normalized_name() {
        let payload = reaction_payload("reaction_added", "U1", "U2", "heart::skin-tone-3");
        let classified = classifier().classify(payload.as_bytes()).expect("classified");

        assert_eq!(classified.event_id.as_deref(), Some("Ev1"));
        let Classified::Event(InboundEvent::Reaction(event)) = classified.classified else {
            panic!("expected reaction event");
        };
        assert_eq!(event.kind, ReactionChange::Added);
        assert_eq!(event.reaction_name, "heart");
        assert_eq!(event.channel, "C1");
        assert_eq!(event.item_id, "1709251200.000100");
        assert_eq!(event.target_user_id.as_str(), "U2");
    }

    #[test]
    fn self_reaction_is_dropped() {
        let payload = reaction_payload("reaction_removed", "U1", "U1", "heart");
        let classified = classifier().classify(payload.as_bytes()).expect("classified");
        assert_eq!(classified.classified, Classified::Dropped(DropReason::SelfReaction));
    }

    #[test]
    fn reaction_outside_allow_list_is_dropped() {
        let payload = reaction_payload("reaction_added", "U1", "U2", "thumbsdown");
        let classified = classifier().classify(payload.as_bytes()).expect("classified");
        assert_eq!(
            classified.classified,
            Classified::Dropped(DropReason::ReactionNotAllowed("thumbsdown".to_string()))
        );
    }

    #[test]
    fn allow_list_entries_are_normalized() {
        let payload = reaction_payload("reaction_added", "U1", "U2", "pray");
        let classified = classifier().classify(payload.as_bytes()).expect("classified");
        assert!(matches!(classified.classified, Classified::Event(InboundEvent::Reaction(_))));
    }

    #[test]
    fn app_mention_passes_through() {
        let payload = br#"{"event_id":"Ev2","event":{"type":"app_mention","user":"U1","channel":"C9","text":"<@UBOT> show-best 2024 3"}}"#;
        let classified = classifier().classify(payload).expect("classified");

        let Classified::Event(InboundEvent::Mention(event)) = classified.classified else {
            panic!("expected mention event");
        };
        assert_eq!(event.kind, MentionKind::AppMention);
        assert_eq!(event.channel, "C9");
        assert_eq!(event.raw_text, "<@UBOT> show-best 2024 3");
    }

    #[test]
    fn bot_authored_messages_are_dropped() {
        let payload = br#"{"event":{"type":"message","bot_id":"B1","channel":"C1","text":"hi"}}"#;
        let classified = classifier().classify(payload).expect("classified");
        assert_eq!(classified.classified, Classified::Dropped(DropReason::BotMessage));

        let edited = br#"{"event":{"type":"message","subtype":"message_changed","channel":"C1"}}"#;
        let classified = classifier().classify(edited).expect("classified");
        assert_eq!(
            classified.classified,
            Classified::Dropped(DropReason::MessageSubtype("message_changed".to_string()))
        );
    }

    #[test]
    fn unknown_event_type_is_reported() {
        let payload = br#"{"event":{"type":"channel_created","channel":{"id":"C1"}}}"#;
        let error = classifier().classify(payload).expect_err("unknown type");
        assert_eq!(error, DispatchError::UnknownEventType("channel_created".to_string()));
    }

    #[test]
    fn malformed_payloads_fail_classification() {
        for payload in [&b"not json"[..], b"[1,2]", br#"{"event_id":"Ev3"}"#, br#"{"event":{"type":"app_mention"}}"#] {
            let error = classifier().classify(payload).expect_err("malformed");
            assert_eq!(error.error_class(), "malformed_payload");
        }
    }
}
