use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::member::SlackUserId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionTally {
    pub reaction_name: String,
    pub count: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedMember {
    pub slack_id: SlackUserId,
    pub username: String,
    pub avatar_url: Option<String>,
    pub score: i64,
    pub reactions: Vec<ReactionTally>,
}

/// One `(member, reaction)` counter row for a period, as read from storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub slack_id: SlackUserId,
    pub username: String,
    pub avatar_url: Option<String>,
    pub reaction_name: String,
    pub count: i64,
}

/// Folds counter rows into ranked members. Ties break on slack id so identical
/// input always yields identical output.
pub fn rank_members(rows: impl IntoIterator<Item = LeaderboardRow>, limit: usize) -> Vec<RankedMember> {
    let mut members: BTreeMap<SlackUserId, RankedMember> = BTreeMap::new();

    for row in rows {
        if row.count <= 0 {
            continue;
        }
        let entry = members.entry(row.slack_id.clone()).or_insert_with(|| RankedMember {
            slack_id: row.slack_id.clone(),
            username: row.username.clone(),
            avatar_url: row.avatar_url.clone(),
            score: 0,
            reactions: Vec::new(),
        });
        entry.score += row.count;
        match entry.reactions.iter_mut().find(|tally| tally.reaction_name == row.reaction_name) {
            Some(tally) => tally.count += row.count,
            None => entry
                .reactions
                .push(ReactionTally { reaction_name: row.reaction_name, count: row.count }),
        }
    }

    let mut ranked: Vec<RankedMember> = members.into_values().collect();
    for member in &mut ranked {
        member.reactions.sort_by(|left, right| {
            right.count.cmp(&left.count).then_with(|| left.reaction_name.cmp(&right.reaction_name))
        });
    }
    ranked.sort_by(|left, right| {
        right.score.cmp(&left.score).then_with(|| left.slack_id.cmp(&right.slack_id))
    });
    ranked.truncate(limit);
    ranked
}
