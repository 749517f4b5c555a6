use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlackUserId(pub String);

impl SlackUserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SlackUserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered workspace member that can appear on the leaderboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub slack_id: SlackUserId,
    pub username: String,
    pub avatar_url: Option<String>,
    pub department: Option<String>,
    pub is_hidden: bool,
}

/// Member fields supplied by a command. Absent fields are left untouched on update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAttributes {
    pub slack_id: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub department: Option<String>,
}

impl UserAttributes {
    pub fn user_id(&self) -> SlackUserId {
        SlackUserId(self.slack_id.clone())
    }

    pub fn has_changes(&self) -> bool {
        self.username.is_some() || self.avatar_url.is_some() || self.department.is_some()
    }

    /// Builds a new visible member; `None` when the username is missing.
    pub fn into_member(self) -> Option<Member> {
        let username = self.username?;
        Some(Member {
            slack_id: SlackUserId(self.slack_id),
            username,
            avatar_url: self.avatar_url,
            department: self.department,
            is_hidden: false,
        })
    }
}

impl Member {
    pub fn apply(&mut self, attributes: &UserAttributes) {
        if let Some(username) = &attributes.username {
            self.username = username.clone();
        }
        if let Some(avatar_url) = &attributes.avatar_url {
            self.avatar_url = Some(avatar_url.clone());
        }
        if let Some(department) = &attributes.department {
            self.department = Some(department.clone());
        }
    }
}
