use serde::{Deserialize, Serialize};

/// The closed set of commands the bot answers to when mentioned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Help,
    CreateUser,
    UpdateUser,
    HideUser,
    ShowUser,
    ShowBestMembers,
}

impl CommandKind {
    pub const ALL: [CommandKind; 6] = [
        Self::Help,
        Self::CreateUser,
        Self::UpdateUser,
        Self::HideUser,
        Self::ShowUser,
        Self::ShowBestMembers,
    ];

    /// Stable position of the kind inside [`CommandKind::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::Help => 0,
            Self::CreateUser => 1,
            Self::UpdateUser => 2,
            Self::HideUser => 3,
            Self::ShowUser => 4,
            Self::ShowBestMembers => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::CreateUser => "create_user",
            Self::UpdateUser => "update_user",
            Self::HideUser => "hide_user",
            Self::ShowUser => "show_user",
            Self::ShowBestMembers => "show_best_members",
        }
    }

    /// Positional argument slots, filled in order by bare tokens.
    pub fn positional_schema(self) -> &'static [&'static str] {
        match self {
            Self::Help => &[],
            Self::CreateUser => &["slack_id", "username"],
            Self::UpdateUser | Self::HideUser | Self::ShowUser => &["slack_id"],
            Self::ShowBestMembers => &["year", "month"],
        }
    }

    pub fn is_query(self) -> bool {
        matches!(self, Self::Help | Self::ShowBestMembers)
    }
}
