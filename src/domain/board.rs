use crate::domain::{BoardId, Entity, LabelId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};

/// A label attached to exactly one board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: LabelId,
    pub title: String,
    pub color: String,
    pub board_id: BoardId,
}

impl Label {
    pub fn new(
        id: LabelId,
        board_id: BoardId,
        title: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            color: color.into(),
            board_id,
        }
    }
}

/// Fields a client supplies when creating a label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLabel {
    pub board_id: BoardId,
    pub title: String,
    pub color: String,
}

/// A kanban board as returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, deserialize_with = "flag_from_bool_or_int")]
    pub shared: bool,
    #[serde(default, with = "unix_seconds")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Server fields the client does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Board {
    pub fn new(id: BoardId, title: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            color: color.into(),
            archived: false,
            shared: false,
            deleted_at: None,
            labels: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn label(&self, id: LabelId) -> Option<&Label> {
        self.labels.iter().find(|label| label.id == id)
    }
}

impl Entity for Board {
    type Id = BoardId;

    fn id(&self) -> BoardId {
        self.id
    }

    /// Overlays a partial payload. An empty incoming label list keeps the
    /// labels already cached, since nested board payloads omit them.
    fn merge_from(&mut self, incoming: Self) {
        self.title = incoming.title;
        self.color = incoming.color;
        self.archived = incoming.archived;
        self.shared = incoming.shared;
        self.deleted_at = incoming.deleted_at;
        if !incoming.labels.is_empty() {
            self.labels = incoming.labels;
        }
        self.extra.extend(incoming.extra);
    }
}

/// Fields a client supplies when creating a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBoard {
    pub title: String,
    pub color: String,
}

/// Which boards the navigation menu shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardFilter {
    #[default]
    All,
    Archived,
    Shared,
}

impl BoardFilter {
    pub fn matches(&self, board: &Board) -> bool {
        match self {
            Self::All => !board.archived,
            Self::Archived => board.archived,
            Self::Shared => board.shared,
        }
    }
}

impl FromStr for BoardFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "archived" => Ok(Self::Archived),
            "shared" => Ok(Self::Shared),
            _ => Err(format!(
                "Invalid board filter '{}'. Valid filters: all, archived, shared",
                s
            )),
        }
    }
}

impl fmt::Display for BoardFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Archived => write!(f, "archived"),
            Self::Shared => write!(f, "shared"),
        }
    }
}

/// Navigation entry projected from a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardMenuItem {
    pub id: BoardId,
    pub text: String,
    pub color: String,
    pub shared: bool,
    pub archived: bool,
}

impl From<&Board> for BoardMenuItem {
    fn from(board: &Board) -> Self {
        Self {
            id: board.id,
            text: board.title.clone(),
            color: board.color.clone(),
            shared: board.shared,
            archived: board.archived,
        }
    }
}

/// Accepts `true`/`false` as well as integer flags (non-zero is true)
fn flag_from_bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(flag) => flag,
        Flag::Int(raw) => raw != 0,
    })
}

/// Unix seconds on the wire; `null` and `0` both mean "not set"
mod unix_seconds {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(at) => serializer.serialize_i64(at.timestamp()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<i64>::deserialize(deserializer)? {
            None | Some(0) => Ok(None),
            Some(secs) => DateTime::from_timestamp(secs, 0)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {}", secs))),
        }
    }
}
