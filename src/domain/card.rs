use crate::domain::{ordering::Positioned, CardId, Child, Entity, Label, StackId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An ordered item within a stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub stack_id: StackId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duedate: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<Label>>,
    #[serde(default)]
    pub archived: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Card {
    pub fn new(id: CardId, stack_id: StackId, title: impl Into<String>, order: i64) -> Self {
        Self {
            id,
            stack_id,
            title: title.into(),
            order,
            description: None,
            duedate: None,
            labels: None,
            archived: false,
            extra: Map::new(),
        }
    }
}

impl Entity for Card {
    type Id = CardId;

    fn id(&self) -> CardId {
        self.id
    }

    fn merge_from(&mut self, incoming: Self) {
        self.stack_id = incoming.stack_id;
        self.title = incoming.title;
        self.order = incoming.order;
        self.archived = incoming.archived;
        if incoming.description.is_some() {
            self.description = incoming.description;
        }
        if incoming.duedate.is_some() {
            self.duedate = incoming.duedate;
        }
        if incoming.labels.is_some() {
            self.labels = incoming.labels;
        }
        self.extra.extend(incoming.extra);
    }
}

impl Positioned for Card {
    fn order(&self) -> i64 {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = order;
    }
}

impl Child for Card {
    type ParentId = StackId;

    fn parent_id(&self) -> StackId {
        self.stack_id
    }
}

/// Fields a client supplies when creating a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub stack_id: StackId,
    pub title: String,
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
