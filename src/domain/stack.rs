use crate::domain::{ordering::Positioned, BoardId, Card, Child, Entity, StackId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An ordered column within a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stack {
    pub id: StackId,
    pub board_id: BoardId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub order: i64,
    /// Cards embedded by bulk loads; stripped before the stack is cached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<Card>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Stack {
    pub fn new(id: StackId, board_id: BoardId, title: impl Into<String>, order: i64) -> Self {
        Self {
            id,
            board_id,
            title: title.into(),
            order,
            cards: None,
            extra: Map::new(),
        }
    }

    /// Removes the embedded cards, leaving the stack without a `cards` field
    pub fn take_cards(&mut self) -> Vec<Card> {
        self.cards.take().unwrap_or_default()
    }
}

impl Entity for Stack {
    type Id = StackId;

    fn id(&self) -> StackId {
        self.id
    }

    fn merge_from(&mut self, incoming: Self) {
        self.board_id = incoming.board_id;
        self.title = incoming.title;
        self.order = incoming.order;
        self.extra.extend(incoming.extra);
    }
}

impl Positioned for Stack {
    fn order(&self) -> i64 {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = order;
    }
}

impl Child for Stack {
    type ParentId = BoardId;

    fn parent_id(&self) -> BoardId {
        self.board_id
    }
}

/// Fields a client supplies when creating a stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStack {
    pub board_id: BoardId,
    pub title: String,
    pub order: i64,
}
