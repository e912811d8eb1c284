use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the server-assigned numeric id
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = crate::error::DeckError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self).map_err(|_| {
                    crate::error::DeckError::Other(format!(
                        "Invalid {} '{}'",
                        stringify!($name),
                        s
                    ))
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Server-assigned identifier of a board
    BoardId
);
entity_id!(
    /// Server-assigned identifier of a stack
    StackId
);
entity_id!(
    /// Server-assigned identifier of a card
    CardId
);
entity_id!(
    /// Server-assigned identifier of a label
    LabelId
);
