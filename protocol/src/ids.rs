use std::fmt::Display;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

/// Failure to parse a session identifier from user-provided text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} `{input}`: expected a positive integer")]
pub struct IdParseError {
    kind: &'static str,
    input: String,
}

macro_rules! session_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Identifier assigned by the client after the first successful exchange when none was
            /// configured.
            pub const SENTINEL: Self = Self(1);

            pub fn new(value: i64) -> Self {
                Self(value)
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().parse::<i64>() {
                    Ok(value) if value > 0 => Ok(Self(value)),
                    _ => Err(IdParseError {
                        kind: $kind,
                        input: s.to_string(),
                    }),
                }
            }
        }
    };
}

session_id!(
    /// Identifies the student across chats. Sent as `user_id`.
    UserId,
    "user id"
);

session_id!(
    /// Identifies a single conversation thread. Sent as `chat_id`.
    ChatId,
    "chat id"
);
