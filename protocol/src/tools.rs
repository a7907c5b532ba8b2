//! Tools the orchestrator backend is known to route to.
//!
//! The chosen tool is an opaque token on the wire; this catalog only adds a display title when
//! the token is recognized.

use strum_macros::AsRefStr;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum KnownTool {
    NoteMaker,
    FlashcardGenerator,
    ConceptExplainer,
}

impl KnownTool {
    pub const ALL: [KnownTool; 3] = [
        KnownTool::NoteMaker,
        KnownTool::FlashcardGenerator,
        KnownTool::ConceptExplainer,
    ];

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_ref() == token)
    }

    pub fn title(self) -> &'static str {
        match self {
            KnownTool::NoteMaker => "Note Maker",
            KnownTool::FlashcardGenerator => "Flashcard Generator",
            KnownTool::ConceptExplainer => "Concept Explainer",
        }
    }
}
