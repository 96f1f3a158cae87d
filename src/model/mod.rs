//! Draft record model and related-entity selection options.

use serde::{Deserialize, Serialize};

/// Backend-assigned record identifier. Never synthesized locally; only a
/// successful load or create response carries one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// The in-memory record being edited. Created empty at controller activation,
/// replaced wholesale when a load completes, mutated field-by-field by user
/// input, and submitted as a whole on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Rich-text body; may embed image references by URL.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub description: String,
    /// Foreign key to a related entity, chosen from [`RelatedOption`]s.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<RecordId>,
}

impl RecordDraft {
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// The create payload: the full draft with the id field stripped.
    pub fn payload_for_create(&self) -> RecordDraft {
        RecordDraft {
            id: None,
            ..self.clone()
        }
    }
}

/// Read-only entry used to populate a related-entity selection control.
/// Fetched once at activation and immutable for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedOption {
    pub id: RecordId,
    pub label: String,
}
