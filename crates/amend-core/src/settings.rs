use crate::akn;
use crate::ident::DEFAULT_ID_LENGTH;
use serde::{Deserialize, Serialize};

/// Settings for document edit operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditSettings {
    /// Length of the random part of minted element ids.
    pub id_length: usize,

    /// Whether structural edits renumber the affected families before
    /// returning. Callers batching several edits can turn this off and
    /// renumber once at the end.
    pub renumber_after_edit: bool,

    /// `refersTo` marker identifying comment annotations.
    pub comment_marker: String,

    /// `refersTo` marker identifying suggestion annotations.
    pub suggestion_marker: String,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self {
            id_length: DEFAULT_ID_LENGTH,
            renumber_after_edit: true,
            comment_marker: akn::COMMENT_MARKER.to_string(),
            suggestion_marker: akn::SUGGESTION_MARKER.to_string(),
        }
    }
}

impl EditSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id_length(mut self, id_length: usize) -> Self {
        self.id_length = id_length;
        self
    }

    pub fn with_renumber_after_edit(mut self, renumber: bool) -> Self {
        self.renumber_after_edit = renumber;
        self
    }

    pub fn with_comment_marker(mut self, marker: impl Into<String>) -> Self {
        self.comment_marker = marker.into();
        self
    }

    pub fn with_suggestion_marker(mut self, marker: impl Into<String>) -> Self {
        self.suggestion_marker = marker.into();
        self
    }
}
