//! notes_get and notes_save tools.

use momentum_core::features::Notes;
use momentum_core::{KeyValueStore, LocalStore};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the notes_save tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NotesSaveParams {
    /// Full note text; replaces what was there.
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NotesOutput {
    pub text: String,
    pub chars: usize,
}

impl NotesOutput {
    fn new(text: String) -> Self {
        let chars = text.chars().count();
        Self { text, chars }
    }
}

pub fn get_impl<S: KeyValueStore>(store: &LocalStore<S>) -> Result<CallToolResult, McpError> {
    json_result(&NotesOutput::new(Notes::new(store).load()))
}

pub fn save_impl<S: KeyValueStore>(store: &LocalStore<S>, params: NotesSaveParams) -> Result<CallToolResult, McpError> {
    Notes::new(store).save(&params.text)?;
    json_result(&NotesOutput::new(params.text))
}
