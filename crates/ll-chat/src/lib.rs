//! Chat transcript and assistant context window
//!
//! The transcript is append-only for the session. The context sent with
//! each outgoing message is rebuilt statelessly: a capped sample of the
//! current result set plus the most recent turns, never the full transcript
//! and never the full results.

use ll_core::{
    AssistantContext, AssistantRequest, ChatTurn, KeyValueStore, ResultSet, Row,
};

/// Result rows forwarded to the assistant per message.
const MAX_SAMPLE_ROWS: usize = 20;
/// Prior turns forwarded to the assistant per message.
const MAX_HISTORY_TURNS: usize = 10;

const TRANSCRIPT_KEY: &str = "loglens.chat";

/// Append-only conversation record for one session.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn::assistant(content));
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Restore a transcript persisted by [`Transcript::save`]. Absent or
    /// unreadable records come back empty.
    pub fn load(kv: &dyn KeyValueStore) -> Self {
        let Some(raw) = kv.get(TRANSCRIPT_KEY) else {
            return Self::new();
        };
        match serde_json::from_str(&raw) {
            Ok(turns) => Self { turns },
            Err(error) => {
                tracing::warn!(%error, "discarding unreadable transcript");
                Self::new()
            }
        }
    }

    pub fn save(&self, kv: &dyn KeyValueStore) {
        match serde_json::to_string(&self.turns) {
            Ok(raw) => kv.set(TRANSCRIPT_KEY, &raw),
            Err(error) => tracing::warn!(%error, "failed to serialize transcript"),
        }
    }
}

/// Build the context window for one outgoing message: the first rows of
/// the current result set and the tail of the transcript.
pub fn build_context(
    current: Option<&ResultSet>,
    translated_query: Option<&str>,
    transcript: &Transcript,
) -> (AssistantContext, Vec<ChatTurn>) {
    let (results_sample, result_count) = match current {
        Some(results) => {
            let sample: Vec<Row> = results.rows.iter().take(MAX_SAMPLE_ROWS).cloned().collect();
            (sample, results.row_count())
        }
        None => (Vec::new(), 0),
    };
    let context = AssistantContext {
        translated_query: translated_query.map(str::to_string),
        results_sample,
        result_count,
    };
    let tail_start = transcript.turns.len().saturating_sub(MAX_HISTORY_TURNS);
    let history_slice = transcript.turns[tail_start..].to_vec();
    (context, history_slice)
}

/// Assemble the full request for one outgoing message.
pub fn assistant_request(
    message: impl Into<String>,
    current: Option<&ResultSet>,
    translated_query: Option<&str>,
    transcript: &Transcript,
) -> AssistantRequest {
    let (context, history_slice) = build_context(current, translated_query, transcript);
    AssistantRequest {
        message: message.into(),
        context,
        history_slice,
    }
}
