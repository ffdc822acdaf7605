//! `show interfaces switchport` output collection.
//!
//! The 55xx pages long output and wraps long values onto indented
//! continuation lines. Collection is a small state machine fed match events
//! by the session loop; keeping it pure over events makes it testable with
//! no channel attached.
//!
//! While collecting, four patterns race. List order is priority at equal
//! start offsets:
//!
//! 0. pagination banner, answered with a single space keystroke
//! 1. end-of-fields marker
//! 2. `Key: value` line, stored, overwriting an earlier duplicate
//! 3. indented continuation line, appended verbatim to the current key
//!
//! Before the first field only the key/value pattern is armed, which skips
//! the command echo and any preamble.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::bytes::Regex;

/// Pagination banner the 55xx firmware prints between pages. Byte-exact,
/// including the doubled space and the trailing one; no newline follows it.
pub(crate) const PAGINATION_BANNER: &str =
    "More: <space>,  Quit: q or CTRL+Z, One line: <return> ";

static PAGINATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&regex::escape(PAGINATION_BANNER)).expect("static pattern"));

static END_OF_FIELDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Classification rules:\r\n").expect("static pattern"));

static KEY_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^ \t\r\n][^:\r\n]*:[^\n]*\n").expect("static pattern"));

static CONTINUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t][^\n]*\n").expect("static pattern"));

/// What the session loop should do after feeding one match to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShowStep {
    /// Send a single space to page the output forward.
    PageForward,
    /// Keep collecting.
    Collected,
    /// The end marker arrived; resynchronize on the prompt and stop.
    Finished,
}

/// Collection state. `current_key` exists only once the first field has
/// arrived, which is what makes continuation lines safe to apply.
#[derive(Debug)]
enum State {
    AwaitingFirstField,
    Collecting { current_key: String },
    Finished,
}

/// Accumulates one interface's status fields from the paginated output.
#[derive(Debug)]
pub(crate) struct ShowInterfaceParser {
    state: State,
    fields: IndexMap<String, String>,
}

impl ShowInterfaceParser {
    pub(crate) fn new() -> Self {
        Self {
            state: State::AwaitingFirstField,
            fields: IndexMap::new(),
        }
    }

    /// The patterns to race next, in priority order.
    pub(crate) fn patterns(&self) -> Vec<&'static Regex> {
        match self.state {
            State::AwaitingFirstField => vec![&*KEY_VALUE],
            State::Collecting { .. } => {
                vec![&*PAGINATION, &*END_OF_FIELDS, &*KEY_VALUE, &*CONTINUATION]
            }
            State::Finished => Vec::new(),
        }
    }

    /// Feed the winning pattern's index and matched text.
    pub(crate) fn apply(&mut self, index: usize, text: &str) -> ShowStep {
        match self.state {
            // Only the key/value pattern is armed here.
            State::AwaitingFirstField => {
                self.store_field(text);
                ShowStep::Collected
            }
            State::Collecting { .. } => match index {
                0 => ShowStep::PageForward,
                1 => {
                    self.state = State::Finished;
                    ShowStep::Finished
                }
                2 => {
                    self.store_field(text);
                    ShowStep::Collected
                }
                3 => {
                    self.append_continuation(text);
                    ShowStep::Collected
                }
                _ => unreachable!("pattern index out of range"),
            },
            State::Finished => unreachable!("parser already finished"),
        }
    }

    /// Split a matched `Key: value` line at its first colon. The key stays
    /// untrimmed and the value keeps its raw tail, newline included.
    fn store_field(&mut self, line: &str) {
        let (key, value) = line.split_once(':').unwrap_or((line, ""));
        self.fields.insert(key.to_string(), value.to_string());
        self.state = State::Collecting {
            current_key: key.to_string(),
        };
    }

    fn append_continuation(&mut self, text: &str) {
        if let State::Collecting { current_key } = &self.state {
            self.fields
                .entry(current_key.clone())
                .or_default()
                .push_str(text);
        }
    }

    /// The collected fields, in the order the switch printed them.
    pub(crate) fn into_fields(self) -> IndexMap<String, String> {
        self.fields
    }
}
