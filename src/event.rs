//! Owned event stream produced by the context stack machine and consumed by
//! the serde layer.

use std::collections::VecDeque;

use crate::error::Location;
use crate::tokenizer::ScalarKind;

/// One structural event of a parsed document. The stream is always balanced:
/// every `MapStart`/`SeqStart` has its matching end before the stream runs
/// out.
#[derive(Clone, Debug)]
pub(crate) enum Ev {
    /// Scalar value (also used for mapping keys). Quoting is already resolved
    /// by the tokenizer; only the lexical kind matters downstream.
    Scalar {
        text: String,
        kind: ScalarKind,
        location: Location,
    },
    /// Start of a `- `-sequence.
    SeqStart { location: Location },
    /// End of a sequence.
    SeqEnd { location: Location },
    /// Start of a block mapping (record fields or keyed entries).
    MapStart { location: Location },
    /// End of a mapping.
    MapEnd { location: Location },
}

impl Ev {
    /// Source location attached to this event.
    pub(crate) fn location(&self) -> Location {
        match self {
            Ev::Scalar { location, .. }
            | Ev::SeqStart { location }
            | Ev::SeqEnd { location }
            | Ev::MapStart { location }
            | Ev::MapEnd { location } => *location,
        }
    }

    /// Human phrase for "expected X, found ..." diagnostics.
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Ev::Scalar { .. } => "a scalar",
            Ev::SeqStart { .. } | Ev::SeqEnd { .. } => "a sequence",
            Ev::MapStart { .. } | Ev::MapEnd { .. } => "a mapping",
        }
    }
}

/// Cursor over the materialized event stream, tracking the last location seen
/// for error reporting.
pub(crate) struct Events {
    queue: VecDeque<Ev>,
    last: Location,
}

impl Events {
    pub(crate) fn new(events: Vec<Ev>) -> Self {
        Self {
            queue: events.into(),
            last: Location::UNKNOWN,
        }
    }

    /// Consume and return the next event, remembering its location.
    pub(crate) fn next(&mut self) -> Option<Ev> {
        let ev = self.queue.pop_front();
        if let Some(ev) = &ev {
            self.last = ev.location();
        }
        ev
    }

    /// Look at the next event without consuming it.
    pub(crate) fn peek(&self) -> Option<&Ev> {
        self.queue.front()
    }

    /// Location of the most recently consumed event.
    pub(crate) fn last_location(&self) -> Location {
        self.last
    }
}
