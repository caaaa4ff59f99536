//! The cooperative read loop that turns parsed events into the stream a
//! container tree actually consumes.
//!
//! Runs entirely on the render thread: feed it bytes as they arrive, get
//! back the events that should be acted on this iteration. Two policies
//! live here that don't belong in the parser itself, since they're about
//! *scheduling* events rather than decoding them:
//!
//! - A run of consecutive mouse-move/drag events is throttled to the
//!   trailing 10 before anything else is asked to look at them, so a fast
//!   drag doesn't leave the app a frame behind.
//! - Once exit has been requested, only CPR replies keep being handed back
//!   immediately (an in-flight cursor-position probe doesn't care whether
//!   the app is shutting down); everything else is held as typeahead for
//!   whatever reads this stream next.

use crate::input::mouse::MouseEvent;
use crate::input::vt100::{ParsedEvent, Parser, TerminalResponse};

const MOUSE_THROTTLE_LIMIT: usize = 10;

pub struct KeyProcessor {
    parser: Parser,
    typeahead: Vec<ParsedEvent>,
    exiting: bool,
}

impl KeyProcessor {
    pub fn new() -> Self {
        Self { parser: Parser::new(), typeahead: Vec::new(), exiting: false }
    }

    pub fn set_cell_pixel_size(&mut self, size: Option<(u16, u16)>) {
        self.parser.set_cell_pixel_size(size);
    }

    /// Mark the app as wanting to exit. From this point, [`Self::feed`]
    /// surfaces only CPR replies and queues everything else as typeahead.
    pub fn request_exit(&mut self) {
        self.exiting = true;
    }

    pub fn is_exiting(&self) -> bool {
        self.exiting
    }

    /// Feed raw bytes, returning the events to act on this iteration.
    pub fn feed(&mut self, data: &[u8]) -> Vec<ParsedEvent> {
        let parsed = self.parser.parse(data);
        self.schedule(parsed)
    }

    /// Commit whatever the parser is holding back as literal keys (the
    /// flush-timer path for an un-followed ESC).
    pub fn flush_pending(&mut self) -> Vec<ParsedEvent> {
        let parsed = self.parser.flush_pending();
        self.schedule(parsed)
    }

    pub fn has_pending(&self) -> bool {
        self.parser.has_pending()
    }

    /// Drain whatever typeahead built up while exiting, so the next reader
    /// of this input stream (a fresh prompt, a shell) sees it.
    pub fn take_typeahead(&mut self) -> Vec<ParsedEvent> {
        std::mem::take(&mut self.typeahead)
    }

    fn schedule(&mut self, parsed: Vec<ParsedEvent>) -> Vec<ParsedEvent> {
        let throttled = throttle_consecutive_mouse(parsed);

        if !self.exiting {
            return throttled;
        }

        let mut ready = Vec::new();
        for event in throttled {
            match event {
                ParsedEvent::Response(TerminalResponse::CursorPosition { .. }) => ready.push(event),
                other => self.typeahead.push(other),
            }
        }
        ready
    }
}

impl Default for KeyProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse any run of consecutive mouse events longer than
/// [`MOUSE_THROTTLE_LIMIT`] down to its trailing `LIMIT` entries, preserving
/// the position of non-mouse events and the relative order of everything
/// kept.
fn throttle_consecutive_mouse(events: Vec<ParsedEvent>) -> Vec<ParsedEvent> {
    let mut out = Vec::with_capacity(events.len());
    let mut run: Vec<MouseEvent> = Vec::new();

    let mut flush_run = |run: &mut Vec<MouseEvent>, out: &mut Vec<ParsedEvent>| {
        if run.is_empty() {
            return;
        }
        let kept = crate::input::mouse::throttle(std::mem::take(run), MOUSE_THROTTLE_LIMIT);
        out.extend(kept.into_iter().map(ParsedEvent::Mouse));
    };

    for event in events {
        match event {
            ParsedEvent::Mouse(m) => run.push(m),
            other => {
                flush_run(&mut run, &mut out);
                out.push(other);
            }
        }
    }
    flush_run(&mut run, &mut out);

    out
}
