//! Trapdoor transition classifier.
//!
//! Reduces a `(previous, new)` pair of block-state descriptors to a three-way
//! [`Transition`] so nothing downstream has to look at descriptor strings.
//! The host may replay duplicate or out-of-order updates, so `previous` is
//! only consulted in strict mode.
//!
//! Descriptors go through the [`BlockState`] parser first. Anything it
//! rejects (`Block{minecraft:oak_trapdoor}[open=true]`, trailing data,
//! property values with `:`) is still classified by scanning the raw text
//! for the marker and an `open=true` / `open=false` token.

use crate::block_state::BlockState;
use tracing::trace;

const OPEN_TOKEN: &str = "open=true";
const CLOSED_TOKEN: &str = "open=false";

/// What a single block update means for the automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    OpenedNow,
    ClosedNow,
    Irrelevant,
}

/// Classifies block updates against a trapdoor marker.
#[derive(Debug, Clone)]
pub struct TrapdoorClassifier {
    marker: String,
    require_strict_prior_closed: bool,
}

impl TrapdoorClassifier {
    pub fn new(marker: impl Into<String>, require_strict_prior_closed: bool) -> Self {
        Self {
            marker: marker.into(),
            require_strict_prior_closed,
        }
    }

    /// Permissive classifier: any update into the open sub-state is an open.
    pub fn permissive() -> Self {
        Self::new(crate::DEFAULT_TRAPDOOR_MARKER, false)
    }

    /// Strict classifier: an open only counts when `previous` was closed.
    pub fn strict() -> Self {
        Self::new(crate::DEFAULT_TRAPDOOR_MARKER, true)
    }

    pub fn is_strict(&self) -> bool {
        self.require_strict_prior_closed
    }

    pub fn classify(&self, previous: &str, new: &str) -> Transition {
        match self.open_flag(new) {
            Some(true) => {
                if !self.require_strict_prior_closed || self.is_closed(previous) {
                    Transition::OpenedNow
                } else {
                    Transition::Irrelevant
                }
            }
            Some(false) => Transition::ClosedNow,
            None => Transition::Irrelevant,
        }
    }

    /// `Some(open)` for a trapdoor descriptor carrying an open flag.
    fn open_flag(&self, descriptor: &str) -> Option<bool> {
        match BlockState::parse(descriptor) {
            Some(state) if state.id.contains(self.marker.as_str()) => state.flag("open"),
            Some(_) => None,
            None => self.scan_open_token(descriptor),
        }
    }

    fn scan_open_token(&self, descriptor: &str) -> Option<bool> {
        if !descriptor.contains(self.marker.as_str()) {
            return None;
        }
        trace!(descriptor, "unparsed descriptor, scanning for open token");
        if descriptor.contains(OPEN_TOKEN) {
            Some(true)
        } else if descriptor.contains(CLOSED_TOKEN) {
            Some(false)
        } else {
            None
        }
    }

    fn is_closed(&self, descriptor: &str) -> bool {
        self.open_flag(descriptor) == Some(false)
    }
}

impl Default for TrapdoorClassifier {
    fn default() -> Self {
        Self::permissive()
    }
}
