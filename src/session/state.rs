use crate::foundation::error::{PopError, PopResult};

/// Observable lifecycle of an overlay session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum SessionState {
    /// No camera stream, no target loaded.
    Idle,
    /// Camera active, target loaded, no marker visible.
    Detecting,
    /// Marker just found; the clip is reset and waits for its first frame.
    Found,
    Animating,
    /// Final pose held; video playing.
    Steady,
    /// Marker gone; immediately followed by `Detecting`.
    Lost,
    Error,
}

/// States reachable in one step from `from`.
pub fn allowed_transitions(from: SessionState) -> &'static [SessionState] {
    use SessionState::*;
    match from {
        Idle => &[Detecting, Error],
        Detecting => &[Found, Idle, Error],
        Found => &[Animating, Found, Lost, Idle, Error],
        Animating => &[Steady, Found, Lost, Idle, Error],
        Steady => &[Found, Lost, Idle, Error],
        Lost => &[Detecting],
        Error => &[Idle],
    }
}

pub fn is_allowed(from: SessionState, to: SessionState) -> bool {
    allowed_transitions(from).contains(&to)
}

pub fn validate_transition(from: SessionState, to: SessionState) -> PopResult<()> {
    if is_allowed(from, to) {
        Ok(())
    } else {
        Err(PopError::validation(format!(
            "illegal session transition {from:?} -> {to:?}"
        )))
    }
}

impl SessionState {
    /// Marker-tracking states, the ones marker loss moves out of.
    pub fn is_tracking(self) -> bool {
        matches!(self, Self::Found | Self::Animating | Self::Steady)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/state.rs"]
mod tests;
