//! The reducer: `(ChannelState, Action) → ChannelState`.
//!
//! `reduce` is a total, pure function. No I/O, no logging, no panics, and
//! the same input always gives the same output. That is what makes it
//! testable in isolation, and why everything with side effects (logging a
//! channel mismatch, notifying watchers) lives in the store instead.

use crate::{Action, ChannelState};

/// Applies one action to a state and returns the next state.
///
/// Takes the state by value so appends don't have to copy the whole
/// message log; callers that want to keep the old state clone it first.
pub fn reduce(mut state: ChannelState, action: Action) -> ChannelState {
    match action {
        Action::ChangeUser(user) => {
            state.local_user = Some(user);
        }
        Action::AppendMessage(message) => {
            // First message wins: later messages never move the channel id,
            // even when they disagree with it.
            if state.channel_id.is_none() {
                state.channel_id = Some(message.channel_id.clone());
            }
            state.messages.push(message);
        }
        Action::SendMessageRequested(..) => {}
    }
    state
}

// =========================================================================
// Tests
// =========================================================================
