//! Channel state management for chatsync.
//!
//! This crate owns the client's view of the one channel it is in:
//!
//! 1. **State**: who we are, which channel, and the message log
//!    ([`ChannelState`])
//! 2. **Actions**: the typed events that may change that state
//!    ([`Action`])
//! 3. **Reduction**: the pure function that applies an action
//!    ([`reduce`])
//! 4. **The store**: the single writer that runs reductions and lets
//!    readers watch the result ([`ChannelStore`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Session façade / connection manager (above)  ← dispatch actions
//!     ↕
//! Store (this crate)  ← reduces actions into ChannelState
//!     ↕
//! Protocol (below)  ← provides ChatMessage, UserId, ChannelId
//! ```

mod reducer;
mod state;
mod store;

pub use reducer::reduce;
pub use state::{Action, ChannelState, DEFAULT_CHANNEL_NAME};
pub use store::{ChannelStore, StoreSubscription};
