//! Submission state machine
//!
//! Elm-style pure transitions: the executor feeds events in and applies the
//! effects that come back. No I/O happens here.

mod effect;
mod event;
mod state;
mod transition;


pub use effect::Effect;
pub use event::Event;
pub use state::SubmissionState;
pub use transition::{transition, TransitionError};
