//! Selection session
//!
//! Gesture, renderer and analysis events in; lasso selection out.

mod events;
mod notice;
mod runtime;
mod state;

pub use events::{SessionEffect, SessionEvent};
pub use notice::{Notice, NoticeLevel};
pub use runtime::{SessionClosed, SessionHandle, SessionRuntime, SessionSnapshot};
pub use state::{PageRecognition, PageSelection, SelectionSession};
