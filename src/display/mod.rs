//! Rotating display board: session state machine and its event loop.

pub mod controller;
pub mod session;

#[doc(inline)]
pub use controller::{BoardController, BoardEvent, BoardHandle, BoardRenderer};
#[doc(inline)]
pub use session::{DisplaySession, FetchCommand, SlideState, SlideTimer};
