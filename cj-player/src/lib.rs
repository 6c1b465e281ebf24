//! # Confession Journal Player (cj-player)
//!
//! Paged journal with background music that follows the reader.
//!
//! **Architecture:** one session loop owns the navigation controller and the
//! media sync controller. User input and media signals are applied one at a
//! time; observers (the terminal renderer) follow along on the EventBus.

pub mod error;
pub mod input;
pub mod media;
pub mod navigation;
pub mod render;
pub mod session;

pub use error::{Error, Result};
pub use input::UserInput;
pub use navigation::{NavigationController, NavigationState, SlideChange};
pub use session::Session;
