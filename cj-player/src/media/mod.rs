//! Background music: track policy, backend seam and the sync controller

pub mod backend;
pub mod clock;
pub mod controller;
pub mod policy;

pub use backend::{signal_channel, MediaBackend, MediaSignal, SignalReceiver, SignalSender, SourceToken};
pub use clock::{ClockBackend, ClockOptions};
pub use controller::{MediaState, MediaSyncController};
pub use policy::TrackPolicy;
