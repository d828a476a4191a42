//! # Events Module
//!
//! Typed lifecycle and progress events for whatever UI drives the engine.
//!
//! ## Delivery
//! - `Started`/`Finished` are always delivered, exactly once per run.
//! - Progress `Value` events are throttled (at most ~8 per second) and may be
//!   dropped; the last value of a stage always equals its `Max`.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::Progress(ProgressEvent::Stage(stage)) => println!("{}", stage),
//!             Event::Progress(ProgressEvent::Value { value }) => println!("{}", value),
//!             _ => {}
//!         }
//!     }
//! });
//!
//! let mut processor = Processor::builder().events(sender).build()?;
//! processor.run(roots);
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
