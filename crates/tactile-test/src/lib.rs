#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unnecessary_map_or)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]
//! Testing harness for Tactile input handling.
//!
//! - [`RecordingHandler`]: a configurable handler that logs every offer
//! - [`DispatchLog`]: the shared log, queried by handler name
//! - [`GestureScript`]: builds touch traces frame by frame
//! - [`InputHarness`]: drives an input context and asserts on deliveries
//!
//! ```
//! use tactile_core::EventCategory;
//! use tactile_test::{GestureScript, InputHarness};
//!
//! let mut h = InputHarness::new();
//! let taps = h.handler("taps").consume_all();
//! h.register(taps, &[EventCategory::Tap]);
//! h.run(GestureScript::new().tap(0, 10.0, 10.0));
//! h.assert_seen(&["taps"]);
//! ```

mod harness;
mod recorder;
mod script;

pub use harness::InputHarness;
pub use recorder::{DispatchLog, LogEntry, RecordingHandler};
pub use script::GestureScript;
