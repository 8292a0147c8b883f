pub mod clock;
pub mod controller;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::TimerController;
pub use state::{TimerSnapshot, TimerState, TimerStatus};
