//! Single-image analysis session
//!
//! | From | Event | To |
//! |---|---|---|
//! | any | `SelectImage` / `Clear` | Idle |
//! | Idle (image) / Success / Error | `Analyze` | Analyzing |
//! | Analyzing | `Analyze` | Analyzing (ignored) |
//! | Analyzing | `Completed` (current generation) | Success / Error |
//! | any | `Completed` (old generation) | unchanged |

mod controller;
mod state;

pub use controller::SessionController;
pub use state::{
    AnalysisRequest, Effect, IgnoreReason, ImageSummary, SessionEvent, SessionSnapshot,
    SessionState,
};
