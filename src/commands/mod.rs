pub mod analyze;
pub mod key;

pub use analyze::*;
pub use key::*;
