pub mod channel;
pub mod severity;

pub use channel::*;
pub use severity::*;
