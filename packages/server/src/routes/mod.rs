// HTTP routes
pub mod health;
pub mod verify;
pub mod webhook;

pub use health::*;
pub use verify::*;
pub use webhook::*;
