pub mod commands;
mod context;
pub mod logging;
mod observer;

pub use context::AppContext;
pub use observer::Observer;
