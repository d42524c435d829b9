pub mod engine;
pub mod event;
pub mod scores;
pub mod session;
pub mod step;
