pub mod ask;
pub mod dispatch;
pub mod exec;
pub mod run;

pub use dispatch::dispatch;
