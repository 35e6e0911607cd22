//! Task runner adapters.

mod inline;
mod worker;

pub use inline::InlineTaskRunner;
pub use worker::WorkerTaskRunner;
