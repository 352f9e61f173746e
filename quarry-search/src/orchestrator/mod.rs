//! Run orchestration: the agent pool and per-query post-processing.
//!
//! The pool seeds a shared task queue, drives a fixed set of retrying
//! agents until the queue is joined, shuts them down, and hands each
//! query's accumulated results to the post-processor (dedup by URL,
//! blacklist filter, truncation).

pub mod pool;
pub mod postprocess;

pub use pool::AgentPool;
pub use postprocess::PostProcessor;
