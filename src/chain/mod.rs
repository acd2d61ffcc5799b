//! # Continuation Chains
//!
//! Composable asynchronous steps, driven by continuations instead of return
//! values.
//!
//! ## Flow
//!
//! ```text
//! ┌─────────┐  drive(k')  ┌─────────┐  drive(k)   ┌──────────┐
//! │  Bound  │────────────▶│  inner  │─ ─ resume ─▶│   next   │─ ─▶ k
//! └─────────┘             └─────────┘             └──────────┘
//! ```
//!
//! A [`Bound`] step drives its inner step with a continuation that builds
//! and drives the successor; the original continuation travels inward until
//! a [`Terminal`] step resolves it. An [`ApiCall`] in the middle hands its
//! unit of work to the chain's provider and resumes from wherever that work
//! completes, so a chain started on one thread may finish on another.
//!
//! Chains are constructed synchronously, driven exactly once, and their
//! steps are not reused.

pub mod combinator;
pub mod loop_step;
pub mod step;

pub use combinator::{bind, Bound, Chain, ChainBuilder, ChainId};
pub use loop_step::{BoundedLoop, LoopState, LOOP_DONE};
pub use step::{
    ApiCall, BoxStep, ChainContext, ChainError, ChainResult, Step, Terminal,
};
