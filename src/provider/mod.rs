//! # Providers
//!
//! The swappable asynchronous boundary that chains run against.
//!
//! Two concerns are kept separate:
//!
//! - [`AsyncApi`]: *what* one unit of external work is (a timer, an I/O
//!   completion). Promises eventual single completion.
//! - [`Spawner`]: *where* that unit runs (a Tokio runtime, the calling
//!   thread). An api call step submits its unit and returns immediately.
//!
//! Both are trait objects selected at construction time, so production
//! chains run on [`TokioSpawner`] + [`TimerApi`] while tests run
//! deterministically on [`InlineSpawner`] + [`InstantApi`] without touching
//! chain code.

pub mod api;
pub mod spawner;

pub use api::{AsyncApi, InstantApi, TimerApi};
pub use spawner::{InlineSpawner, Spawner, TokioSpawner, UnitFuture};
