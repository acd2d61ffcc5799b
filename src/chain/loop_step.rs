use std::sync::Arc;

use tracing::debug;

use crate::continuation::Continuation;

use super::{
    combinator::bind,
    step::{ApiCall, BoxStep, ChainContext, Step, Terminal},
};

/// Value delivered when a bounded loop runs out of iterations.
pub const LOOP_DONE: &str = "Done!";

/// Loop progression. `Done` is the terminal state: once reached, the loop
/// resolves without issuing further work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LoopState {
    Running { remaining: u32 },
    Done,
}

/// Performs exactly `remaining` asynchronous units of work, then resolves
/// with [`LOOP_DONE`].
///
/// Each activation issues one api call unit and rebinds into the loop with
/// the bound decremented; at zero it drives a terminal step instead. There
/// is no unbounded variant. The unit payload (a progress string) threads
/// from one iteration to the next, so each activation sees what the
/// previous unit produced.
pub struct BoundedLoop {
    context: Arc<ChainContext>,
    state: LoopState,
    label: String,
}

impl BoundedLoop {
    pub fn new(context: Arc<ChainContext>, iterations: u32) -> Self {
        let state = if iterations == 0 {
            LoopState::Done
        } else {
            LoopState::Running {
                remaining: iterations,
            }
        };
        Self {
            context,
            state,
            label: String::new(),
        }
    }

    pub fn boxed(context: Arc<ChainContext>, iterations: u32) -> BoxStep<String> {
        Box::new(Self::new(context, iterations))
    }

    fn resumed(context: Arc<ChainContext>, state: LoopState, label: String) -> Self {
        Self {
            context,
            state,
            label,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }
}

impl Step<String> for BoundedLoop {
    fn drive(self: Box<Self>, k: Continuation<String>) {
        debug!(state = %self.state, label = %self.label, "loop activation");
        match self.state {
            LoopState::Done => Terminal::boxed(LOOP_DONE.to_string()).drive(k),
            LoopState::Running { remaining } => {
                let context = self.context;
                let next_state = if remaining > 1 {
                    LoopState::Running {
                        remaining: remaining - 1,
                    }
                } else {
                    LoopState::Done
                };
                let unit =
                    ApiCall::boxed(context.clone(), move || Ok(format!("unit {}", remaining)));
                bind(unit, move |payload: String| -> BoxStep<String> {
                    Box::new(BoundedLoop::resumed(context, next_state, payload))
                })
                .drive(k)
            }
        }
    }
}
