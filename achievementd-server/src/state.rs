//! Application state shared across handlers

use std::sync::Arc;

use crate::dispatch::Dispatcher;
use crate::runner::ProcedureRunner;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(runner: Arc<ProcedureRunner>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                dispatcher: Dispatcher::new(runner),
            }),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    pub fn runner(&self) -> &Arc<ProcedureRunner> {
        self.inner.dispatcher.runner()
    }
}
