use std::fmt;

/// Identity of the worker on whose behalf the core logs.
///
/// Created once per worker when the pool starts and passed down the job call
/// chain. Every log line emitted while running a job is prefixed with it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorkerContext {
    id: usize,
}

impl WorkerContext {
    pub fn new(id: usize) -> Self {
        WorkerContext { id }
    }

    pub fn id(&self) -> usize {
        self.id
    }
}

impl fmt::Display for WorkerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.id)
    }
}
