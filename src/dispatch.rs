use std::sync::Mutex;

use log::debug;

use crate::error::DispatchError;
use crate::job::ConversionJob;

/// Pending jobs shared by all workers of a batch
///
/// A last-in-first-out stack behind a single mutex. The lock is held only for
/// the push or pop itself. If a participant panics while holding it, the
/// dispatch is poisoned: every later operation fails with
/// `DispatchError::Poisoned` instead of reporting an empty stack.
#[derive(Debug)]
pub struct JobDispatch<J = ConversionJob> {
    jobs: Mutex<Vec<J>>,
}

impl<J> JobDispatch<J> {
    pub fn new() -> Self {
        JobDispatch {
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, job: J) -> Result<(), DispatchError> {
        let pending = {
            let mut jobs = self.jobs.lock().map_err(|_| DispatchError::Poisoned)?;
            jobs.push(job);
            jobs.len()
        };
        debug!("dispatch: job pushed, {} pending", pending);
        Ok(())
    }

    /// Remove the most recently pushed job, or `None` if no job is pending
    pub fn pop(&self) -> Result<Option<J>, DispatchError> {
        let (job, pending) = {
            let mut jobs = self.jobs.lock().map_err(|_| DispatchError::Poisoned)?;
            (jobs.pop(), jobs.len())
        };
        if job.is_some() {
            debug!("dispatch: job popped, {} pending", pending);
        }
        Ok(job)
    }

    /// Number of pending jobs
    pub fn len(&self) -> Result<usize, DispatchError> {
        let len = self.jobs.lock().map_err(|_| DispatchError::Poisoned)?.len();
        Ok(len)
    }

    pub fn is_empty(&self) -> Result<bool, DispatchError> {
        Ok(self.len()? == 0)
    }

    pub fn is_poisoned(&self) -> bool {
        self.jobs.is_poisoned()
    }
}

#[cfg(test)]
impl<J: Send> JobDispatch<J> {
    /// Poison the lock by panicking while holding it
    pub(crate) fn poison(&self) {
        let _ = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = self.jobs.lock();
                panic!("fault while holding the dispatch lock");
            })
            .join()
        });
    }
}

impl<J> Default for JobDispatch<J> {
    fn default() -> Self {
        JobDispatch::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_in_first_out() {
        let dispatch = JobDispatch::new();
        for i in 0..3u32 {
            dispatch.push(i).unwrap();
        }
        assert_eq!(dispatch.len(), Ok(3));
        assert_eq!(dispatch.pop(), Ok(Some(2)));
        assert_eq!(dispatch.pop(), Ok(Some(1)));
        assert_eq!(dispatch.pop(), Ok(Some(0)));
        assert_eq!(dispatch.pop(), Ok(None));
        assert_eq!(dispatch.is_empty(), Ok(true));
    }

    #[test]
    fn poisoned_dispatch_fails_loudly() {
        let dispatch = JobDispatch::new();
        dispatch.push(7u32).unwrap();
        dispatch.poison();
        assert!(dispatch.is_poisoned());
        assert_eq!(dispatch.pop(), Err(DispatchError::Poisoned));
        assert_eq!(dispatch.push(8), Err(DispatchError::Poisoned));
        assert_eq!(dispatch.len(), Err(DispatchError::Poisoned));
    }
}
