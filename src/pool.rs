use std::any::Any;
use std::num::NonZeroUsize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::thread;

use log::{debug, error, info};

use crate::context::WorkerContext;
use crate::dispatch::JobDispatch;
use crate::error::{DispatchError, JobError};
use crate::job::{ConversionJob, JobSummary};

/// Result of one job, as recorded by the worker that ran it
#[derive(Debug)]
pub struct JobOutcome {
    /// Id of the worker (see `WorkerContext`)
    pub worker: usize,
    pub input: PathBuf,
    pub output: PathBuf,
    pub result: Result<JobSummary, JobError>,
}

/// One outcome per job run by the pool, in completion order per worker
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<JobOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Fixed number of worker threads draining a [`JobDispatch`]
#[derive(Clone, Copy, Debug)]
pub struct WorkerPool {
    workers: NonZeroUsize,
}

impl WorkerPool {
    pub fn new(workers: NonZeroUsize) -> Self {
        WorkerPool { workers }
    }

    pub fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    /// Run every pending job, returning once all workers have terminated.
    ///
    /// Job failures (including panics) are logged and recorded in the report.
    /// A poisoned dispatch or a lost worker fails the whole run, after every
    /// other worker has been joined. The jobs completed before the failure are
    /// logged with the error.
    pub fn run(&self, dispatch: &JobDispatch<ConversionJob>) -> Result<BatchReport, DispatchError> {
        let results: Vec<WorkerResult> = thread::scope(|s| {
            let handles: Vec<_> = (1..=self.workers.get())
                .map(|id| {
                    let ctx = WorkerContext::new(id);
                    s.spawn(move || run_worker(&ctx, dispatch))
                })
                .collect();
            handles
                .into_iter()
                .zip(1..)
                .map(|(handle, worker)| {
                    handle.join().unwrap_or_else(|payload| {
                        error!(
                            "worker-{} terminated abnormally: {}",
                            worker,
                            panic_message(payload.as_ref())
                        );
                        (Vec::new(), Err(DispatchError::WorkerLost { worker }))
                    })
                })
                .collect()
        });

        let (report, failure) = merge_worker_results(results);
        match failure {
            None => Ok(report),
            Some(e) => {
                error!(
                    "batch aborted: {} ({} jobs completed: {} succeeded, {} failed)",
                    e,
                    report.len(),
                    report.succeeded(),
                    report.failed()
                );
                for outcome in &report.outcomes {
                    match &outcome.result {
                        Ok(_) => info!("completed before abort: {}", outcome.input.display()),
                        Err(job_error) => error!(
                            "failed before abort: {}: {}",
                            outcome.input.display(),
                            job_error
                        ),
                    }
                }
                Err(e)
            }
        }
    }
}

/// Outcomes recorded by one worker, and how the worker stopped
type WorkerResult = (Vec<JobOutcome>, Result<(), DispatchError>);

/// Gather the outcomes of every worker, keeping the first dispatch error
fn merge_worker_results(results: Vec<WorkerResult>) -> (BatchReport, Option<DispatchError>) {
    let mut report = BatchReport::default();
    let mut failure = None;
    for (outcomes, status) in results {
        report.outcomes.extend(outcomes);
        if let Err(e) = status {
            failure.get_or_insert(e);
        }
    }
    (report, failure)
}

fn run_worker(ctx: &WorkerContext, dispatch: &JobDispatch<ConversionJob>) -> WorkerResult {
    debug!("{}: started", ctx);
    let mut outcomes = Vec::new();
    loop {
        let job = match dispatch.pop() {
            Ok(Some(job)) => job,
            Ok(None) => break,
            Err(e) => {
                error!("{}: {}", ctx, e);
                return (outcomes, Err(e));
            }
        };
        let input = job.input().to_path_buf();
        let output = job.output().to_path_buf();
        let result = match catch_unwind(AssertUnwindSafe(|| job.execute(ctx))) {
            Ok(result) => result,
            Err(payload) => Err(JobError::Panicked(panic_message(payload.as_ref()))),
        };
        match &result {
            Ok(summary) => info!("{}: {} done: {}", ctx, input.display(), summary),
            Err(e) => error!("{}: {} failed: {}", ctx, input.display(), e),
        }
        outcomes.push(JobOutcome {
            worker: ctx.id(),
            input,
            output,
            result,
        });
    }
    debug!("{}: no job left, {} processed", ctx, outcomes.len());
    (outcomes, Ok(()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u8), "unknown panic payload");
    }

    #[test]
    fn empty_dispatch_yields_empty_report() {
        let dispatch = JobDispatch::new();
        let pool = WorkerPool::new(NonZeroUsize::new(3).unwrap());
        let report = pool.run(&dispatch).expect("pool run");
        assert!(report.is_empty());
        assert_eq!((report.succeeded(), report.failed()), (0, 0));
    }

    #[test]
    fn poisoned_dispatch_fails_the_run() {
        let dispatch = JobDispatch::new();
        dispatch.poison();
        let pool = WorkerPool::new(NonZeroUsize::new(2).unwrap());
        assert!(matches!(pool.run(&dispatch), Err(DispatchError::Poisoned)));
    }

    fn outcome(worker: usize, name: &str) -> JobOutcome {
        JobOutcome {
            worker,
            input: PathBuf::from(name),
            output: PathBuf::from("out").join(name),
            result: Err(JobError::Panicked("boom".to_string())),
        }
    }

    #[test]
    fn outcomes_survive_a_dispatch_error() {
        let results = vec![
            (vec![outcome(1, "a.pcap"), outcome(1, "b.pcap")], Err(DispatchError::Poisoned)),
            (vec![outcome(2, "c.pcap")], Ok(())),
            (Vec::new(), Err(DispatchError::WorkerLost { worker: 3 })),
        ];
        let (report, failure) = merge_worker_results(results);
        assert_eq!(report.len(), 3);
        assert_eq!(report.failed(), 3);
        assert_eq!(report.outcomes[2].input, PathBuf::from("c.pcap"));
        // first error wins
        assert!(matches!(failure, Some(DispatchError::Poisoned)));
    }

    #[test]
    fn merge_without_errors() {
        let (report, failure) = merge_worker_results(vec![(vec![outcome(1, "a.pcap")], Ok(()))]);
        assert_eq!(report.len(), 1);
        assert!(failure.is_none());
    }
}
