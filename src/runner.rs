// ABOUTME: Bounded-concurrency execution of independent async units of work.
// ABOUTME: Keeps at most N tasks in flight and fails fast on the first task error.

use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use std::num::NonZeroUsize;
use tokio::task::{JoinError, JoinHandle};

/// Future produced by starting a task.
pub type TaskFuture<T, E> = BoxFuture<'static, Result<T, E>>;

/// A zero-argument unit of work. Nothing runs until the runner calls it.
pub type TaskFn<T, E> = Box<dyn FnOnce() -> TaskFuture<T, E> + Send>;

/// Box a closure into a [`TaskFn`].
pub fn task<T, E, F, Fut>(f: F) -> TaskFn<T, E>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = Result<T, E>> + Send + 'static,
{
    Box::new(move || Box::pin(f()))
}

/// Errors that end a run early.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError<E> {
    /// A task returned an error.
    #[error("task failed: {0}")]
    Task(E),

    /// A task panicked or was aborted by the runtime.
    #[error("task did not complete: {0}")]
    Join(#[from] JoinError),
}

/// Run `tasks` with at most `max_concurrency` of them in flight.
///
/// Tasks are started in reverse input order: the pending set is a stack and
/// each free slot pops the most recently queued task. Results come back in
/// input order regardless.
///
/// The first task error ends the run. Tasks that already started are detached
/// and keep running; only the starting of new tasks stops.
pub async fn run_with_max_concurrency<T, E>(
    tasks: Vec<TaskFn<T, E>>,
    max_concurrency: NonZeroUsize,
) -> Result<Vec<T>, RunnerError<E>>
where
    T: Send + 'static,
    E: Send + 'static,
{
    let total = tasks.len();
    let mut pending: Vec<(usize, TaskFn<T, E>)> = tasks.into_iter().enumerate().collect();
    let mut results: Vec<Option<T>> = (0..total).map(|_| None).collect();
    let mut in_flight = FuturesUnordered::new();

    let first_batch = max_concurrency.get().min(total);
    for _ in 0..first_batch {
        if let Some((index, task)) = pending.pop() {
            in_flight.push(start(index, task));
        }
    }

    while let Some(joined) = in_flight.next().await {
        let (index, outcome) = joined?;
        results[index] = Some(outcome.map_err(RunnerError::Task)?);

        if let Some((index, task)) = pending.pop() {
            in_flight.push(start(index, task));
        }
    }

    Ok(results.into_iter().flatten().collect())
}

fn start<T, E>(index: usize, task: TaskFn<T, E>) -> JoinHandle<(usize, Result<T, E>)>
where
    T: Send + 'static,
    E: Send + 'static,
{
    tokio::spawn(async move { (index, task().await) })
}
