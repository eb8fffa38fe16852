use crate::errors::PipelineError;
use std::collections::VecDeque;
use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Run `worker` over `items` with at most `limit` calls in flight.
///
/// A fixed pool of workers pulls the next unprocessed index from a shared
/// queue. The returned vector is aligned with `items` whatever the
/// completion order. A failed call leaves an error marker in its slot and
/// the batch carries on.
pub async fn map_with_concurrency<T, R, E, F, Fut>(
    items: Vec<T>,
    limit: usize,
    worker: F,
) -> Vec<Result<R, PipelineError>>
where
    T: Send + 'static,
    R: Send + 'static,
    E: Display + Send + 'static,
    F: Fn(usize, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    let total = items.len();
    if total == 0 {
        return Vec::new();
    }

    let queue: Arc<Mutex<VecDeque<(usize, T)>>> =
        Arc::new(Mutex::new(items.into_iter().enumerate().collect()));
    let worker = Arc::new(worker);
    let (tx, mut rx) = mpsc::unbounded_channel::<(usize, Result<R, PipelineError>)>();

    let pool_size = limit.max(1).min(total);
    let mut workers = JoinSet::new();
    for worker_id in 0..pool_size {
        let queue = Arc::clone(&queue);
        let worker = Arc::clone(&worker);
        let tx = tx.clone();
        workers.spawn(async move {
            loop {
                let next = match queue.lock() {
                    Ok(mut queue) => queue.pop_front(),
                    Err(_) => None,
                };
                let Some((index, item)) = next else {
                    break;
                };
                let result = worker(index, item)
                    .await
                    .map_err(|e| PipelineError::Worker(e.to_string()));
                if let Err(PipelineError::Worker(reason)) = &result {
                    tracing::debug!("Pipeline worker {} failed on item {}: {}", worker_id, index, reason);
                }
                if tx.send((index, result)).is_err() {
                    break;
                }
            }
        });
    }
    drop(tx);

    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            tracing::warn!("Pipeline worker stopped early: {}", e);
        }
    }

    let mut slots: Vec<Option<Result<R, PipelineError>>> = (0..total).map(|_| None).collect();
    while let Ok((index, result)) = rx.try_recv() {
        slots[index] = Some(result);
    }

    slots
        .into_iter()
        .map(|slot| slot.unwrap_or(Err(PipelineError::Aborted)))
        .collect()
}
