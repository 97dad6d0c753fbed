//! Sequential vs. fan-out scheduling of independent per-object work.

use std::future::Future;

use futures::future::join_all;

/// How a stage runs its per-object operations. Chosen once per build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Await each operation before starting the next; stop at the first error.
    #[default]
    Sequential,
    /// Start every operation, wait for all of them to settle, then report the
    /// first error in launch order.
    Parallel,
}

impl ExecutionMode {
    pub fn from_parallel_flag(parallel: bool) -> Self {
        if parallel {
            Self::Parallel
        } else {
            Self::Sequential
        }
    }

    /// Apply `op` to every item, returning the results in item order.
    pub async fn run_each<I, F, Fut, T, E>(self, items: I, mut op: F) -> Result<Vec<T>, E>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self {
            Self::Sequential => {
                let mut results = Vec::new();
                for item in items {
                    results.push(op(item).await?);
                }
                Ok(results)
            }
            Self::Parallel => join_all(items.into_iter().map(op))
                .await
                .into_iter()
                .collect(),
        }
    }
}
