use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// The task driving a flight ended without producing a value (it panicked)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightAborted;

/// Per-key request coalescing.
///
/// The first caller for a key spawns the call onto the runtime; every
/// caller, the first included, then awaits the spawned task's result. A
/// caller that is dropped stops waiting but does not cancel the call, so
/// the others still share one execution. The key is forgotten once the
/// call completes, so a later caller starts a fresh call.
pub struct SingleFlight<T> {
    calls: Arc<DashMap<String, watch::Receiver<Option<T>>>>,
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            calls: Arc::new(DashMap::new()),
        }
    }

    /// Run `make()` for `key` unless a call for `key` is already in flight.
    ///
    /// Returns the result and whether this caller joined an existing call.
    /// Must be called from within a tokio runtime.
    pub async fn run<F, Fut>(&self, key: &str, make: F) -> Result<(T, bool), FlightAborted>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (mut rx, joined) = match self.calls.entry(key.to_string()) {
            // A closed sender with the key still present means the task died
            Entry::Occupied(entry) if entry.get().has_changed().is_ok() => {
                (entry.get().clone(), true)
            }
            entry => {
                let (tx, rx) = watch::channel(None);
                entry.insert(rx.clone());

                let calls = Arc::clone(&self.calls);
                let key = key.to_string();
                let call = make();
                tokio::spawn(async move {
                    let value = call.await;
                    // Forget the key before publishing; nobody can join a finished call
                    calls.remove(&key);
                    let _ = tx.send(Some(value));
                });

                (rx, false)
            }
        };

        let value = rx
            .wait_for(Option::is_some)
            .await
            .map(|published| published.clone())
            .map_err(|_| FlightAborted)?;

        value.map(|v| (v, joined)).ok_or(FlightAborted)
    }

    /// Number of keys with a call in flight
    pub fn in_flight(&self) -> usize {
        self.calls.len()
    }
}

impl<T> Default for SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_call() {
        let flight = Arc::new(SingleFlight::<usize>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let flight = Arc::clone(&flight);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                flight
                    .run("hello-en-es", || async move {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        calls.fetch_add(1, Ordering::SeqCst) + 1
                    })
                    .await
            }));
        }

        let mut joined = 0;
        for handle in handles {
            let (value, was_joined) = handle.await.unwrap().unwrap();
            assert_eq!(value, 1);
            if was_joined {
                joined += 1;
            }
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(joined, 7);
        assert_eq!(flight.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_dropping_first_caller_keeps_call_running() {
        let flight = Arc::new(SingleFlight::<usize>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let first = {
            let flight = Arc::clone(&flight);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                flight
                    .run("k", || async move {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        calls.fetch_add(1, Ordering::SeqCst) + 1
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        let second = {
            let flight = Arc::clone(&flight);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                flight
                    .run("k", || async move { calls.fetch_add(1, Ordering::SeqCst) + 100 })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        first.abort();
        let (value, joined) = second.await.unwrap().unwrap();

        assert_eq!(value, 1);
        assert!(joined);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sequential_calls_run_again() {
        let flight = SingleFlight::<u32>::new();

        let first = flight.run("k", || async { 1 }).await.unwrap();
        assert_eq!(first, (1, false));

        let second = flight.run("k", || async { 2 }).await.unwrap();
        assert_eq!(second, (2, false));
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_coalesce() {
        let flight = SingleFlight::<&'static str>::new();
        let (a, b) = tokio::join!(
            flight.run("a", || async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                "a"
            }),
            flight.run("b", || async { "b" }),
        );
        assert_eq!(a, Ok(("a", false)));
        assert_eq!(b, Ok(("b", false)));
    }

    #[tokio::test]
    async fn test_panicking_call_reports_aborted_and_is_replaced() {
        let flight = SingleFlight::<u32>::new();
        let result = flight
            .run("k", || async {
                if true {
                    panic!("lookup task blew up");
                }
                0
            })
            .await;
        assert_eq!(result, Err(FlightAborted));

        let retry = flight.run("k", || async { 7 }).await;
        assert_eq!(retry, Ok((7, false)));
        assert_eq!(flight.in_flight(), 0);
    }
}
