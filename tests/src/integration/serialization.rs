//! # Serialization Flows
//!
//! Many async callers sharing one session through the adapter:
//!
//! 1. Concurrent calls never overlap on the session
//! 2. The runtime keeps running while a call is in flight
//! 3. Queued calls run in the order they were made
//! 4. Failures and panics stay with the call that caused them
//! 5. Dropping a queued call before it starts cancels it

#[cfg(test)]
mod tests {
    use futures::future::join_all;
    use p4_async::{AdapterError, InMemorySession, Record, SessionError};
    use std::sync::{mpsc, Arc};
    use std::time::{Duration, Instant};
    use tokio::time::timeout;

    use crate::adapter;

    // =========================================================================
    // MUTUAL EXCLUSION
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_never_overlap() {
        let session = InMemorySession::new().with_latency(Duration::from_millis(5));
        let journal = session.journal();
        let adapter = Arc::new(adapter(session));

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let adapter = Arc::clone(&adapter);
                tokio::spawn(async move {
                    let path = format!("//depot/{i}/...");
                    adapter.arun("files", &[path.as_str()]).await
                })
            })
            .collect();

        for result in join_all(tasks).await {
            result.unwrap().unwrap();
        }

        assert_eq!(journal.calls().len(), 16);
        assert_eq!(journal.max_concurrency(), 1);
        assert!(!journal.has_overlap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_inline_and_queued_calls_share_the_gate() {
        let session = InMemorySession::new().with_latency(Duration::from_millis(5));
        let journal = session.journal();
        let adapter = Arc::new(adapter(session));

        let inline = {
            let adapter = Arc::clone(&adapter);
            tokio::task::spawn_blocking(move || {
                for _ in 0..5 {
                    adapter
                        .run("info", &[], false)
                        .into_completed()
                        .unwrap()
                        .unwrap();
                }
            })
        };
        let queued: Vec<_> = (0..5).map(|_| adapter.arun("opened", &[])).collect();

        inline.await.unwrap();
        for op in queued {
            op.await.unwrap();
        }

        assert_eq!(journal.calls().len(), 10);
        assert_eq!(journal.max_concurrency(), 1);
        assert!(!journal.has_overlap());
    }

    // =========================================================================
    // NO CALLER-SIDE BLOCKING
    // =========================================================================

    #[tokio::test(flavor = "current_thread")]
    async fn test_slow_call_does_not_block_runtime() {
        let session = InMemorySession::new().with_latency(Duration::from_millis(200));
        let adapter = adapter(session);

        let slow = adapter.arun("sync", &["-q"]);
        let started = Instant::now();
        let ticker = async {
            let mut ticks = 0;
            while started.elapsed() < Duration::from_millis(150) {
                tokio::time::sleep(Duration::from_millis(10)).await;
                ticks += 1;
            }
            ticks
        };

        let (records, ticks) = tokio::join!(slow, ticker);
        records.unwrap();
        assert!(ticks >= 5, "runtime thread stalled: only {ticks} ticks");
    }

    // =========================================================================
    // ORDERING
    // =========================================================================

    #[tokio::test]
    async fn test_queued_calls_run_in_call_order() {
        let session = InMemorySession::new().with_latency(Duration::from_millis(1));
        let journal = session.journal();
        let adapter = adapter(session);

        let commands: Vec<String> = (0..10).map(|i| format!("cmd{i}")).collect();
        let pending: Vec<_> = commands.iter().map(|cmd| adapter.arun(cmd, &[])).collect();
        for result in join_all(pending).await {
            result.unwrap();
        }

        assert_eq!(journal.commands(), commands);
    }

    // =========================================================================
    // FAILURE ISOLATION
    // =========================================================================

    #[tokio::test]
    async fn test_failure_does_not_affect_next_call() {
        let session = InMemorySession::new()
            .fail(
                "sync",
                SessionError::command("sync", "//depot/... - no such file(s)."),
            )
            .respond("info", vec![Record::spec([("serverVersion", "P4D/2024.1")])]);
        let adapter = adapter(session);

        let first = adapter.arun("sync", &["//depot/..."]);
        let second = adapter.arun("info", &[]);

        let err = first.await.unwrap_err();
        assert!(matches!(
            err.session_error(),
            Some(SessionError::Command { message, .. }) if message.contains("no such file")
        ));
        let info = second.await.unwrap();
        assert_eq!(info[0].field("serverVersion"), Some("P4D/2024.1"));
        assert_eq!(adapter.stats().failed, 1);
    }

    #[tokio::test]
    async fn test_panicking_call_does_not_wedge_session() {
        let session = InMemorySession::new()
            .respond_with("crash", |_, _| panic!("session crashed"))
            .respond("info", vec![Record::text("ok")]);
        let adapter = adapter(session);

        let err = adapter.arun("crash", &[]).await.unwrap_err();
        assert!(matches!(err, AdapterError::WorkerPanicked(msg) if msg == "session crashed"));

        let info = timeout(Duration::from_secs(1), adapter.arun("info", &[]))
            .await
            .expect("session still gated after panic")
            .unwrap();
        assert_eq!(info, vec![Record::text("ok")]);
    }

    // =========================================================================
    // CANCELLATION
    // =========================================================================

    #[tokio::test]
    async fn test_dropped_call_never_runs() {
        let session = InMemorySession::new().with_latency(Duration::from_millis(50));
        let journal = session.journal();
        let adapter = adapter(session);

        let first = adapter.arun("first", &[]);
        let abandoned = adapter.arun("abandoned", &[]);
        drop(abandoned);

        first.await.unwrap();
        adapter.arun("last", &[]).await.unwrap();

        assert_eq!(journal.commands(), vec!["first", "last"]);
        assert_eq!(adapter.stats().skipped, 1);
    }

    #[tokio::test]
    async fn test_dropped_running_call_completes() {
        let (started_tx, started_rx) = mpsc::channel();
        let session = InMemorySession::new().respond_with("slow", move |_, _| {
            let _ = started_tx.send(());
            std::thread::sleep(Duration::from_millis(50));
            Ok(Vec::new())
        });
        let journal = session.journal();
        let adapter = adapter(session);

        let slow = adapter.arun("slow", &[]);
        tokio::task::spawn_blocking(move || started_rx.recv())
            .await
            .unwrap()
            .unwrap();
        drop(slow);

        adapter.arun("next", &[]).await.unwrap();
        assert_eq!(journal.commands(), vec!["slow", "next"]);
        assert_eq!(adapter.stats().skipped, 0);
    }
}
