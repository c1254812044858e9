//! # Lifecycle Flows
//!
//! `scope` pairs use of the adapter with a guaranteed disconnect:
//!
//! - connected at exit: exactly one disconnect
//! - not connected at exit: no disconnect
//! - body error: disconnect check still runs, then the error propagates
//! - scope dropped early: disconnect is queued in the background

#[cfg(test)]
mod tests {
    use p4_async::{InMemorySession, Record, SessionError};
    use std::time::Duration;

    use crate::adapter;

    #[tokio::test]
    async fn test_connected_scope_disconnects_once() -> anyhow::Result<()> {
        let session = InMemorySession::new()
            .respond("client", vec![Record::spec([("Client", "ws1")])]);
        let journal = session.journal();
        let p4 = adapter(session);

        let client = p4
            .scope(|p4| async move {
                p4.aconnect().await?;
                let client = p4.afetch("client", &["ws1"]).await?;
                Ok::<_, anyhow::Error>(client)
            })
            .await?;

        assert_eq!(client.field("Client"), Some("ws1"));
        assert_eq!(journal.count("disconnect"), 1);
        assert!(!p4.ais_connected().await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_unconnected_scope_skips_disconnect() -> anyhow::Result<()> {
        let session = InMemorySession::new();
        let journal = session.journal();
        let p4 = adapter(session);

        p4.scope(|p4| async move {
            p4.arun("info", &[]).await?;
            Ok::<_, anyhow::Error>(())
        })
        .await?;

        assert_eq!(journal.count("connect"), 0, "entering a scope must not connect");
        assert_eq!(journal.count("disconnect"), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_body_error_still_disconnects() {
        let session = InMemorySession::new().connected().fail(
            "submit",
            SessionError::command("submit", "No files to submit."),
        );
        let journal = session.journal();
        let p4 = adapter(session);

        let err = p4
            .scope(|p4| async move {
                p4.run_submit(None, &["-d", "fix"], true).wait().await?;
                Ok::<_, anyhow::Error>(())
            })
            .await
            .unwrap_err();

        assert!(err.to_string().contains("submit"));
        assert_eq!(journal.commands(), vec!["submit", "disconnect"]);
    }

    #[tokio::test]
    async fn test_close_reports_whether_it_disconnected() -> anyhow::Result<()> {
        let p4 = adapter(InMemorySession::new().connected());

        assert!(p4.close().await?);
        assert!(!p4.close().await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_scope_lost_to_select_still_disconnects() -> anyhow::Result<()> {
        let session = InMemorySession::new();
        let journal = session.journal();
        let p4 = adapter(session);
        p4.aconnect().await?;

        tokio::select! {
            _ = p4.scope(|p4| async move {
                p4.arun("info", &[]).await?;
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, anyhow::Error>(())
            }) => anyhow::bail!("scope should lose the race"),
            _ = tokio::time::sleep(Duration::from_millis(50)) => {}
        }

        assert!(!p4.ais_connected().await?);
        assert_eq!(journal.commands(), vec!["connect", "info", "disconnect"]);
        Ok(())
    }
}
