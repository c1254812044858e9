//! # Iteration Flows
//!
//! `aiterate` walks a listing one record at a time. Each element is its own
//! queued call, so other callers interleave with a walk in progress.

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use p4_async::{AdapterError, InMemorySession, Record, SessionError};

    use crate::adapter;

    fn labels(names: &[&str]) -> Vec<Record> {
        names.iter().map(|name| Record::spec([("label", *name)])).collect()
    }

    fn label_server(names: &[&str]) -> InMemorySession {
        InMemorySession::new()
            .respond("labels", labels(names))
            .respond_with("label", |args, _| match args {
                [_, name] if name == "broken" => Err(SessionError::command(
                    "label",
                    format!("Label '{name}' is corrupt."),
                )),
                [_, name] => Ok(vec![Record::spec([("Label", name.as_str())])]),
                _ => Ok(Vec::new()),
            })
    }

    #[tokio::test]
    async fn test_walk_interleaves_with_other_callers() {
        let session = label_server(&["v1", "v2", "v3"]);
        let journal = session.journal();
        let p4 = adapter(session);

        let mut stream = p4.aiterate("labels", &["-e", "v*"]).unwrap();
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.field("Label"), Some("v1"));

        p4.arun("info", &[]).await.unwrap();

        let rest: Vec<_> = stream.collect().await;
        assert_eq!(rest.len(), 2);
        assert_eq!(
            journal.commands(),
            vec!["labels", "label", "info", "label", "label"]
        );
        assert_eq!(journal.calls()[0].args, vec!["-e", "v*"]);
    }

    #[tokio::test]
    async fn test_empty_listing_yields_nothing() {
        let p4 = adapter(label_server(&[]));
        let items: Vec<_> = p4.aiterate("labels", &[]).unwrap().collect().await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_ends_walk() {
        let session = label_server(&["v1", "broken", "v3"]);
        let journal = session.journal();
        let p4 = adapter(session);

        let items: Vec<_> = p4.aiterate("labels", &[]).unwrap().collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(
            &items[1],
            Err(AdapterError::Command { command, .. }) if command == "label"
        ));
        assert_eq!(journal.count("label"), 2, "v3 must not be fetched");
    }

    #[tokio::test]
    async fn test_listing_failure_is_first_item() {
        let session = InMemorySession::new().fail("labels", SessionError::NotConnected);
        let p4 = adapter(session);

        let items: Vec<_> = p4.aiterate("labels", &[]).unwrap().collect().await;
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].as_ref().unwrap_err().session_error(),
            Some(&SessionError::NotConnected)
        );
    }

    #[tokio::test]
    async fn test_unlisted_command_fails_up_front() {
        let session = InMemorySession::new();
        let journal = session.journal();
        let p4 = adapter(session);

        let err = p4.aiterate("files", &[]).unwrap_err();
        assert!(matches!(err, AdapterError::UnknownListableCommand(cmd) if cmd == "files"));
        assert!(journal.calls().is_empty());
    }
}
