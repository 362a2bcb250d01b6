//! Feeding an async delta stream into a shared session
//!
//! The session lock is taken once per delta and released while the next
//! delta is awaited, so a cancel or a new review can slip in between
//! deltas. Generation checks in the session make the remaining deltas of a
//! superseded run harmless.

use std::fmt::Display;

use futures::{Stream, StreamExt};
use tokio::sync::Mutex;

use super::editor::{DocumentEditor, ReviewObserver};
use super::session::{ReviewSession, ReviewTicket};
use super::stream::Utf8Deltas;
use super::types::ReviewOutcome;
use super::ReviewError;

/// Consume `deltas` until it ends, then finish the run
///
/// A stream error ends the run early; annotations extracted before the
/// error stay in the session.
pub async fn drive_review<E, O, S, T, Err>(
    session: &Mutex<ReviewSession<E, O>>,
    ticket: &ReviewTicket,
    deltas: S,
) -> Result<ReviewOutcome, ReviewError>
where
    E: DocumentEditor,
    O: ReviewObserver,
    S: Stream<Item = Result<T, Err>>,
    T: AsRef<str>,
    Err: Display,
{
    futures::pin_mut!(deltas);

    while let Some(delta) = deltas.next().await {
        let mut guard = session.lock().await;
        match delta {
            Ok(text) => feed(&mut *guard, ticket, text.as_ref())?,
            Err(e) => return Err(abort(&mut *guard, ticket, e)),
        }
    }

    session.lock().await.finish_review(ticket)
}

/// Same as [`drive_review`] for a stream of raw byte chunks
pub async fn drive_review_bytes<E, O, S, B, Err>(
    session: &Mutex<ReviewSession<E, O>>,
    ticket: &ReviewTicket,
    chunks: S,
) -> Result<ReviewOutcome, ReviewError>
where
    E: DocumentEditor,
    O: ReviewObserver,
    S: Stream<Item = Result<B, Err>>,
    B: AsRef<[u8]>,
    Err: Display,
{
    futures::pin_mut!(chunks);
    let mut decoder = Utf8Deltas::new();

    while let Some(chunk) = chunks.next().await {
        let mut guard = session.lock().await;
        match chunk {
            Ok(bytes) => {
                let text = decoder.decode(bytes.as_ref());
                if !text.is_empty() {
                    feed(&mut *guard, ticket, &text)?;
                }
            }
            Err(e) => return Err(abort(&mut *guard, ticket, e)),
        }
    }

    let mut guard = session.lock().await;
    let tail = decoder.finish();
    if !tail.is_empty() {
        feed(&mut *guard, ticket, &tail)?;
    }
    guard.finish_review(ticket)
}

fn feed<E: DocumentEditor, O: ReviewObserver>(
    session: &mut ReviewSession<E, O>,
    ticket: &ReviewTicket,
    text: &str,
) -> Result<(), ReviewError> {
    if session.push_delta(ticket, text).stale {
        return Err(ReviewError::StaleGeneration {
            requested: ticket.generation,
            current: session.generation(),
        });
    }
    Ok(())
}

fn abort<E: DocumentEditor, O: ReviewObserver>(
    session: &mut ReviewSession<E, O>,
    ticket: &ReviewTicket,
    error: impl Display,
) -> ReviewError {
    let reason = error.to_string();
    session.fail_review(ticket, &reason);
    ReviewError::Stream(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use futures::stream;

    fn shared(text: &str) -> Mutex<ReviewSession<Document>> {
        Mutex::new(ReviewSession::new(Document::from_text(text)))
    }

    #[tokio::test]
    async fn test_drive_review_to_completion() {
        let session = shared("The foo bar is broken.");
        let ticket = session.lock().await.begin_review().unwrap();

        let deltas = stream::iter(vec![
            Ok::<_, std::io::Error>(r#"[{"excerpt":"foo b"#),
            Ok(r#"ar","replace":"foo baz","comment":"typo"}]"#),
        ]);
        let outcome = drive_review(&session, &ticket, deltas).await.unwrap();

        assert_eq!(outcome.annotation_count, 1);
        assert!(!session.lock().await.is_loading());
    }

    #[tokio::test]
    async fn test_stream_error_keeps_partial_results() {
        let session = shared("one two three");
        let ticket = session.lock().await.begin_review().unwrap();

        let deltas = stream::iter(vec![
            Ok(r#"[{"excerpt":"one","replace":"1"},"#.to_string()),
            Err("upstream closed".to_string()),
            Ok(r#"{"excerpt":"two","replace":"2"}]"#.to_string()),
        ]);
        let result = drive_review(&session, &ticket, deltas).await;

        assert!(matches!(result, Err(ReviewError::Stream(_))));
        let guard = session.lock().await;
        assert_eq!(guard.visible().len(), 1);
        assert!(!guard.is_loading());
    }

    #[tokio::test]
    async fn test_cancel_between_deltas_stops_old_run() {
        let session = shared("alpha beta");
        let ticket = session.lock().await.begin_review().unwrap();
        session.lock().await.cancel_review();

        let deltas = stream::iter(vec![Ok::<_, std::io::Error>(r#"{"excerpt":"alpha","replace":"A"}"#)]);
        let result = drive_review(&session, &ticket, deltas).await;

        assert!(matches!(result, Err(ReviewError::StaleGeneration { .. })));
        assert!(session.lock().await.visible().is_empty());
    }

    #[tokio::test]
    async fn test_byte_chunks_split_inside_characters() {
        let session = shared("誤字があります");
        let ticket = session.lock().await.begin_review().unwrap();

        let body = r#"[{"excerpt":"誤字","replace":"誤字脱字"}]"#.as_bytes().to_vec();
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> =
            body.chunks(5).map(|c| Ok(c.to_vec())).collect();
        let outcome = drive_review_bytes(&session, &ticket, stream::iter(chunks))
            .await
            .unwrap();

        assert_eq!(outcome.annotation_count, 1);
        assert_eq!(session.lock().await.editor().highlights().len(), 1);
    }
}
