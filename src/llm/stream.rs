//! Line-oriented reader shared by the streaming backends

use super::error::LlmError;
use super::traits::FragmentStream;
use reqwest::Response;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

/// Fragments buffered between the upstream reader and the HTTP response
const FRAGMENT_BUFFER: usize = 32;

/// What a single upstream line means
#[derive(Debug)]
pub(crate) enum LineOutcome {
    Fragment(String),
    /// Final fragment; the generation is complete after it
    LastFragment(String),
    Skip,
    Done,
    Failed(LlmError),
}

enum Flow {
    Continue,
    /// Upstream signalled completion
    Finished,
    /// Receiver gone or failure already reported
    Stop,
}

/// Read `response` line by line on a background task, turning each line
/// into fragments with `parse`.
///
/// The task stops, dropping the upstream response, as soon as the returned
/// stream is dropped. A body that ends before `parse` reports completion
/// yields a trailing [`LlmError::Stream`].
pub(crate) fn spawn_line_reader<F>(mut response: Response, mut parse: F) -> FragmentStream
where
    F: FnMut(&str) -> LineOutcome + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<Result<String, LlmError>>(FRAGMENT_BUFFER);

    tokio::spawn(async move {
        let mut buffer: Vec<u8> = Vec::new();

        loop {
            let chunk = tokio::select! {
                _ = tx.closed() => {
                    debug!("Fragment receiver dropped, closing upstream stream");
                    return;
                }
                chunk = response.chunk() => chunk,
            };

            match chunk {
                Ok(Some(bytes)) => {
                    buffer.extend_from_slice(&bytes);
                    while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                        let raw: Vec<u8> = buffer.drain(..=pos).collect();
                        let line = String::from_utf8_lossy(&raw);
                        let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
                        match deliver(&tx, parse(line)).await {
                            Flow::Continue => {}
                            Flow::Finished | Flow::Stop => return,
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    let _ = tx.send(Err(LlmError::stream(e.to_string()))).await;
                    return;
                }
            }
        }

        if !buffer.is_empty() {
            let line = String::from_utf8_lossy(&buffer).into_owned();
            match deliver(&tx, parse(line.trim())).await {
                Flow::Continue => {}
                Flow::Finished | Flow::Stop => return,
            }
        }

        warn!("Upstream stream closed before completion");
        let _ = tx
            .send(Err(LlmError::stream("upstream closed before completion")))
            .await;
    });

    Box::pin(ReceiverStream::new(rx))
}

async fn deliver(tx: &mpsc::Sender<Result<String, LlmError>>, outcome: LineOutcome) -> Flow {
    match outcome {
        LineOutcome::Fragment(text) => {
            if tx.send(Ok(text)).await.is_err() {
                debug!("Fragment receiver dropped mid-stream");
                return Flow::Stop;
            }
            Flow::Continue
        }
        LineOutcome::LastFragment(text) => {
            if tx.send(Ok(text)).await.is_err() {
                debug!("Fragment receiver dropped mid-stream");
                return Flow::Stop;
            }
            Flow::Finished
        }
        LineOutcome::Skip => Flow::Continue,
        LineOutcome::Done => Flow::Finished,
        LineOutcome::Failed(e) => {
            let _ = tx.send(Err(e)).await;
            Flow::Stop
        }
    }
}
