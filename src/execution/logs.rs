//! Routing of the runtime's multiplexed log frames.
//!
//! The engine interleaves a container's stdout and stderr on one
//! connection, framing each payload with a stream tag. The runtime
//! client decodes the frame header into [`LogOutput`] values; this
//! routine routes each payload to the matching sink so the two byte
//! streams come out separated again.

use bollard::container::LogOutput;
use bollard::errors::Error;
use futures::{Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Copies a framed log stream into separate stdout/stderr sinks.
///
/// Console frames (TTY containers collapse both streams into one) go
/// to the stdout sink; stdin echo frames are dropped. Sinks are
/// flushed once the stream ends.
///
/// # Errors
///
/// Returns the first stream or write error encountered. Frames read
/// before the failure have already been written.
pub async fn route_frames<S, O, E>(mut stream: S, stdout: &mut O, stderr: &mut E) -> Result<(), Error>
where
    S: Stream<Item = Result<LogOutput, Error>> + Unpin,
    O: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    while let Some(frame) = stream.next().await {
        match frame? {
            LogOutput::StdOut { message } | LogOutput::Console { message } => {
                stdout.write_all(&message).await?;
            }
            LogOutput::StdErr { message } => {
                stderr.write_all(&message).await?;
            }
            LogOutput::StdIn { .. } => {}
        }
    }

    stdout.flush().await?;
    stderr.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn ok_frames(frames: Vec<LogOutput>) -> impl Stream<Item = Result<LogOutput, Error>> + Unpin {
        stream::iter(frames.into_iter().map(Ok))
    }

    #[tokio::test]
    async fn test_frames_route_to_matching_sink() {
        let frames = ok_frames(vec![
            LogOutput::StdOut {
                message: "out one\n".into(),
            },
            LogOutput::StdErr {
                message: "err one\n".into(),
            },
            LogOutput::StdOut {
                message: "out two\n".into(),
            },
        ]);

        let mut out: Vec<u8> = Vec::new();
        let mut err: Vec<u8> = Vec::new();
        route_frames(frames, &mut out, &mut err).await.unwrap();

        assert_eq!(out, b"out one\nout two\n");
        assert_eq!(err, b"err one\n");
    }

    #[tokio::test]
    async fn test_console_frames_go_to_stdout() {
        let frames = ok_frames(vec![LogOutput::Console {
            message: "tty output".into(),
        }]);

        let mut out: Vec<u8> = Vec::new();
        let mut err: Vec<u8> = Vec::new();
        route_frames(frames, &mut out, &mut err).await.unwrap();

        assert_eq!(out, b"tty output");
        assert!(err.is_empty());
    }

    #[tokio::test]
    async fn test_stdin_frames_are_dropped() {
        let frames = ok_frames(vec![LogOutput::StdIn {
            message: "typed".into(),
        }]);

        let mut out: Vec<u8> = Vec::new();
        let mut err: Vec<u8> = Vec::new();
        route_frames(frames, &mut out, &mut err).await.unwrap();

        assert!(out.is_empty());
        assert!(err.is_empty());
    }

    #[tokio::test]
    async fn test_stream_error_is_surfaced() {
        let frames = stream::iter(vec![
            Ok(LogOutput::StdOut {
                message: "partial".into(),
            }),
            Err(Error::DockerResponseServerError {
                status_code: 500,
                message: "connection reset".to_string(),
            }),
        ]);

        let mut out: Vec<u8> = Vec::new();
        let mut err: Vec<u8> = Vec::new();
        let result = route_frames(frames, &mut out, &mut err).await;

        assert!(result.is_err());
        // Frames read before the failure were already written.
        assert_eq!(out, b"partial");
    }
}
