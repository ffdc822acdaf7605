//! Scripted transcript transport for tests.
//!
//! Replays one side of a recorded console exchange and asserts that the
//! session writes exactly what the transcript expects, in order.

use std::collections::VecDeque;
use std::future::pending;
use std::io;

use bytes::Bytes;

use super::Transport;

/// One step of a console transcript.
#[derive(Debug, Clone)]
pub(crate) enum Step {
    /// Deliver a chunk of console output.
    Recv(&'static [u8]),
    /// Require the session to write exactly these bytes next.
    Send(&'static [u8]),
    /// Stall one read until its deadline abandons it (for timeout tests).
    Silence,
}

/// Transport that replays a scripted transcript, panicking on any deviation
/// from the expected write sequence. An exhausted script reads as EOF.
#[derive(Debug)]
pub(crate) struct ScriptedTransport {
    steps: VecDeque<Step>,
}

impl ScriptedTransport {
    pub(crate) fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }
}

impl Transport for ScriptedTransport {
    async fn read_chunk(&mut self) -> io::Result<Option<Bytes>> {
        match self.steps.pop_front() {
            Some(Step::Recv(chunk)) => Ok(Some(Bytes::from_static(chunk))),
            // One stalled read. The step is consumed, so the script resumes
            // once the caller's deadline abandons the wait.
            Some(Step::Silence) => pending().await,
            Some(Step::Send(expected)) => panic!(
                "session read while a write of {:?} was still expected",
                String::from_utf8_lossy(expected)
            ),
            None => Ok(None),
        }
    }

    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        match self.steps.pop_front() {
            Some(Step::Send(expected)) => {
                assert_eq!(
                    String::from_utf8_lossy(data),
                    String::from_utf8_lossy(expected),
                    "transcript write mismatch"
                );
                Ok(())
            }
            other => panic!(
                "unexpected write of {:?} (next transcript step: {other:?})",
                String::from_utf8_lossy(data)
            ),
        }
    }
}
