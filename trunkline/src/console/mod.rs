//! Console session engine.
//!
//! Owns the login handshake, the derived prompt set, and the expect/send
//! primitives everything else is built on. A session is one logical command
//! stream: every operation takes `&mut self`, and the only place the engine
//! suspends waiting on the peer is [`ConsoleSession::expect`].
//!
//! A timed-out expect poisons the session. Once the driver and the switch
//! can no longer be assumed to agree on console state, every later send or
//! expect fails fast; only [`ConsoleSession::disconnect`] remains usable.

mod prompts;

pub use prompts::PromptSet;

use std::sync::LazyLock;
use std::time::Duration;

use bytes::Bytes;
use log::{debug, trace, warn};
use regex::bytes::Regex;
use secrecy::ExposeSecret;
use tokio::time::{Instant, timeout_at};

use crate::channel::{ExpectBuffer, earliest_match};
use crate::error::{ChannelError, ConnectionError, Error, ProtocolError, Result};
use crate::switch::SwitchCredentials;
use crate::transport::Transport;

/// Telnet NVT line terminator.
const LINE_TERMINATOR: &str = "\r\n";

/// Logout command understood by the top-level shell.
const LOGOUT_COMMAND: &str = "exit";

/// Login challenges the switch prints, in order.
static USER_CHALLENGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("User Name:").expect("static pattern"));
static PASSWORD_CHALLENGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("Password:").expect("static pattern"));

/// Locates the self-announced shell prompt: one or more newlines, then a
/// non-empty line ending in `#`.
static PROMPT_LOCATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n]+[^\r\n]+#").expect("static pattern"));

/// A successful expect: which pattern won, and the output around it.
#[derive(Debug, Clone)]
pub struct ExpectMatch {
    /// Index into the pattern list of the winning pattern.
    pub index: usize,
    /// Output that preceded the match. Consumed from the buffer.
    pub before: String,
    /// The matched text itself.
    pub text: String,
}

struct RawMatch {
    index: usize,
    before: Bytes,
    text: Bytes,
}

/// How a raw wait failed. The caller maps this to a typed error, since it
/// knows whether it is in the login handshake or mid-session.
enum WaitFailure {
    Timeout,
    Closed,
    Io(std::io::Error),
}

/// Wait until one of `patterns` matches the buffered output, reading more
/// chunks as needed. The whole wait shares one deadline. On a match, the
/// match and everything before it are consumed; the rest stays buffered.
async fn wait_for<T: Transport>(
    transport: &mut T,
    buffer: &mut ExpectBuffer,
    patterns: &[&Regex],
    timeout: Duration,
) -> std::result::Result<RawMatch, WaitFailure> {
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(hit) = earliest_match(patterns, buffer.as_slice()) {
            let consumed = buffer.consume_to(hit.end);
            let before = consumed.slice(..hit.start);
            let text = consumed.slice(hit.start..);
            return Ok(RawMatch {
                index: hit.index,
                before,
                text,
            });
        }

        let chunk = timeout_at(deadline, transport.read_chunk())
            .await
            .map_err(|_| WaitFailure::Timeout)?
            .map_err(WaitFailure::Io)?;

        match chunk {
            Some(data) => buffer.extend(&data),
            None => return Err(WaitFailure::Closed),
        }
    }
}

/// Wait for one login challenge, mapping failures to connection errors.
async fn await_challenge<T: Transport>(
    transport: &mut T,
    buffer: &mut ExpectBuffer,
    pattern: &Regex,
    challenge: &'static str,
    switch: &str,
    timeout: Duration,
) -> Result<RawMatch> {
    wait_for(transport, buffer, &[pattern], timeout)
        .await
        .map_err(|failure| match failure {
            WaitFailure::Timeout => Error::Connection(ConnectionError::ChallengeTimeout {
                switch: switch.to_string(),
                challenge,
                timeout,
            }),
            WaitFailure::Closed => Error::Connection(ConnectionError::ClosedDuringLogin {
                switch: switch.to_string(),
            }),
            WaitFailure::Io(source) => Error::Channel(ChannelError::Io {
                switch: switch.to_string(),
                source,
            }),
        })
}

async fn write_line<T: Transport>(transport: &mut T, switch: &str, line: &str) -> Result<()> {
    let mut payload = String::with_capacity(line.len() + LINE_TERMINATOR.len());
    payload.push_str(line);
    payload.push_str(LINE_TERMINATOR);

    transport
        .write_all(payload.as_bytes())
        .await
        .map_err(|source| ChannelError::Io {
            switch: switch.to_string(),
            source,
        })?;
    Ok(())
}

/// A live, logged-in console session with one switch.
#[derive(Debug)]
pub struct ConsoleSession<T: Transport> {
    transport: T,
    buffer: ExpectBuffer,
    prompts: PromptSet,
    switch: String,
    read_timeout: Duration,
    last_command: Option<String>,
    desynced: bool,
    logged_out: bool,
}

impl<T: Transport> ConsoleSession<T> {
    /// Log in over an established transport and derive the prompt set.
    ///
    /// Waits for the `User Name:` and `Password:` challenges, answers them
    /// from `credentials`, then locates the announced shell prompt. Every
    /// wait is bounded by `read_timeout`, which also bounds all later
    /// expects on the session.
    pub async fn login(
        mut transport: T,
        credentials: &SwitchCredentials,
        read_timeout: Duration,
    ) -> Result<Self> {
        let switch = credentials.hostname().to_string();
        let mut buffer = ExpectBuffer::new();

        await_challenge(
            &mut transport,
            &mut buffer,
            &USER_CHALLENGE,
            "User Name:",
            &switch,
            read_timeout,
        )
        .await?;
        write_line(&mut transport, &switch, credentials.username()).await?;

        await_challenge(
            &mut transport,
            &mut buffer,
            &PASSWORD_CHALLENGE,
            "Password:",
            &switch,
            read_timeout,
        )
        .await?;
        // Credential payloads are never logged.
        write_line(&mut transport, &switch, credentials.password().expose_secret()).await?;
        debug!("logged in to switch {switch}");

        let located = await_challenge(
            &mut transport,
            &mut buffer,
            &PROMPT_LOCATE,
            "command prompt",
            &switch,
            read_timeout,
        )
        .await?;
        let announced = String::from_utf8_lossy(&located.text);
        let prompts = PromptSet::derive(&announced).map_err(ProtocolError::Pattern)?;
        debug!("derived prompt {:?} for switch {switch}", prompts.raw());

        Ok(Self {
            transport,
            buffer,
            prompts,
            switch,
            read_timeout,
            last_command: None,
            desynced: false,
            logged_out: false,
        })
    }

    /// The switch identity used in logs and errors.
    pub fn switch(&self) -> &str {
        &self.switch
    }

    /// Prompt patterns derived at login.
    pub fn prompts(&self) -> &PromptSet {
        &self.prompts
    }

    /// Whether a failed wait has poisoned this session.
    pub fn is_desynchronized(&self) -> bool {
        self.desynced
    }

    fn guard(&self) -> Result<()> {
        if self.desynced {
            return Err(ProtocolError::Desynchronized {
                switch: self.switch.clone(),
            }
            .into());
        }
        Ok(())
    }

    async fn send_line_raw(&mut self, line: &str) -> Result<()> {
        debug!("sending to switch {}: {line:?}", self.switch);
        self.last_command = Some(line.to_string());
        write_line(&mut self.transport, &self.switch, line).await
    }

    /// Send one command line, terminated for the wire.
    ///
    /// Fire-and-forget: nothing is read back here. The line is recorded so
    /// later errors can name the command in flight.
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        self.guard()?;
        self.send_line_raw(line).await
    }

    /// Send raw text with no line terminator. Used for single-keystroke
    /// answers such as paging.
    pub async fn send(&mut self, text: &str) -> Result<()> {
        self.guard()?;
        trace!("sending {} raw bytes to switch {}", text.len(), self.switch);
        self.transport
            .write_all(text.as_bytes())
            .await
            .map_err(|source| ChannelError::Io {
                switch: self.switch.clone(),
                source,
            })?;
        Ok(())
    }

    /// Wait for the first of `patterns` to match the console output.
    ///
    /// Patterns race over everything buffered so far plus whatever arrives
    /// before the deadline. The match whose start lies earliest wins; ties
    /// at the same offset go to the pattern listed first. On success the
    /// match and everything before it are consumed.
    ///
    /// A timeout poisons the session.
    pub async fn expect(&mut self, patterns: &[&Regex]) -> Result<ExpectMatch> {
        self.guard()?;

        match wait_for(&mut self.transport, &mut self.buffer, patterns, self.read_timeout).await {
            Ok(raw) => Ok(ExpectMatch {
                index: raw.index,
                before: String::from_utf8_lossy(&raw.before).into_owned(),
                text: String::from_utf8_lossy(&raw.text).into_owned(),
            }),
            Err(WaitFailure::Timeout) => {
                self.desynced = true;
                Err(ProtocolError::ExpectTimeout {
                    switch: self.switch.clone(),
                    timeout: self.read_timeout,
                    last_command: self.last_command.clone(),
                }
                .into())
            }
            Err(WaitFailure::Closed) => Err(ChannelError::Closed {
                switch: self.switch.clone(),
                last_command: self.last_command.clone(),
            }
            .into()),
            Err(WaitFailure::Io(source)) => Err(ChannelError::Io {
                switch: self.switch.clone(),
                source,
            }
            .into()),
        }
    }

    /// Wait for the main shell prompt.
    pub async fn expect_prompt(&mut self) -> Result<ExpectMatch> {
        let main = self.prompts.main().clone();
        self.expect(&[&main]).await
    }

    /// Log out and wait for the switch to close the channel.
    ///
    /// Consuming `self` makes a second disconnect unrepresentable. Still
    /// callable on a desynchronized session.
    pub async fn disconnect(mut self) -> Result<()> {
        self.send_line_raw(LOGOUT_COMMAND).await?;

        // Drain whatever the switch prints on the way out; EOF is the
        // success condition here.
        let deadline = Instant::now() + self.read_timeout;
        loop {
            let chunk = timeout_at(deadline, self.transport.read_chunk())
                .await
                .map_err(|_| ProtocolError::ExpectTimeout {
                    switch: self.switch.clone(),
                    timeout: self.read_timeout,
                    last_command: self.last_command.clone(),
                })?
                .map_err(|source| ChannelError::Io {
                    switch: self.switch.clone(),
                    source,
                })?;
            if chunk.is_none() {
                break;
            }
        }

        self.logged_out = true;
        debug!("logged out of switch {}", self.switch);
        Ok(())
    }
}

impl<T: Transport> Drop for ConsoleSession<T> {
    fn drop(&mut self) {
        if !self.logged_out {
            warn!("session with switch {} dropped without disconnect", self.switch);
        }
    }
}
