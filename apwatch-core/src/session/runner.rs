//! Async driver for the session state machine

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};

use super::machine::SessionMachine;
use super::plan::SessionPlan;
use super::state::{Action, Event, SessionOutcome};
use crate::error::SessionError;
use crate::protocol::{TelnetFilter, Utf8Decoder};
use crate::tracing::span_names;
use crate::transcript::DeviceTranscript;

const READ_BUFFER_SIZE: usize = 4096;

/// A bidirectional byte stream to a device console
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

/// Opens transports to devices
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connects to `host:port`
    ///
    /// # Errors
    ///
    /// Returns the I/O error of the failed connect.
    async fn connect(&self, host: &str, port: u16) -> std::io::Result<Box<dyn Transport>>;
}

/// Plain TCP connector
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, host: &str, port: u16) -> std::io::Result<Box<dyn Transport>> {
        let stream = TcpStream::connect((host, port)).await?;
        stream.set_nodelay(true)?;
        Ok(Box::new(stream))
    }
}

enum Input {
    Read(std::io::Result<usize>),
    Deadline,
}

/// Runs device sessions over a [`Connector`]
#[derive(Clone)]
pub struct SessionRunner {
    connector: Arc<dyn Connector>,
}

impl std::fmt::Debug for SessionRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRunner").finish_non_exhaustive()
    }
}

impl SessionRunner {
    /// Creates a runner using `connector` for every session
    #[must_use]
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }

    /// Creates a runner that connects over TCP
    #[must_use]
    pub fn tcp() -> Self {
        Self::new(Arc::new(TcpConnector))
    }

    /// Runs one session to its end
    ///
    /// Never fails: a failed session yields its partial transcript with a
    /// [`SessionOutcome::Failed`] outcome.
    pub async fn run(&self, plan: Arc<SessionPlan>) -> DeviceTranscript {
        let span = info_span!(
            span_names::SESSION_RUN,
            device = %plan.name,
            host = %plan.host,
            port = plan.port
        );
        self.drive(plan).instrument(span).await
    }

    async fn drive(&self, plan: Arc<SessionPlan>) -> DeviceTranscript {
        let mut machine = SessionMachine::new(Arc::clone(&plan));

        let connect = tokio::time::timeout(
            plan.connect_timeout,
            self.connector.connect(&plan.host, plan.port),
        )
        .await;
        let mut stream = match connect {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return connect_failed(&plan, machine, e.to_string()),
            Err(_) => {
                let reason = format!("no connection within {}s", plan.connect_timeout.as_secs());
                return connect_failed(&plan, machine, reason);
            }
        };
        debug!("Connected");

        let overall_deadline = Instant::now() + plan.session_timeout;
        let mut idle_deadline = Instant::now() + plan.idle_timeout;
        let mut seen_progress = machine.progress();
        let mut filter = TelnetFilter::new();
        let mut decoder = Utf8Decoder::new();
        let mut read_buf = vec![0u8; READ_BUFFER_SIZE];
        let mut pending: VecDeque<Action> = machine.handle(Event::Connected).into();

        loop {
            while let Some(action) = pending.pop_front() {
                match action {
                    Action::Send(line) => {
                        if line.is_sensitive() {
                            debug!(state = %machine.state(), "Sending credential");
                        } else {
                            debug!(state = %machine.state(), command = line.text(), "Sending line");
                        }
                        let mut written = stream.write_all(line.to_wire().as_bytes()).await;
                        if written.is_ok() {
                            written = stream.flush().await;
                        }
                        if let Err(e) = written {
                            pending.extend(machine.handle(Event::TransportError(e.to_string())));
                        }
                    }
                    Action::Close => {
                        if let Err(e) = stream.shutdown().await {
                            debug!(error = %e, "Transport shutdown failed");
                        }
                    }
                    Action::Finish(outcome) => {
                        log_outcome(&plan, &outcome);
                        return DeviceTranscript::new(
                            plan.name.as_str(),
                            outcome,
                            machine.into_transcript(),
                        );
                    }
                }
            }

            if machine.progress() != seen_progress {
                seen_progress = machine.progress();
                idle_deadline = Instant::now() + plan.idle_timeout;
            }
            let deadline = idle_deadline.min(overall_deadline);

            let input = tokio::select! {
                read = stream.read(&mut read_buf) => Input::Read(read),
                () = tokio::time::sleep_until(deadline) => Input::Deadline,
            };

            let event = match input {
                Input::Read(Ok(0)) => Event::TransportClosed,
                Input::Read(Ok(n)) => {
                    let filtered = filter.feed(&read_buf[..n]);
                    if !filtered.replies.is_empty()
                        && let Err(e) = stream.write_all(&filtered.replies).await
                    {
                        pending.extend(machine.handle(Event::TransportError(e.to_string())));
                        continue;
                    }
                    Event::Data(decoder.decode(&filtered.data))
                }
                Input::Read(Err(e)) => Event::TransportError(e.to_string()),
                Input::Deadline => {
                    debug!(state = %machine.state(), "Session deadline reached");
                    Event::Timeout
                }
            };
            pending.extend(machine.handle(event));
        }
    }
}

fn connect_failed(plan: &SessionPlan, mut machine: SessionMachine, reason: String) -> DeviceTranscript {
    let fallback = SessionOutcome::Failed(SessionError::TransportConnectFailure {
        host: plan.host.clone(),
        port: plan.port,
        reason: reason.clone(),
    });
    let outcome = machine
        .handle(Event::ConnectFailed(reason))
        .into_iter()
        .find_map(|action| match action {
            Action::Finish(outcome) => Some(outcome),
            _ => None,
        })
        .unwrap_or(fallback);
    log_outcome(plan, &outcome);
    DeviceTranscript::new(plan.name.as_str(), outcome, machine.into_transcript())
}

fn log_outcome(plan: &SessionPlan, outcome: &SessionOutcome) {
    match outcome {
        SessionOutcome::Completed => info!(device = %plan.name, "Session completed"),
        SessionOutcome::Failed(err) => warn!(device = %plan.name, error = %err, "Session failed"),
    }
}
