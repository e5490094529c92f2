//! Device session state machine
//!
//! [`SessionMachine::handle`] is a pure transition function: it takes one
//! [`Event`] and returns the [`Action`]s the caller must perform. It owns
//! the receive buffer and the transcript but never touches a socket, so
//! every login flow can be tested with literal text.
//!
//! Scanning order in a login state:
//!
//! 1. the failure pattern, only once credentials were sent; a match drops
//!    the buffer up to the end of the match and the rest is scanned again
//! 2. the shell prompt
//! 3. the login rules in priority order
//!
//! Any match other than a failure clears the whole buffer.

use std::sync::Arc;

use secrecy::ExposeSecret;

use super::buffer::CueBuffer;
use super::plan::SessionPlan;
use super::state::{Action, Event, Outgoing, SessionOutcome, SessionState};
use crate::automation::CueKind;
use crate::error::SessionError;

/// Drives one device session from connect to close
#[derive(Debug)]
pub struct SessionMachine {
    plan: Arc<SessionPlan>,
    state: SessionState,
    buffer: CueBuffer,
    transcript: String,
    login_failures: u32,
    credentials_sent: bool,
    settled: bool,
    progress: u64,
}

impl SessionMachine {
    /// Creates a machine in [`SessionState::Connecting`]
    #[must_use]
    pub fn new(plan: Arc<SessionPlan>) -> Self {
        Self {
            plan,
            state: SessionState::Connecting,
            buffer: CueBuffer::new(),
            transcript: String::new(),
            login_failures: 0,
            credentials_sent: false,
            settled: false,
            progress: 0,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Everything received so far
    #[must_use]
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Consumes the machine, returning the transcript
    #[must_use]
    pub fn into_transcript(self) -> String {
        self.transcript
    }

    /// Returns true once the session has finished
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.settled
    }

    /// Counter bumped on every transition; a change re-arms the idle deadline
    #[must_use]
    pub const fn progress(&self) -> u64 {
        self.progress
    }

    /// Login failure cues seen so far
    #[must_use]
    pub const fn login_failures(&self) -> u32 {
        self.login_failures
    }

    /// Applies one event
    ///
    /// After the session has finished every event is ignored and yields
    /// no action.
    pub fn handle(&mut self, event: Event) -> Vec<Action> {
        if self.settled {
            return Vec::new();
        }

        match event {
            Event::Connected => {
                if self.state == SessionState::Connecting {
                    self.transition(SessionState::LoggingIn);
                }
                Vec::new()
            }
            Event::ConnectFailed(reason) => {
                self.finish(SessionOutcome::Failed(SessionError::TransportConnectFailure {
                    host: self.plan.host.clone(),
                    port: self.plan.port,
                    reason,
                }))
            }
            Event::Data(chunk) => {
                self.transcript.push_str(&chunk);
                self.buffer.append(&chunk);
                self.scan()
            }
            Event::Timeout => {
                if self.state == SessionState::LoggingOut {
                    self.finish(SessionOutcome::Completed)
                } else {
                    let state = self.state.to_string();
                    self.finish(SessionOutcome::Failed(SessionError::SessionTimeout { state }))
                }
            }
            Event::TransportError(reason) => {
                self.finish(SessionOutcome::Failed(SessionError::TransportError(reason)))
            }
            Event::TransportClosed => {
                if self.state == SessionState::LoggingOut {
                    self.finish(SessionOutcome::Completed)
                } else {
                    let state = self.state.to_string();
                    self.finish(SessionOutcome::Failed(SessionError::TransportClosed { state }))
                }
            }
        }
    }

    fn scan(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        loop {
            match self.state {
                state if state.is_login() => {
                    if self.credentials_sent {
                        let failure_end = self
                            .plan
                            .failure
                            .find(self.buffer.as_str())
                            .map(|m| m.end());
                        if let Some(end) = failure_end {
                            self.buffer.consume_through(end);
                            self.login_failures += 1;
                            if self.login_failures >= self.plan.max_login_attempts {
                                actions.extend(self.finish(SessionOutcome::Failed(
                                    SessionError::LoginRejected {
                                        attempts: self.login_failures,
                                    },
                                )));
                                return actions;
                            }
                            self.credentials_sent = false;
                            self.transition(SessionState::AwaitingUsernamePrompt);
                            continue;
                        }
                    }

                    if self.plan.prompt.is_match(self.buffer.as_str()) {
                        self.buffer.clear();
                        actions.push(self.next_command(0));
                        return actions;
                    }

                    if let Some(action) = self.answer_login_cue() {
                        actions.push(action);
                    }
                    return actions;
                }
                SessionState::ExecutingCommands { index } => {
                    if self.plan.prompt.is_match(self.buffer.as_str()) {
                        self.buffer.clear();
                        actions.push(self.next_command(index + 1));
                    }
                    return actions;
                }
                _ => return actions,
            }
        }
    }

    fn answer_login_cue(&mut self) -> Option<Action> {
        let rule = self.plan.login_rules.match_output(self.buffer.as_str())?;
        let cue = rule.cue;
        let uses_password = rule.response.contains("${password}");
        let response =
            rule.render_response(&self.plan.username, self.plan.password.expose_secret());
        self.buffer.clear();

        match cue {
            CueKind::Username => {
                self.credentials_sent = true;
                self.transition(SessionState::AwaitingPasswordPrompt);
            }
            CueKind::Password => {
                self.credentials_sent = true;
                self.transition(SessionState::LoggingIn);
            }
            CueKind::Other => self.progress += 1,
        }

        Some(Action::Send(if uses_password {
            Outgoing::sensitive(response)
        } else {
            Outgoing::plain(response)
        }))
    }

    fn next_command(&mut self, index: usize) -> Action {
        if let Some(command) = self.plan.commands.get(index) {
            let line = Outgoing::plain(command.as_str());
            self.transition(SessionState::ExecutingCommands { index });
            Action::Send(line)
        } else {
            self.transition(SessionState::LoggingOut);
            Action::Send(Outgoing::plain(self.plan.logout_command.as_str()))
        }
    }

    fn transition(&mut self, next: SessionState) {
        self.state = next;
        self.progress += 1;
    }

    fn finish(&mut self, outcome: SessionOutcome) -> Vec<Action> {
        self.settled = true;
        self.transition(SessionState::Closed);
        vec![Action::Close, Action::Finish(outcome)]
    }
}
