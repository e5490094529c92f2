//! Console automation for `apwatch`
//!
//! This module provides the expect-style cue rules used to log in to
//! devices. The session state machine in [`crate::session`] consults an
//! [`ExpectEngine`] after every received chunk.

mod expect;

pub use expect::{
    CompiledRule, CueKind, ExpectEngine, ExpectError, ExpectResult, ExpectRule,
    default_login_rules,
};
