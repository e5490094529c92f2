//! Expect-style login cues
//!
//! Login flows differ between devices: a controller asks for `User:` and
//! then `Password:`, a switch may only ask for a password or show a banner
//! first. Instead of one state machine per flow, each device carries an
//! ordered list of cue rules. A rule pairs a regex with a response template
//! and tells the session which kind of cue it answered.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during expect operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpectError {
    /// Pattern compilation failed
    #[error("Failed to compile pattern '{pattern}': {reason}")]
    PatternCompilationFailed {
        /// The pattern that failed to compile
        pattern: String,
        /// The reason for the failure
        reason: String,
    },
}

/// Result type for expect operations
pub type ExpectResult<T> = std::result::Result<T, ExpectError>;

/// What a matched cue means for the login flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueKind {
    /// The device asks for a user name
    Username,
    /// The device asks for a password
    Password,
    /// Anything else that needs an answer (banner acknowledgement, pager)
    #[default]
    Other,
}

/// A login cue rule with pattern and response
///
/// The response is a template: `${username}` and `${password}` are
/// replaced with the device credentials when the rule fires. A CR LF is
/// appended by the session, not stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectRule {
    /// Regex pattern to match against the receive buffer
    pub pattern: String,
    /// Response template to send when the pattern matches
    pub response: String,
    /// Meaning of the cue for the session state machine
    #[serde(default)]
    pub cue: CueKind,
    /// Priority for rule ordering (higher = checked first)
    #[serde(default)]
    pub priority: i32,
    /// Whether this rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

const fn default_true() -> bool {
    true
}

impl ExpectRule {
    /// Creates a new rule of kind [`CueKind::Other`]
    #[must_use]
    pub fn new(pattern: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            response: response.into(),
            cue: CueKind::Other,
            priority: 0,
            enabled: true,
        }
    }

    /// Rule answering a user name cue with `${username}`
    #[must_use]
    pub fn username(pattern: impl Into<String>) -> Self {
        Self::new(pattern, "${username}").with_cue(CueKind::Username)
    }

    /// Rule answering a password cue with `${password}`
    #[must_use]
    pub fn password(pattern: impl Into<String>) -> Self {
        Self::new(pattern, "${password}").with_cue(CueKind::Password)
    }

    /// Sets the cue kind
    #[must_use]
    pub const fn with_cue(mut self, cue: CueKind) -> Self {
        self.cue = cue;
        self
    }

    /// Sets the priority for this rule
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets whether this rule is enabled
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Compiles the pattern into a Regex
    ///
    /// # Errors
    ///
    /// Returns `ExpectError::PatternCompilationFailed` if the pattern is invalid.
    pub fn compile_pattern(&self) -> ExpectResult<Regex> {
        Regex::new(&self.pattern).map_err(|e| ExpectError::PatternCompilationFailed {
            pattern: self.pattern.clone(),
            reason: e.to_string(),
        })
    }

    /// Renders the response template with the given credentials
    #[must_use]
    pub fn render_response(&self, username: &str, password: &str) -> String {
        self.response
            .replace("${username}", username)
            .replace("${password}", password)
    }
}

/// Default rules: `User:`/`Username:`/`login:` and `Password:`
#[must_use]
pub fn default_login_rules() -> Vec<ExpectRule> {
    vec![
        ExpectRule::username(r"(?i)(user(name)?|login)\s*:\s*$"),
        ExpectRule::password(r"(?i)password\s*:\s*$"),
    ]
}

/// A compiled expect rule with pre-compiled regex pattern
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// The original rule
    pub rule: ExpectRule,
    /// The compiled regex pattern
    pub regex: Regex,
}

impl CompiledRule {
    /// Creates a new compiled rule from an expect rule
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern fails to compile.
    pub fn new(rule: ExpectRule) -> ExpectResult<Self> {
        let regex = rule.compile_pattern()?;
        Ok(Self { rule, regex })
    }

    /// Checks if the output matches this rule's pattern
    #[must_use]
    pub fn matches(&self, output: &str) -> bool {
        self.regex.is_match(output)
    }
}

/// Matches the receive buffer against the login rules of one device
#[derive(Debug, Clone, Default)]
pub struct ExpectEngine {
    /// Compiled rules sorted by priority (highest first), stable for ties
    rules: Vec<CompiledRule>,
}

impl ExpectEngine {
    /// Creates a new empty expect engine
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an expect engine from a list of rules
    ///
    /// # Errors
    ///
    /// Returns an error if any rule's pattern fails to compile.
    pub fn from_rules(rules: Vec<ExpectRule>) -> ExpectResult<Self> {
        let mut engine = Self::new();
        for rule in rules {
            engine.add_rule(rule)?;
        }
        Ok(engine)
    }

    /// Adds a rule to the engine
    ///
    /// # Errors
    ///
    /// Returns an error if the rule's pattern fails to compile.
    pub fn add_rule(&mut self, rule: ExpectRule) -> ExpectResult<()> {
        let compiled = CompiledRule::new(rule)?;
        self.rules.push(compiled);
        // sort_by is stable: equal priorities keep configuration order
        self.rules
            .sort_by(|a, b| b.rule.priority.cmp(&a.rule.priority));
        Ok(())
    }

    /// Returns all rules in match order
    #[must_use]
    pub fn rules(&self) -> Vec<&ExpectRule> {
        self.rules.iter().map(|r| &r.rule).collect()
    }

    /// Returns the number of rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Matches output against all enabled rules, returning the first match
    /// in priority order
    #[must_use]
    pub fn match_output(&self, output: &str) -> Option<&ExpectRule> {
        self.rules
            .iter()
            .filter(|r| r.rule.enabled)
            .find(|r| r.matches(output))
            .map(|r| &r.rule)
    }
}
