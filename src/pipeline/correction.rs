//! Timeout correction: the closed command type, its parser, the collaborator seam and the
//! policy that decides what happens when the timer fires.
//!
//! A collaborator's reply is data. It is parsed against a fixed vocabulary and anything
//! outside it is rejected with [`CorrectionError::InvalidInstruction`].

use anyhow::{Context, Result, bail};
use log::{error, info, warn};
use serde::Deserialize;
use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::CorrectionError;
use crate::pipeline::context::TraversalContext;
use crate::types::TimeoutOutcome;
use crate::utils::config::TIMEOUT_PROMPT;

/// The only mutation a timeout may cause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Correction {
    SetMaxDepth(i64),
}

impl Correction {
    pub fn apply(&self, ctx: &TraversalContext) {
        match *self {
            Correction::SetMaxDepth(n) => ctx.set_max_depth(n),
        }
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Correction::SetMaxDepth(n) => write!(f, "set depth to {n}"),
        }
    }
}

impl FromStr for Correction {
    type Err = CorrectionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_instruction(s)
    }
}

/// Parse collaborator text into a [`Correction`].
///
/// Accepted (case-insensitive): `set depth to N`, `set depth bound to N`, `set max depth to N`,
/// `set search depth to N`, `set_search_depth(N)`, `set_max_depth(N)`, `max_depth = N`,
/// `search_depth = N`, `find_context.max_depth = N`. A trailing `;` and one surrounding
/// markdown code fence are tolerated.
pub fn parse_instruction(text: &str) -> std::result::Result<Correction, CorrectionError> {
    let body = strip_code_fence(text.trim()).ok_or_else(|| CorrectionError::invalid(text))?;
    let body = body.trim().trim_end_matches(';').trim().to_ascii_lowercase();

    parse_phrase(&body)
        .or_else(|| parse_call(&body))
        .or_else(|| parse_assignment(&body))
        .map(Correction::SetMaxDepth)
        .ok_or_else(|| CorrectionError::invalid(text))
}

/// Returns the inside of a fenced block, the text itself when unfenced, or None for an unclosed fence.
fn strip_code_fence(text: &str) -> Option<&str> {
    let Some(rest) = text.strip_prefix("```") else {
        return Some(text);
    };
    // Drop the info string (e.g. ```python).
    let (_, inner) = rest.split_once('\n')?;
    inner.trim_end().strip_suffix("```")
}

fn parse_depth(n: &str) -> Option<i64> {
    n.trim().parse::<i64>().ok()
}

fn parse_phrase(s: &str) -> Option<i64> {
    let words: Vec<&str> = s.split_whitespace().collect();
    match words.as_slice() {
        ["set", "depth", "to", n]
        | ["set", "depth", "bound", "to", n]
        | ["set", "max", "depth", "to", n]
        | ["set", "search", "depth", "to", n] => parse_depth(n),
        _ => None,
    }
}

fn parse_call(s: &str) -> Option<i64> {
    ["set_search_depth", "set_max_depth"].iter().find_map(|name| {
        let args = s
            .strip_prefix(name)?
            .trim_start()
            .strip_prefix('(')?
            .strip_suffix(')')?;
        parse_depth(args)
    })
}

fn parse_assignment(s: &str) -> Option<i64> {
    let (lhs, rhs) = s.split_once('=')?;
    match lhs.trim() {
        "max_depth" | "search_depth" | "find_context.max_depth" => parse_depth(rhs),
        _ => None,
    }
}

/// External capability consulted by [`CorrectionPolicy::Reactive`].
///
/// `takes_prompt` is the declared arity: when true, `ask` gets `Some(prompt)`.
pub trait Collaborator: Send + Sync {
    fn takes_prompt(&self) -> bool {
        true
    }

    fn ask(&self, prompt: Option<&str>) -> Result<String>;
}

/// Collaborator from a closure that takes the prompt.
pub struct PromptFn<F>(pub F);

impl<F> PromptFn<F>
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Collaborator for PromptFn<F>
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn ask(&self, prompt: Option<&str>) -> Result<String> {
        (self.0)(prompt.unwrap_or(TIMEOUT_PROMPT))
    }
}

/// Collaborator from a closure that takes nothing.
pub struct NullaryFn<F>(pub F);

impl<F> NullaryFn<F>
where
    F: Fn() -> Result<String> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Collaborator for NullaryFn<F>
where
    F: Fn() -> Result<String> + Send + Sync,
{
    fn takes_prompt(&self) -> bool {
        false
    }

    fn ask(&self, _prompt: Option<&str>) -> Result<String> {
        (self.0)()
    }
}

/// Runs an external program: prompt on stdin, reply from stdout.
#[derive(Clone, Debug)]
pub struct CommandCollaborator {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandCollaborator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl Collaborator for CommandCollaborator {
    fn ask(&self, prompt: Option<&str>) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("spawn collaborator {}", self.program))?;
        if let Some(mut stdin) = child.stdin.take()
            && let Some(p) = prompt
        {
            stdin
                .write_all(p.as_bytes())
                .context("write prompt to collaborator")?;
        }
        let output = child
            .wait_with_output()
            .context("wait for collaborator")?;
        if !output.status.success() {
            bail!("{} exited with {}", self.program, output.status);
        }
        let reply = String::from_utf8(output.stdout).context("collaborator reply is not UTF-8")?;
        Ok(reply.trim().to_string())
    }
}

/// No-callback behavior on timeout. Must be chosen; neither is implied by the other policies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeoutFallback {
    /// Log a warning, change nothing.
    #[default]
    Warn,
    /// Set the depth bound to 0.
    ZeroDepth,
}

/// What to do when the timer fires.
#[derive(Clone)]
pub enum CorrectionPolicy {
    None { fallback: TimeoutFallback },
    Reactive(Arc<dyn Collaborator>),
    PreDeclared(Correction),
}

impl CorrectionPolicy {
    pub fn reactive<C: Collaborator + 'static>(collaborator: C) -> Self {
        Self::Reactive(Arc::new(collaborator))
    }
}

impl Default for CorrectionPolicy {
    fn default() -> Self {
        Self::None {
            fallback: TimeoutFallback::Warn,
        }
    }
}

impl fmt::Debug for CorrectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None { fallback } => f.debug_struct("None").field("fallback", fallback).finish(),
            Self::Reactive(c) => f
                .debug_struct("Reactive")
                .field("takes_prompt", &c.takes_prompt())
                .finish(),
            Self::PreDeclared(c) => f.debug_tuple("PreDeclared").field(c).finish(),
        }
    }
}

/// Timer-thread handler. Runs concurrently with the walk; the only write is the depth bound.
pub fn handle_timeout(
    ctx: &TraversalContext,
    policy: &CorrectionPolicy,
    skip_when_matched: bool,
) -> std::result::Result<TimeoutOutcome, CorrectionError> {
    ctx.mark_timeout();
    warn!("Timeout: traversal still running at depth bound {}", ctx.max_depth());

    match policy {
        CorrectionPolicy::PreDeclared(correction) => {
            correction.apply(ctx);
            info!("Applied pre-declared correction: {correction}");
            Ok(TimeoutOutcome::Applied(*correction))
        }
        _ if skip_when_matched && ctx.has_result() => {
            info!("Timeout after a match was found; skipping correction");
            Ok(TimeoutOutcome::Skipped)
        }
        CorrectionPolicy::None {
            fallback: TimeoutFallback::Warn,
        } => {
            warn!("No correction callback provided; depth bound unchanged");
            Ok(TimeoutOutcome::NoAction)
        }
        CorrectionPolicy::None {
            fallback: TimeoutFallback::ZeroDepth,
        } => {
            let correction = Correction::SetMaxDepth(0);
            correction.apply(ctx);
            info!("No correction callback provided; {correction}");
            Ok(TimeoutOutcome::Applied(correction))
        }
        CorrectionPolicy::Reactive(collaborator) => {
            let prompt = collaborator.takes_prompt().then_some(TIMEOUT_PROMPT);
            let reply = collaborator.ask(prompt).map_err(|e| {
                let err = CorrectionError::collaborator(&e);
                error!("{err}");
                err
            })?;
            let correction = reply.parse::<Correction>().inspect_err(|e| error!("{e}"))?;
            correction.apply(ctx);
            info!("Applied correction from collaborator: {correction}");
            Ok(TimeoutOutcome::Applied(correction))
        }
    }
}
