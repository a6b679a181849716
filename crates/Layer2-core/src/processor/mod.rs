//! # Input Processor Chain
//!
//! Trimmed input 한 줄을 처리할 stage를 고르는 파이프라인.
//!
//! - Stage = pattern + priority + usage + kind (tagged variant)
//! - priority 순서로 검사하여 입력 **전체**와 일치하는 첫 stage가 독점 처리
//! - 항상 일치하는 기본 `Dispatch` stage가 마지막에 반드시 존재
//!
//! ```text
//! "help | h exit"  ──▶ Highlight ──▶ Dispatcher("help") ──▶ styled text
//! "health | m ops" ──▶ Forward   ──▶ Dispatcher("health") ──▶ Delivery
//! "test run x"     ──▶ Dispatch  ──▶ Dispatcher("test run x")
//! ```

mod forward;
mod highlight;

use crate::delivery::Delivery;
use crate::dispatch::{DispatchError, DispatchResult, Dispatcher};
use opshell_foundation::{Error, Result, SessionContext};
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// Priority of the mandatory default stage (always last)
pub const DEFAULT_STAGE_PRIORITY: u32 = u32::MAX;

// ============================================================================
// Usage / Outcome
// ============================================================================

/// One help row contributed by a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRow {
    pub pattern: String,
    pub description: String,
}

impl UsageRow {
    pub fn new(pattern: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            description: description.into(),
        }
    }
}

/// What the terminal loop should do with a processed line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    /// Write the text (may be empty) and wait for the next line
    Text(String),
    /// Write the optional message and end the session
    Terminate(Option<String>),
}

impl ChainOutcome {
    pub fn is_terminate(&self) -> bool {
        matches!(self, Self::Terminate(_))
    }

    /// Convert a dispatch result with its text written verbatim
    pub fn verbatim(result: DispatchResult) -> Self {
        match result {
            DispatchResult::Output(text) => Self::Text(text),
            DispatchResult::Error(err) => Self::Text(err.to_string()),
            DispatchResult::Terminate(message) => Self::Terminate(message),
        }
    }
}

// ============================================================================
// Stage
// ============================================================================

/// Stage variants
#[derive(Clone)]
pub enum StageKind {
    /// `<invocation> | h <term>`
    Highlight,
    /// `<invocation> | m <destination>`
    Forward(Arc<dyn Delivery>),
    /// Any non-empty input, straight to the dispatcher
    Dispatch,
}

impl StageKind {
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Highlight => "highlight",
            StageKind::Forward(_) => "forward",
            StageKind::Dispatch => "dispatch",
        }
    }

    /// Named groups the stage handler reads from its pattern
    pub fn required_groups(&self) -> &'static [&'static str] {
        match self {
            StageKind::Highlight => highlight::GROUPS,
            StageKind::Forward(_) => forward::GROUPS,
            StageKind::Dispatch => &[],
        }
    }
}

impl fmt::Debug for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Forward(delivery) => write!(f, "Forward({})", delivery.name()),
            other => f.write_str(other.name()),
        }
    }
}

/// One pipeline stage
#[derive(Debug, Clone)]
pub struct Stage {
    pattern: Regex,
    priority: u32,
    usage: Vec<UsageRow>,
    kind: StageKind,
}

impl Stage {
    /// Compile a stage; the pattern is anchored to the whole input and must
    /// define every group in [`StageKind::required_groups`]
    pub fn new(kind: StageKind, pattern: &str, priority: u32) -> Result<Self> {
        let anchored = format!("^(?:{})$", pattern);
        let compiled = Regex::new(&anchored).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        let missing = kind.required_groups().iter().find(|group| {
            !compiled
                .capture_names()
                .any(|name| name == Some(**group))
        });
        if let Some(group) = missing {
            return Err(Error::InvalidPattern {
                pattern: pattern.to_string(),
                message: format!("{} stage needs a named group '{}'", kind.name(), group),
            });
        }

        Ok(Self {
            pattern: compiled,
            priority,
            usage: Vec::new(),
            kind,
        })
    }

    pub fn with_usage(mut self, row: UsageRow) -> Self {
        self.usage.push(row);
        self
    }

    /// Highlight stage
    pub fn highlight() -> Result<Self> {
        Ok(Self::new(StageKind::Highlight, highlight::PATTERN, highlight::PRIORITY)?
            .with_usage(highlight::usage()))
    }

    /// Forward stage delivering through `delivery`
    pub fn forward(delivery: Arc<dyn Delivery>) -> Result<Self> {
        Ok(Self::new(StageKind::Forward(delivery), forward::PATTERN, forward::PRIORITY)?
            .with_usage(forward::usage()))
    }

    /// Mandatory default stage
    pub fn dispatch() -> Result<Self> {
        Self::new(StageKind::Dispatch, "(?s).+", DEFAULT_STAGE_PRIORITY)
    }

    pub fn matches(&self, input: &str) -> bool {
        self.pattern.is_match(input)
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn kind(&self) -> &StageKind {
        &self.kind
    }

    pub fn usage(&self) -> &[UsageRow] {
        &self.usage
    }
}

// ============================================================================
// ProcessorChain
// ============================================================================

/// Ordered, immutable list of stages ending with the default stage
#[derive(Debug, Clone)]
pub struct ProcessorChain {
    stages: Vec<Stage>,
    dispatcher: Dispatcher,
    banned_symbols: Vec<String>,
}

impl ProcessorChain {
    pub fn builder() -> ProcessorChainBuilder {
        ProcessorChainBuilder::new()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Usage rows of every stage, in chain order
    pub fn usage(&self) -> Vec<UsageRow> {
        self.stages
            .iter()
            .flat_map(|stage| stage.usage.iter().cloned())
            .collect()
    }

    /// Process one line
    ///
    /// `Ok(None)` for empty input (no stage runs). `Err` only when no stage
    /// matched non-empty input, which the default stage rules out.
    pub async fn process(
        &self,
        input: &str,
        ctx: &mut SessionContext,
    ) -> Result<Option<ChainOutcome>> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }

        let Some(stage) = self.stages.iter().find(|stage| stage.matches(input)) else {
            error!("No input processor matched '{}'", input);
            return Err(Error::Internal(
                "no input processor matched non-empty input".to_string(),
            ));
        };

        debug!("Input claimed by '{}' stage", stage.kind.name());
        let outcome = match &stage.kind {
            StageKind::Highlight => highlight::handle(self, stage, input, ctx).await,
            StageKind::Forward(delivery) => {
                forward::handle(self, stage, delivery.as_ref(), input, ctx).await
            }
            StageKind::Dispatch => match self.check_banned(input) {
                Some(err) => ChainOutcome::Text(err.to_string()),
                None => ChainOutcome::verbatim(self.dispatcher.dispatch(input, ctx).await),
            },
        };
        Ok(Some(outcome))
    }

    /// `MalformedInput` when `input` contains a banned symbol
    pub(crate) fn check_banned(&self, input: &str) -> Option<DispatchError> {
        self.banned_symbols
            .iter()
            .find(|symbol| !symbol.is_empty() && input.contains(symbol.as_str()))
            .map(|symbol| {
                DispatchError::MalformedInput(format!("unsupported use of '{}'", symbol))
            })
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ProcessorChain`]
pub struct ProcessorChainBuilder {
    stages: Vec<Stage>,
    banned_symbols: Vec<String>,
}

impl ProcessorChainBuilder {
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            banned_symbols: vec!["|".to_string()],
        }
    }

    /// Add the Highlight stage
    pub fn highlight(self) -> Result<Self> {
        Ok(self.stage(Stage::highlight()?))
    }

    /// Add the Forward stage
    pub fn forward(self, delivery: Arc<dyn Delivery>) -> Result<Self> {
        Ok(self.stage(Stage::forward(delivery)?))
    }

    /// Add any stage (a `Dispatch` stage here is ignored; the default is implicit)
    pub fn stage(mut self, stage: Stage) -> Self {
        if !matches!(stage.kind, StageKind::Dispatch) {
            self.stages.push(stage);
        }
        self
    }

    /// Replace the banned symbol list
    pub fn banned_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.banned_symbols = symbols.into_iter().map(Into::into).collect();
        self
    }

    /// Sort by priority (stable) and append the default stage
    pub fn build(mut self, dispatcher: Dispatcher) -> Result<ProcessorChain> {
        self.stages.sort_by_key(|stage| stage.priority);
        self.stages.push(Stage::dispatch()?);

        debug!(
            "Processor chain: {:?}",
            self.stages.iter().map(|s| s.kind.name()).collect::<Vec<_>>()
        );
        Ok(ProcessorChain {
            stages: self.stages,
            dispatcher,
            banned_symbols: self.banned_symbols,
        })
    }
}

impl Default for ProcessorChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}
