//! Highlight stage: `<invocation> | h <term>`

use super::{ChainOutcome, ProcessorChain, Stage, UsageRow};
use crate::dispatch::{DispatchError, DispatchResult};
use opshell_foundation::{SessionContext, StyledText};

pub(super) const PATTERN: &str = r"(?P<invocation>.+?)\s*\|\s*h\s+(?P<term>.+)";
pub(super) const PRIORITY: u32 = 10;
pub(super) const GROUPS: &[&str] = &["invocation", "term"];

pub(super) fn usage() -> UsageRow {
    UsageRow::new("<command> | h <term>", "Highlight every occurrence of <term> in the output")
}

pub(super) async fn handle(
    chain: &ProcessorChain,
    stage: &Stage,
    input: &str,
    ctx: &mut SessionContext,
) -> ChainOutcome {
    let caps = stage.pattern.captures(input);
    let group = |name: &str| {
        caps.as_ref()
            .and_then(|caps| caps.name(name))
            .map(|m| m.as_str().trim())
    };
    let (Some(invocation), Some(term)) = (group("invocation"), group("term")) else {
        return ChainOutcome::Text(
            DispatchError::MalformedInput("expected '<command> | h <term>'".to_string())
                .to_string(),
        );
    };

    // chained pipes end up in either side
    if let Some(err) = chain
        .check_banned(invocation)
        .or_else(|| chain.check_banned(term))
    {
        return ChainOutcome::Text(err.to_string());
    }

    match chain.dispatcher.dispatch(invocation, ctx).await {
        DispatchResult::Output(text) => {
            ChainOutcome::Text(ctx.render(&StyledText::highlight(&text, term)))
        }
        other => ChainOutcome::verbatim(other),
    }
}
