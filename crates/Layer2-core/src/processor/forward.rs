//! Forward stage: `<invocation> | m <destination>`
//!
//! The dispatched text goes to the [`Delivery`] collaborator; the operator
//! only sees whether it was sent.

use super::{ChainOutcome, ProcessorChain, Stage, UsageRow};
use crate::delivery::Delivery;
use crate::dispatch::{DispatchError, DispatchResult};
use opshell_foundation::SessionContext;
use tracing::{info, warn};

pub(super) const PATTERN: &str = r"(?P<invocation>.+?)\s*\|\s*m\s+(?P<destination>\S+)";
pub(super) const PRIORITY: u32 = 20;
pub(super) const GROUPS: &[&str] = &["invocation", "destination"];

pub(super) fn usage() -> UsageRow {
    UsageRow::new("<command> | m <destination>", "Send the output to <destination>")
}

pub(super) async fn handle(
    chain: &ProcessorChain,
    stage: &Stage,
    delivery: &dyn Delivery,
    input: &str,
    ctx: &mut SessionContext,
) -> ChainOutcome {
    let caps = stage.pattern.captures(input);
    let group = |name: &str| {
        caps.as_ref()
            .and_then(|caps| caps.name(name))
            .map(|m| m.as_str().trim())
    };
    let (Some(invocation), Some(destination)) = (group("invocation"), group("destination"))
    else {
        return ChainOutcome::Text(
            DispatchError::MalformedInput("expected '<command> | m <destination>'".to_string())
                .to_string(),
        );
    };

    if let Some(err) = chain
        .check_banned(invocation)
        .or_else(|| chain.check_banned(destination))
    {
        return ChainOutcome::Text(err.to_string());
    }

    let body = match chain.dispatcher.dispatch(invocation, ctx).await {
        DispatchResult::Output(text) => text,
        other => return ChainOutcome::verbatim(other),
    };

    match delivery.deliver(destination, invocation, &body).await {
        Ok(()) => {
            info!(
                "{} forwarded '{}' to {}",
                ctx.username().unwrap_or("-"),
                invocation,
                destination
            );
            ChainOutcome::Text(format!("Output response sent to {}", destination))
        }
        Err(e) => {
            warn!("Delivery of '{}' to {} failed: {}", invocation, destination, e);
            ChainOutcome::Text(format!("Failed to send output to {}", destination))
        }
    }
}
