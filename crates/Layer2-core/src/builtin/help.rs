//! `help` - 호출자가 실행할 수 있는 명령어 목록
//!
//! Registry와 usage row는 terminal loop가 세션 컨텍스트에 넣어 둔 것을 읽습니다.

use crate::command::{CommandProvider, Reply};
use crate::processor::UsageRow;
use crate::registry::CommandRegistry;
use anyhow::Context;
use opshell_foundation::{context_keys as keys, SessionContext};
use std::sync::Arc;

pub(super) fn provider() -> CommandProvider {
    CommandProvider::new("help", "Show the commands available to you").context_executor(
        |ctx, _| Ok(Reply::output(render(ctx)?)),
    )
}

fn render(ctx: &SessionContext) -> anyhow::Result<String> {
    let registry = ctx
        .get::<Arc<CommandRegistry>>(keys::REGISTRY)
        .context("command registry missing from session context")?;
    let caller = ctx.roles().cloned().unwrap_or_default();

    let commands: Vec<(&str, &str)> = registry
        .list_authorized(&caller)
        .into_iter()
        .map(|desc| (desc.name(), desc.description()))
        .collect();

    let mut out = String::from("Supported Commands");
    push_rows(&mut out, &commands);

    if let Some(usage) = ctx.get::<Arc<Vec<UsageRow>>>(keys::USAGE) {
        if !usage.is_empty() {
            let rows: Vec<(&str, &str)> = usage
                .iter()
                .map(|row| (row.pattern.as_str(), row.description.as_str()))
                .collect();
            out.push_str("\n\nSupported post processors for output");
            push_rows(&mut out, &rows);
        }
    }
    Ok(out)
}

fn push_rows(out: &mut String, rows: &[(&str, &str)]) {
    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, description) in rows {
        out.push_str(&format!("\n  {:<width$}  {}", name, description, width = width));
    }
}
