//! 통합 테스트 공용 fixture

#![allow(dead_code)]

use async_trait::async_trait;
use opshell_core::{
    context_keys as keys, CommandDescriptor, CommandExecutor, CommandProvider, CommandRegistry,
    Connection, Dispatcher, ProcessorChain, Reply, RoleSet, SessionContext,
};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

pub fn roles(items: &[&str]) -> RoleSet {
    items.iter().copied().collect()
}

/// Asks the operator before answering
pub struct ConfirmExecutor;

#[async_trait]
impl CommandExecutor for ConfirmExecutor {
    async fn execute(
        &self,
        ctx: &mut SessionContext,
        arg: Option<&str>,
    ) -> anyhow::Result<Reply> {
        let target = arg.unwrap_or("everything");
        let answer = ctx.prompt(&format!("Reset {}? [y/N] ", target)).await?;
        match answer.as_deref().map(str::trim) {
            Some("y") => Ok(Reply::output(format!("{} reset", target))),
            _ => Ok(Reply::output("cancelled")),
        }
    }
}

/// echo (+ bob), test (run/execute), admin, metrics, boom, whoami, note, reset
pub fn providers() -> Vec<CommandProvider> {
    vec![
        CommandProvider::new("echo", "Echo the argument")
            .executor(|arg| Ok(Reply::output(arg.unwrap_or(""))))
            .subcommand(
                CommandDescriptor::new("bob", "Bob repeats you").executor(|arg| {
                    Ok(Reply::output(format!("bob says {}", arg.unwrap_or("nothing"))))
                }),
            ),
        CommandProvider::new("test", "Test commands")
            .subcommand(
                CommandDescriptor::new("run", "Run a test")
                    .roles(["USER"])
                    .executor(|_| Ok(Reply::output("test run ok"))),
            )
            .subcommand(
                CommandDescriptor::new("execute", "Execute a test")
                    .roles(["ADMIN"])
                    .executor(|_| Ok(Reply::output("test execute ok"))),
            ),
        CommandProvider::new("admin", "Administration")
            .roles(["ADMIN"])
            .subcommand(
                CommandDescriptor::new("open", "Open to everyone below the namespace")
                    .executor(|_| Ok(Reply::output("admin open"))),
            ),
        CommandProvider::new("metrics", "Metrics").subcommand(
            CommandDescriptor::new("metricName", "Echo a JSON argument")
                .executor(|arg| Ok(Reply::output(format!("query={}", arg.unwrap_or(""))))),
        ),
        CommandProvider::new("boom", "Always fails")
            .executor(|_| Err(anyhow::anyhow!("database password is hunter2")))
            .subcommand(
                CommandDescriptor::new("panic", "Panics")
                    .executor(|_| -> anyhow::Result<Reply> { panic!("executor blew up") }),
            ),
        CommandProvider::new("whoami", "Show the session user").context_executor(|ctx, _| {
            Ok(Reply::output(ctx.username().unwrap_or("unknown")))
        }),
        CommandProvider::new("note", "Session scratch value")
            .subcommand(CommandDescriptor::new("set", "Store").context_executor(|ctx, arg| {
                ctx.set("note", arg.unwrap_or("").to_string());
                Ok(Reply::output("stored"))
            }))
            .subcommand(CommandDescriptor::new("get", "Read").context_executor(|ctx, _| {
                Ok(Reply::output(
                    ctx.get::<String>("note").cloned().unwrap_or_else(|| "none".to_string()),
                ))
            })),
        CommandProvider::new("reset", "Reset after confirmation")
            .with_executor(Arc::new(ConfirmExecutor)),
    ]
}

pub fn registry() -> Arc<CommandRegistry> {
    Arc::new(CommandRegistry::with_builtins(providers()).unwrap())
}

pub fn dispatcher() -> Dispatcher {
    Dispatcher::new(registry())
}

pub fn chain() -> ProcessorChain {
    ProcessorChain::builder()
        .highlight()
        .unwrap()
        .build(dispatcher())
        .unwrap()
}

/// Context with identity only (no I/O)
pub fn context(username: &str, granted: &[&str]) -> SessionContext {
    let mut ctx = SessionContext::new();
    ctx.set(keys::USERNAME, username.to_string());
    ctx.set(keys::ROLES, roles(granted));
    ctx
}

/// In-memory connection with `input` already queued and the write side closed
pub async fn scripted(username: &str, granted: &[&str], input: &str) -> (Connection, DuplexStream) {
    let (conn, mut client) = Connection::in_memory(username, roles(granted));
    client.write_all(input.as_bytes()).await.unwrap();
    client.shutdown().await.unwrap();
    (conn, client)
}

pub async fn read_all(client: &mut DuplexStream) -> String {
    let mut out = String::new();
    client.read_to_string(&mut out).await.unwrap();
    out
}
