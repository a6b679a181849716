//! Processor chain 통합 테스트 - highlight / forward / 기본 stage
//!
//! `cargo test -p opshell-core --test chain_test`

mod common;

use async_trait::async_trait;
use common::{context, dispatcher, registry};
use opshell_core::{
    context_keys as keys, ChainOutcome, Delivery, Error, OutputAdapter, ProcessorChain, Result,
    SessionContext, UsageRow,
};
use opshell_foundation::MarkerAdapter;
use std::sync::{Arc, Mutex};

/// Delivery that records every call
#[derive(Default)]
struct RecordingDelivery {
    sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl Delivery for RecordingDelivery {
    fn name(&self) -> &str {
        "recording"
    }

    async fn deliver(&self, destination: &str, subject: &str, body: &str) -> Result<()> {
        self.sent.lock().unwrap().push((
            destination.to_string(),
            subject.to_string(),
            body.to_string(),
        ));
        Ok(())
    }
}

struct FailingDelivery;

#[async_trait]
impl Delivery for FailingDelivery {
    fn name(&self) -> &str {
        "failing"
    }

    async fn deliver(&self, destination: &str, _subject: &str, _body: &str) -> Result<()> {
        Err(Error::delivery(destination, "relay unreachable"))
    }
}

fn full_chain(delivery: Arc<dyn Delivery>) -> ProcessorChain {
    ProcessorChain::builder()
        .forward(delivery)
        .unwrap()
        .highlight()
        .unwrap()
        .build(dispatcher())
        .unwrap()
}

/// Context with registry, usage and marker style, as the terminal loop sets it up
fn styled_context(chain: &ProcessorChain) -> SessionContext {
    let mut ctx = context("alice", &["USER"]);
    let style: Arc<dyn OutputAdapter> = Arc::new(MarkerAdapter::new("<<", ">>"));
    ctx.set(keys::STYLE, style);
    ctx.set(keys::REGISTRY, registry());
    ctx.set(keys::USAGE, Arc::new(chain.usage()));
    ctx
}

fn text(outcome: Option<ChainOutcome>) -> String {
    match outcome {
        Some(ChainOutcome::Text(text)) => text,
        other => panic!("expected text, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stage_order_follows_priority() {
    let chain = full_chain(Arc::new(RecordingDelivery::default()));
    let kinds: Vec<&str> = chain.stages().iter().map(|s| s.kind().name()).collect();
    assert_eq!(kinds, vec!["highlight", "forward", "dispatch"]);

    let usage: Vec<UsageRow> = chain.usage();
    assert_eq!(usage.len(), 2);
    assert!(usage[0].pattern.contains("| h"));
    assert!(usage[1].pattern.contains("| m"));
}

#[tokio::test]
async fn test_highlight_marks_every_occurrence() {
    let chain = full_chain(Arc::new(RecordingDelivery::default()));
    let mut ctx = styled_context(&chain);

    let plain = text(chain.process("help", &mut ctx).await.unwrap());
    let marked = text(chain.process("help | h exit", &mut ctx).await.unwrap());

    assert!(marked.contains("<<exit>>"));
    assert_eq!(marked.matches("<<exit>>").count(), plain.matches("exit").count());
    assert_eq!(marked.replace("<<", "").replace(">>", ""), plain);
}

#[tokio::test]
async fn test_highlight_passes_errors_through() {
    let chain = full_chain(Arc::new(RecordingDelivery::default()));
    let mut ctx = styled_context(&chain);

    let out = text(chain.process("nope | h nope", &mut ctx).await.unwrap());
    assert!(out.starts_with("Unsupported command 'nope'"));
    assert!(!out.contains("<<"));

    let out = text(chain.process("echo bob a|b | h a", &mut ctx).await.unwrap());
    assert!(out.starts_with("Invalid command syntax"));
}

#[tokio::test]
async fn test_forward_delivers_instead_of_showing() {
    let delivery = Arc::new(RecordingDelivery::default());
    let chain = full_chain(delivery.clone());
    let mut ctx = styled_context(&chain);

    let out = text(
        chain
            .process("echo bob status | m ops@example.com", &mut ctx)
            .await
            .unwrap(),
    );
    assert_eq!(out, "Output response sent to ops@example.com");

    let sent = delivery.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "ops@example.com");
    assert_eq!(sent[0].1, "echo bob status");
    assert_eq!(sent[0].2, "bob says status");
}

#[tokio::test]
async fn test_forward_does_not_deliver_errors() {
    let delivery = Arc::new(RecordingDelivery::default());
    let chain = full_chain(delivery.clone());
    let mut ctx = styled_context(&chain);

    let out = text(chain.process("test execute | m ops", &mut ctx).await.unwrap());
    assert_eq!(out, "Permission denied");
    assert!(delivery.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_forward_failure_is_reported() {
    let chain = full_chain(Arc::new(FailingDelivery));
    let mut ctx = styled_context(&chain);

    let out = text(chain.process("whoami | m ops", &mut ctx).await.unwrap());
    assert_eq!(out, "Failed to send output to ops");
    assert!(!out.contains("unreachable"));
}

#[tokio::test]
async fn test_unclaimed_pipe_is_malformed() {
    let chain = full_chain(Arc::new(RecordingDelivery::default()));
    let mut ctx = styled_context(&chain);

    let out = text(chain.process("echo bob hi | grep x", &mut ctx).await.unwrap());
    assert!(out.starts_with("Invalid command syntax"));
}

#[tokio::test]
async fn test_custom_banned_symbols() {
    let chain = ProcessorChain::builder()
        .banned_symbols([";", "&&"])
        .build(dispatcher())
        .unwrap();
    let mut ctx = context("alice", &["USER"]);

    let out = text(chain.process("echo bob a && rm", &mut ctx).await.unwrap());
    assert!(out.starts_with("Invalid command syntax"));

    // '|'는 더 이상 금지되지 않음
    let out = text(chain.process("echo bob a|b", &mut ctx).await.unwrap());
    assert_eq!(out, "bob says a|b");
}

#[tokio::test]
async fn test_terminate_propagates_through_stages() {
    let chain = full_chain(Arc::new(RecordingDelivery::default()));
    let mut ctx = styled_context(&chain);

    let outcome = chain.process("exit | h bye", &mut ctx).await.unwrap();
    assert!(matches!(outcome, Some(ChainOutcome::Terminate(_))));

    let outcome = chain.process("  exit  ", &mut ctx).await.unwrap();
    assert!(outcome.unwrap().is_terminate());
}

#[tokio::test]
async fn test_blank_input_runs_nothing() {
    let chain = full_chain(Arc::new(RecordingDelivery::default()));
    let mut ctx = styled_context(&chain);

    assert_eq!(chain.process("", &mut ctx).await.unwrap(), None);
    assert_eq!(chain.process(" \t ", &mut ctx).await.unwrap(), None);
}

#[tokio::test]
async fn test_chained_post_processors_are_malformed() {
    let delivery = Arc::new(RecordingDelivery::default());
    let chain = full_chain(delivery.clone());
    let mut ctx = styled_context(&chain);

    let out = text(chain.process("help | h exit | m ops", &mut ctx).await.unwrap());
    assert!(out.starts_with("Invalid command syntax"), "{:?}", out);

    let out = text(chain.process("help | m ops | h exit", &mut ctx).await.unwrap());
    assert!(out.starts_with("Invalid command syntax"), "{:?}", out);
    assert!(delivery.sent.lock().unwrap().is_empty());
}
