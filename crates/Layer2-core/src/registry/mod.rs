//! # Command Registry
//!
//! 서비스 시작 시 한 번 빌드되고 이후 변경되지 않는 명령어 레지스트리.
//! 모든 세션이 `Arc<CommandRegistry>`로 공유하며, 읽기 전용이므로 동기화가
//! 필요 없습니다.
//!
//! ## 빌드 규칙
//!
//! - 같은 top-level 이름을 두 provider가 등록하면 빌드 실패
//! - 한 provider 안에서 subcommand 이름이 중복되면 빌드 실패
//! - DEFAULT executor도 subcommand도 없는 entry는 빌드 실패
//! - 이름은 비어 있지 않고 공백을 포함하지 않아야 함

mod entry;

pub use entry::CommandEntry;

use crate::command::{CommandDescriptor, CommandProvider};
use opshell_foundation::{Error, Result, RoleSet};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Immutable map of top-level command name → entry, sorted by name
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    entries: BTreeMap<String, CommandEntry>,
}

impl CommandRegistry {
    /// Build the registry from every provider at once
    ///
    /// Any rule violation fails the whole build; there is no partial registry.
    pub fn build<I>(providers: I) -> Result<Self>
    where
        I: IntoIterator<Item = CommandProvider>,
    {
        let mut entries = BTreeMap::new();

        for provider in providers {
            let (default, subs) = provider.into_parts();
            validate_name(default.name())?;

            let top = default.name().to_string();
            if entries.contains_key(&top) {
                return Err(Error::DuplicateCommand(top));
            }

            let mut subcommands: BTreeMap<String, CommandDescriptor> = BTreeMap::new();
            for sub in subs {
                validate_name(sub.name())?;
                if subcommands.contains_key(sub.name()) {
                    return Err(Error::duplicate_subcommand(&top, sub.name()));
                }
                subcommands.insert(sub.name().to_string(), sub);
            }

            if !default.has_executor() && subcommands.is_empty() {
                return Err(Error::EmptyCommand(top));
            }

            debug!(
                "Registering command: {} ({} subcommands, roles {})",
                top,
                subcommands.len(),
                default.required_roles()
            );
            entries.insert(top, CommandEntry::new(default, subcommands));
        }

        info!("Command registry built with {} commands", entries.len());
        Ok(Self { entries })
    }

    /// Built-in commands (`help`, `exit`) plus the given providers
    pub fn with_builtins<I>(providers: I) -> Result<Self>
    where
        I: IntoIterator<Item = CommandProvider>,
    {
        Self::build(crate::builtin::providers().into_iter().chain(providers))
    }

    /// Entry of a top-level command
    pub fn lookup(&self, command: &str) -> Option<&CommandEntry> {
        self.entries.get(command)
    }

    /// Descriptor of `command subcommand`
    pub fn lookup_sub(&self, command: &str, subcommand: &str) -> Option<&CommandDescriptor> {
        self.lookup(command)?.subcommand(subcommand)
    }

    /// All top-level names, alphabetically
    pub fn list_top_level(&self) -> Vec<&str> {
        self.entries.keys().map(|k| k.as_str()).collect()
    }

    /// DEFAULT descriptors the caller is authorized for, alphabetically
    pub fn list_authorized(&self, caller: &RoleSet) -> Vec<&CommandDescriptor> {
        self.entries
            .values()
            .map(CommandEntry::default_descriptor)
            .filter(|desc| desc.is_authorized(caller))
            .collect()
    }

    /// Authorized top-level names starting with `prefix`
    pub fn complete(&self, prefix: &str, caller: &RoleSet) -> Vec<&str> {
        self.entries
            .range(prefix.to_string()..)
            .take_while(|(name, _)| name.starts_with(prefix))
            .filter(|(_, entry)| entry.default_descriptor().is_authorized(caller))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn contains(&self, command: &str) -> bool {
        self.entries.contains_key(command)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(Error::InvalidCommandName(name.to_string()));
    }
    Ok(())
}
