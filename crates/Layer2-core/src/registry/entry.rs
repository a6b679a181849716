//! Registry Entry - top-level 명령어 하나의 descriptor 집합

use crate::command::CommandDescriptor;
use opshell_foundation::RoleSet;
use std::collections::BTreeMap;

/// One top-level command: the DEFAULT slot plus its named subcommands
#[derive(Debug, Clone)]
pub struct CommandEntry {
    default: CommandDescriptor,
    subcommands: BTreeMap<String, CommandDescriptor>,
}

impl CommandEntry {
    pub(crate) fn new(
        default: CommandDescriptor,
        subcommands: BTreeMap<String, CommandDescriptor>,
    ) -> Self {
        Self {
            default,
            subcommands,
        }
    }

    /// Top-level name
    pub fn name(&self) -> &str {
        self.default.name()
    }

    /// Namespace-level (DEFAULT) descriptor
    pub fn default_descriptor(&self) -> &CommandDescriptor {
        &self.default
    }

    pub fn subcommand(&self, name: &str) -> Option<&CommandDescriptor> {
        self.subcommands.get(name)
    }

    /// Subcommands in name order
    pub fn subcommands(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.subcommands.values()
    }

    /// Subcommands the caller may invoke, in name order
    pub fn authorized_subcommands<'a>(
        &'a self,
        caller: &'a RoleSet,
    ) -> impl Iterator<Item = &'a CommandDescriptor> + 'a {
        self.subcommands
            .values()
            .filter(move |desc| desc.is_authorized(caller))
    }

    pub fn has_subcommands(&self) -> bool {
        !self.subcommands.is_empty()
    }

    /// Namespace only: no DEFAULT executor, reachable through subcommands
    pub fn is_namespace_only(&self) -> bool {
        !self.default.has_executor()
    }

    /// Listing of the subcommands `caller` may invoke
    pub fn subcommand_listing(&self, caller: &RoleSet) -> String {
        let visible: Vec<&CommandDescriptor> = self.authorized_subcommands(caller).collect();
        if visible.is_empty() {
            return format!("No subcommands of '{}' are available", self.name());
        }

        let width = visible.iter().map(|d| d.name().len()).max().unwrap_or(0);
        let mut out = format!("Supported subcommands for {}", self.name());
        for desc in visible {
            out.push_str(&format!(
                "\n  {:<width$}  {}",
                desc.name(),
                desc.description(),
                width = width
            ));
        }
        out
    }
}
