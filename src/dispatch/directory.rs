// ABOUTME: In-memory recipient directory resolving named contact groups into recipient lists
// ABOUTME: Read-only from the engine's side; groups are loaded up front by the host application

use crate::datatypes::{Recipient, dedupe_recipients};
use crate::dispatch::error::{DirectoryError, DirectoryResult};
use crate::dispatch::traits::RecipientDirectory;
use std::collections::HashMap;
use tracing::debug;

/// Contact groups held in a map
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    groups: HashMap<String, Vec<Recipient>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a group
    pub fn with_group(mut self, name: impl Into<String>, members: Vec<Recipient>) -> Self {
        self.groups.insert(name.into(), members);
        self
    }

    pub fn group_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.groups.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl RecipientDirectory for InMemoryDirectory {
    async fn resolve(&self, group: &str) -> DirectoryResult<Vec<Recipient>> {
        let members = self
            .groups
            .get(group)
            .ok_or_else(|| DirectoryError::UnknownGroup(group.to_string()))?;

        for member in members {
            member
                .validate()
                .map_err(|source| DirectoryError::InvalidRecipient {
                    group: group.to_string(),
                    source,
                })?;
        }

        let resolved = dedupe_recipients(members.clone());
        debug!(
            "Resolved group {} to {} recipient(s) ({} listed)",
            group,
            resolved.len(),
            members.len()
        );
        Ok(resolved)
    }
}
