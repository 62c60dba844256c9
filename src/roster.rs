//! Static audience roster backed by a JSON file.
//!
//! Maps group names to member lists. This is the service's
//! `RecipientSource`: membership is whatever the file said at load time,
//! deduplicated by recipient id with first occurrence winning.
use std::collections::{HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use crate::dispatch::Recipient;
use crate::error::Result;
use crate::ports::RecipientSource;

#[derive(Clone, Debug, Default)]
pub struct StaticRoster {
    groups: HashMap<String, Vec<Recipient>>,
}

impl StaticRoster {
    pub fn from_groups(groups: HashMap<String, Vec<Recipient>>) -> Self {
        let groups = groups
            .into_iter()
            .map(|(name, members)| (name, dedup_members(members)))
            .collect();
        Self { groups }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let groups: HashMap<String, Vec<Recipient>> = serde_json::from_str(&raw)?;
        let roster = Self::from_groups(groups);
        info!(
            path = %path.display(),
            groups = roster.groups.len(),
            "audience roster loaded"
        );
        Ok(roster)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

fn dedup_members(members: Vec<Recipient>) -> Vec<Recipient> {
    let mut seen = HashSet::new();
    members
        .into_iter()
        .filter(|member| seen.insert(member.id.clone()))
        .collect()
}

#[async_trait]
impl RecipientSource for StaticRoster {
    async fn members(&self, group: &str) -> Result<Vec<Recipient>> {
        self.groups
            .get(group)
            .cloned()
            .ok_or_else(|| crate::recipient_fetch_error!("no such group: {}", group))
    }
}
