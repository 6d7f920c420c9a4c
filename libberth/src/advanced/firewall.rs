//! Per-container firewall entries.

use crate::error::{BerthError, Result};
use crate::model::{FirewallEntry, FirewallPolicy};
use ipnet::IpNet;
use std::net::IpAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirewallEdit {
    Cidr(String),
    Level(String),
    Policy(FirewallPolicy),
    Rule(String),
}

/// Parses a CIDR block; a bare address is taken as a single-host network.
///
/// # Examples
///
/// ```
/// use libberth::advanced::firewall::parse_cidr;
///
/// assert_eq!(parse_cidr("10.0.0.0/8").unwrap().prefix_len(), 8);
/// assert_eq!(parse_cidr("192.168.1.10").unwrap().prefix_len(), 32);
/// assert!(parse_cidr("10.0.0.0/33").is_err());
/// ```
pub fn parse_cidr(input: &str) -> Result<IpNet> {
    let input = input.trim();
    if let Ok(net) = input.parse::<IpNet>() {
        return Ok(net);
    }
    input
        .parse::<IpAddr>()
        .map(IpNet::from)
        .map_err(|e| BerthError::validation_with_source(format!("Invalid CIDR '{}'", input), e))
}

/// Ordered firewall entries of one container.
#[derive(Debug, Clone, Default)]
pub struct FirewallManager {
    container_index: usize,
    entries: Vec<FirewallEntry>,
}

impl FirewallManager {
    pub fn new(container_index: usize) -> Self {
        Self {
            container_index,
            entries: Vec::new(),
        }
    }

    pub fn from_entries(container_index: usize, entries: Vec<FirewallEntry>) -> Self {
        let mut manager = Self {
            container_index,
            entries,
        };
        manager.set_container_index(container_index);
        manager
    }

    pub fn entries(&self) -> &[FirewallEntry] {
        &self.entries
    }

    pub fn add_entry(
        &mut self,
        cidr: &str,
        level: &str,
        policy: FirewallPolicy,
        rule: &str,
    ) -> Result<usize> {
        let cidr = parse_cidr(cidr)?;
        self.entries.push(FirewallEntry {
            cidr: cidr.to_string(),
            level: level.trim().to_string(),
            policy,
            rule: rule.trim().to_string(),
            container_index: self.container_index,
        });
        Ok(self.entries.len() - 1)
    }

    pub fn remove_entry(&mut self, index: usize) -> Result<FirewallEntry> {
        self.check_index(index)?;
        Ok(self.entries.remove(index))
    }

    pub fn edit_entry(&mut self, index: usize, edit: FirewallEdit) -> Result<()> {
        self.check_index(index)?;
        let entry = &mut self.entries[index];
        match edit {
            FirewallEdit::Cidr(cidr) => entry.cidr = parse_cidr(&cidr)?.to_string(),
            FirewallEdit::Level(level) => entry.level = level.trim().to_string(),
            FirewallEdit::Policy(policy) => entry.policy = policy,
            FirewallEdit::Rule(rule) => entry.rule = rule.trim().to_string(),
        }
        Ok(())
    }

    pub fn set_container_index(&mut self, container_index: usize) {
        self.container_index = container_index;
        for entry in &mut self.entries {
            entry.container_index = container_index;
        }
    }

    pub fn snapshot(&self) -> Vec<FirewallEntry> {
        self.entries.clone()
    }

    /// Re-checks entries that were rehydrated without going through `add_entry`.
    pub fn validate(&self) -> Result<()> {
        for entry in &self.entries {
            parse_cidr(&entry.cidr)?;
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(BerthError::out_of_range("firewall entry", index, self.entries.len()))
        }
    }
}
