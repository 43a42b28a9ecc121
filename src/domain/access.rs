use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An opinion cast by a voter while execution access is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessVote {
    Allow,
    Deny,
    /// Vetoes access regardless of any `Allow`.
    Kill,
}

/// Resolves the merged votes of all voters.
///
/// No votes at all grants access. Otherwise at least one `Allow` and no `Kill`
/// are required, so a lone `Deny` denies. The result does not depend on the
/// order of `votes`.
pub fn resolve_votes(votes: &[AccessVote]) -> bool {
    votes.is_empty() || (votes.contains(&AccessVote::Allow) && !votes.contains(&AccessVote::Kill))
}

/// The acting user or account that access is checked for.
pub trait Principal: Send + Sync {
    fn id(&self) -> u64;
    fn has_permission(&self, permission: &str) -> bool;
}

/// A principal with a fixed set of permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    pub permissions: BTreeSet<String>,
}

impl Account {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            permissions: BTreeSet::new(),
        }
    }

    pub fn with_permission(mut self, permission: &str) -> Self {
        self.permissions.insert(permission.to_string());
        self
    }
}

impl Principal for Account {
    fn id(&self) -> u64 {
        self.id
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

#[cfg(test)]
mod tests {
    use super::AccessVote::{Allow, Deny, Kill};
    use super::*;

    #[test]
    fn test_vote_resolution_table() {
        assert!(resolve_votes(&[]));
        assert!(resolve_votes(&[Allow]));
        assert!(!resolve_votes(&[Deny]));
        assert!(resolve_votes(&[Allow, Deny]));
        assert!(!resolve_votes(&[Allow, Kill]));
        assert!(!resolve_votes(&[Kill]));
    }

    #[test]
    fn test_vote_resolution_ignores_order() {
        assert_eq!(resolve_votes(&[Kill, Allow, Deny]), resolve_votes(&[Deny, Allow, Kill]));
        assert!(resolve_votes(&[Deny, Deny, Allow]));
        assert!(!resolve_votes(&[Deny, Kill]));
    }

    #[test]
    fn test_account_permissions() {
        let account = Account::new(3).with_permission("payment.payment.view.own");
        assert_eq!(account.id(), 3);
        assert!(account.has_permission("payment.payment.view.own"));
        assert!(!account.has_permission("payment.payment.view.any"));
    }
}
