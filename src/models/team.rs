use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TeamMember {
    /// Name shown in the dashboard and accepted by `--member`.
    pub name: String,
    /// Value Jira accepts in `assignee = "..."` (email, account name, ...).
    pub identity: String,
}

/// Read-only lookup between display names and tracker identities.
#[derive(Debug, Clone, Default)]
pub struct TeamDirectory {
    members: Vec<TeamMember>,
}

impl TeamDirectory {
    pub fn new(members: Vec<TeamMember>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    pub fn identity_of(&self, name: &str) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.identity.as_str())
    }

    /// Display name for an identity, or the local part of an email.
    pub fn display_name_of(&self, identity: &str) -> String {
        if let Some(member) = self.members.iter().find(|m| m.identity == identity) {
            return member.name.clone();
        }

        match identity.split_once('@') {
            Some((local, _)) => local.to_string(),
            None => identity.to_string(),
        }
    }

    /// Splits names into resolved identities and names with no entry.
    pub fn resolve<'a>(&self, names: &'a [String]) -> (Vec<String>, Vec<&'a str>) {
        let mut identities = Vec::new();
        let mut unmapped = Vec::new();

        for name in names {
            match self.identity_of(name) {
                Some(identity) => identities.push(identity.to_string()),
                None => unmapped.push(name.as_str()),
            }
        }

        (identities, unmapped)
    }
}
