use std::fmt;
use std::str::FromStr;

/// Which team members a view is restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MemberSelection {
    /// No member filter at all.
    #[default]
    All,
    /// An explicit selection of display names. May be empty.
    Selected(Vec<String>),
}

impl MemberSelection {
    pub fn from_names(names: Vec<String>) -> Self {
        if names.is_empty() {
            MemberSelection::All
        } else {
            MemberSelection::Selected(names)
        }
    }
}

/// Status groups offered by the activity view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusBucket {
    #[default]
    All,
    Completed,
    InProgress,
    Blocked,
    Named(String),
}

impl StatusBucket {
    /// Status labels covered by the bucket. Empty for `All`.
    pub fn statuses(&self) -> Vec<&str> {
        match self {
            StatusBucket::All => Vec::new(),
            StatusBucket::Completed => vec!["Done", "Closed", "Resolved"],
            StatusBucket::InProgress => vec!["In Progress", "In Review", "Testing"],
            StatusBucket::Blocked => vec!["Blocked"],
            StatusBucket::Named(name) => vec![name.as_str()],
        }
    }

    pub fn matches(&self, status: &str) -> bool {
        match self {
            StatusBucket::All => true,
            _ => self.statuses().contains(&status),
        }
    }
}

impl FromStr for StatusBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("Status bucket cannot be empty".to_string());
        }

        Ok(match trimmed.to_lowercase().as_str() {
            "all" => StatusBucket::All,
            "completed" => StatusBucket::Completed,
            "in-progress" | "in_progress" => StatusBucket::InProgress,
            "blocked" => StatusBucket::Blocked,
            _ => StatusBucket::Named(trimmed.to_string()),
        })
    }
}

impl fmt::Display for StatusBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusBucket::All => write!(f, "All"),
            StatusBucket::Completed => write!(f, "Completed"),
            StatusBucket::InProgress => write!(f, "In Progress"),
            StatusBucket::Blocked => write!(f, "Blocked"),
            StatusBucket::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Sort order of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    RecentlyUpdated,
    PriorityThenDue,
    PriorityThenAge,
    Oldest,
}

impl Ordering {
    pub fn order_by(&self) -> &'static str {
        match self {
            Ordering::RecentlyUpdated => "ORDER BY updated DESC",
            Ordering::PriorityThenDue => "ORDER BY priority DESC, duedate ASC, created ASC",
            Ordering::PriorityThenAge => "ORDER BY priority DESC, created ASC",
            Ordering::Oldest => "ORDER BY created ASC",
        }
    }
}

impl FromStr for Ordering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "updated" => Ok(Ordering::RecentlyUpdated),
            "priority-due" => Ok(Ordering::PriorityThenDue),
            "priority" => Ok(Ordering::PriorityThenAge),
            "oldest" => Ok(Ordering::Oldest),
            _ => Err(format!(
                "Invalid ordering: {}. Use 'updated', 'priority', 'priority-due' or 'oldest'",
                s
            )),
        }
    }
}

/// Filter selections of one dashboard interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterIntent {
    pub members: MemberSelection,
    pub days_back: u32,
    pub status: StatusBucket,
    pub ordering: Option<Ordering>,
}

impl Default for FilterIntent {
    fn default() -> Self {
        Self {
            members: MemberSelection::All,
            days_back: 7,
            status: StatusBucket::All,
            ordering: None,
        }
    }
}

impl FilterIntent {
    pub fn for_members(names: Vec<String>) -> Self {
        Self {
            members: MemberSelection::from_names(names),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_bucket_parsing() {
        assert_eq!("completed".parse::<StatusBucket>().unwrap(), StatusBucket::Completed);
        assert_eq!("In-Progress".parse::<StatusBucket>().unwrap(), StatusBucket::InProgress);
        assert_eq!(
            "Code Review".parse::<StatusBucket>().unwrap(),
            StatusBucket::Named("Code Review".to_string())
        );
        assert!("  ".parse::<StatusBucket>().is_err());
    }

    #[test]
    fn test_status_bucket_matches() {
        assert!(StatusBucket::All.matches("Anything"));
        assert!(StatusBucket::Completed.matches("Resolved"));
        assert!(!StatusBucket::Completed.matches("In Progress"));
        assert!(StatusBucket::Named("QA".to_string()).matches("QA"));
    }

    #[test]
    fn test_member_selection_from_names() {
        assert_eq!(MemberSelection::from_names(vec![]), MemberSelection::All);
        assert_eq!(
            MemberSelection::from_names(vec!["Alice".to_string()]),
            MemberSelection::Selected(vec!["Alice".to_string()])
        );
    }

    #[test]
    fn test_ordering_parsing() {
        assert_eq!("priority-due".parse::<Ordering>().unwrap(), Ordering::PriorityThenDue);
        assert!("sideways".parse::<Ordering>().is_err());
    }
}
