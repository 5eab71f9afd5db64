use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Error};

use crate::model::task::Task;

/// Completion-based inclusion for the displayed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    All,
    Completed,
    Active,
}

impl Default for FilterMode {
    fn default() -> Self {
        FilterMode::All
    }
}

impl FilterMode {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Completed => task.is_completed,
            FilterMode::Active => !task.is_completed,
        }
    }

    /// Next value in selector order: All, Active, Completed.
    pub fn next(self) -> Self {
        match self {
            FilterMode::All => FilterMode::Active,
            FilterMode::Active => FilterMode::Completed,
            FilterMode::Completed => FilterMode::All,
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterMode::All => "All",
            FilterMode::Completed => "Completed",
            FilterMode::Active => "Active",
        };
        f.write_str(s)
    }
}

impl FromStr for FilterMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(FilterMode::All),
            "completed" | "done" => Ok(FilterMode::Completed),
            "active" | "pending" => Ok(FilterMode::Active),
            other => Err(anyhow!("Unknown filter mode: '{}'", other)),
        }
    }
}

/// Display ordering of task text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Asc
    }
}

impl SortOrder {
    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortOrder::Asc => "Asc",
            SortOrder::Desc => "Desc",
        };
        f.write_str(s)
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(anyhow!("Unknown sort order: '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::TaskId;

    #[test]
    fn test_filter_matches() {
        let mut task = Task::new(TaskId(1), "a".to_string(), String::new(), String::new());
        assert!(FilterMode::All.matches(&task));
        assert!(FilterMode::Active.matches(&task));
        assert!(!FilterMode::Completed.matches(&task));

        task.toggle();
        assert!(FilterMode::All.matches(&task));
        assert!(!FilterMode::Active.matches(&task));
        assert!(FilterMode::Completed.matches(&task));
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("Completed".parse::<FilterMode>().unwrap(), FilterMode::Completed);
        assert_eq!("pending".parse::<FilterMode>().unwrap(), FilterMode::Active);
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("sideways".parse::<SortOrder>().is_err());
        assert!("".parse::<FilterMode>().is_err());
    }

    #[test]
    fn test_selector_cycles() {
        assert_eq!(FilterMode::All.next().next().next(), FilterMode::All);
        assert_eq!(SortOrder::Asc.toggle(), SortOrder::Desc);
        assert_eq!(SortOrder::Desc.toggle(), SortOrder::Asc);
    }
}
