// Search filtering over the task list

use crate::models::Task;

/// Field of a task a search query is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Name,
    Description,
}

impl SearchField {
    pub const ALL: [SearchField; 2] = [SearchField::Name, SearchField::Description];

    fn value(self, task: &Task) -> &str {
        match self {
            SearchField::Name => &task.name,
            SearchField::Description => &task.description,
        }
    }
}

impl std::fmt::Display for SearchField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchField::Name => write!(f, "name"),
            SearchField::Description => write!(f, "description"),
        }
    }
}

/// Case-insensitive substring query
///
/// An empty query matches every task.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    needle: String,
}

impl SearchFilter {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// First field that contains the query, if any
    pub fn matched_field(&self, task: &Task) -> Option<SearchField> {
        SearchField::ALL
            .into_iter()
            .find(|field| field.value(task).to_lowercase().contains(&self.needle))
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.is_empty() || self.matched_field(task).is_some()
    }
}

/// Ordered subsequence of `tasks` matching `query` in name or description
pub fn filter_tasks<'a>(tasks: &'a [Task], query: &str) -> Vec<&'a Task> {
    let filter = SearchFilter::new(query);
    if filter.is_empty() {
        return tasks.iter().collect();
    }
    tasks.iter().filter(|task| filter.matches(task)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Task> {
        vec![
            Task::new("Buy milk", ""),
            Task::new("Call mom", "about the MILK delivery"),
            Task::new("Write report", "quarterly"),
            Task::new("buy bread", "Bakery"),
        ]
    }

    #[test]
    fn test_empty_query_returns_all() {
        let tasks = sample();
        let result = filter_tasks(&tasks, "");
        assert_eq!(result.len(), tasks.len());
        for (got, want) in result.iter().zip(tasks.iter()) {
            assert_eq!(*got, want);
        }
    }

    #[test]
    fn test_matches_name_or_description_case_insensitive() {
        let tasks = sample();
        let names: Vec<&str> = filter_tasks(&tasks, "milk").iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Buy milk", "Call mom"]);

        let names: Vec<&str> = filter_tasks(&tasks, "BUY").iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Buy milk", "buy bread"]);
    }

    #[test]
    fn test_no_match() {
        let tasks = sample();
        assert!(filter_tasks(&tasks, "zebra").is_empty());
    }

    #[test]
    fn test_query_is_not_trimmed() {
        let tasks = sample();
        let names: Vec<&str> = filter_tasks(&tasks, "y m").iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Buy milk"]);
    }

    #[test]
    fn test_matched_field() {
        let filter = SearchFilter::new("bakery");
        assert_eq!(filter.matched_field(&Task::new("buy bread", "Bakery")), Some(SearchField::Description));
        assert_eq!(filter.matched_field(&Task::new("Bakery run", "Bakery")), Some(SearchField::Name));
        assert_eq!(filter.matched_field(&Task::new("x", "y")), None);
    }

    #[test]
    fn test_every_result_matches_and_every_match_is_returned() {
        let tasks = sample();
        let query = "r";
        let filter = SearchFilter::new(query);
        let result = filter_tasks(&tasks, query);

        for task in &result {
            assert!(filter.matched_field(task).is_some());
        }
        let expected: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t)).collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn test_search_field_display() {
        assert_eq!(SearchField::Name.to_string(), "name");
        assert_eq!(SearchField::Description.to_string(), "description");
    }
}
