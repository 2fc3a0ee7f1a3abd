use chrono::NaiveDate;

use crate::model::task::Task;

/// Active board filters. Each dimension is an independent multi-value
/// selection; dimensions are ANDed together, values within one dimension
/// are ORed. An empty selection places no constraint on its dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    /// Client names.
    pub clients: Vec<String>,
    /// Project names.
    pub projects: Vec<String>,
    /// Product names.
    pub products: Vec<String>,
    /// Assignee user ids.
    pub assignees: Vec<String>,
    /// Tag names.
    pub tags: Vec<String>,
    /// Priority labels.
    pub priorities: Vec<String>,
    /// Exact calendar-day match on the due date.
    pub due_day: Option<NaiveDate>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
            && self.projects.is_empty()
            && self.products.is_empty()
            && self.assignees.is_empty()
            && self.tags.is_empty()
            && self.priorities.is_empty()
            && self.due_day.is_none()
    }

    pub fn clear(&mut self) {
        *self = FilterSet::default();
    }

    /// Number of dimensions currently constrained (for the status row).
    pub fn active_dimensions(&self) -> usize {
        [
            !self.clients.is_empty(),
            !self.projects.is_empty(),
            !self.products.is_empty(),
            !self.assignees.is_empty(),
            !self.tags.is_empty(),
            !self.priorities.is_empty(),
            self.due_day.is_some(),
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }

    /// Whether `task` satisfies every constrained dimension.
    pub fn matches(&self, task: &Task) -> bool {
        intersects(&self.clients, &task.client)
            && intersects(&self.projects, &task.project)
            && intersects(&self.products, &task.product)
            && intersects(&self.assignees, &task.assigned_to)
            && intersects(&self.tags, &task.tags)
            && scalar_in(&self.priorities, task.priority.as_deref())
            && match self.due_day {
                None => true,
                Some(day) => task.due_day() == Some(day),
            }
    }

    /// Toggle one value in a dimension's selection.
    pub fn toggle(selection: &mut Vec<String>, value: &str) {
        if let Some(pos) = selection.iter().position(|v| v == value) {
            selection.remove(pos);
        } else {
            selection.push(value.to_string());
        }
    }
}

/// Apply `filter` to `tasks`, preserving order. The result is always a
/// subset of the input.
pub fn apply<'a>(tasks: &'a [Task], filter: &FilterSet) -> Vec<&'a Task> {
    tasks.iter().filter(|t| filter.matches(t)).collect()
}

/// Empty selection matches everything; otherwise some selected value must
/// appear in the task's list.
fn intersects(selection: &[String], values: &[String]) -> bool {
    selection.is_empty() || selection.iter().any(|s| values.iter().any(|v| v == s))
}

fn scalar_in(selection: &[String], value: Option<&str>) -> bool {
    selection.is_empty() || value.is_some_and(|v| selection.iter().any(|s| s == v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Task;

    fn task(client: &[&str], tags: &[&str]) -> Task {
        let mut t = Task::new("t", "s1");
        t.client = client.iter().map(|s| s.to_string()).collect();
        t.tags = tags.iter().map(|s| s.to_string()).collect();
        t
    }

    #[test]
    fn empty_filter_matches_everything() {
        let tasks = vec![task(&["A"], &["x"]), task(&[], &[])];
        let filter = FilterSet::default();
        assert_eq!(apply(&tasks, &filter).len(), 2);
    }

    #[test]
    fn single_dimension_selects_by_membership() {
        let tasks = vec![task(&["A"], &["x"]), task(&["B"], &["x"])];
        let filter = FilterSet {
            clients: vec!["A".into()],
            ..Default::default()
        };
        let got = apply(&tasks, &filter);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].client, vec!["A"]);
    }

    #[test]
    fn dimensions_are_conjunctive() {
        let tasks = vec![task(&["A"], &["x"]), task(&["A"], &["y"])];
        let filter = FilterSet {
            clients: vec!["A".into()],
            tags: vec!["y".into()],
            ..Default::default()
        };
        let got = apply(&tasks, &filter);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].tags, vec!["y"]);
    }

    #[test]
    fn values_within_a_dimension_are_disjunctive() {
        let tasks = vec![task(&["A"], &[]), task(&["B"], &[]), task(&["C"], &[])];
        let filter = FilterSet {
            clients: vec!["A".into(), "C".into()],
            ..Default::default()
        };
        assert_eq!(apply(&tasks, &filter).len(), 2);
    }

    #[test]
    fn result_is_subset_of_input() {
        let tasks = vec![task(&["A"], &["x"]), task(&["B"], &["y"])];
        let filter = FilterSet {
            tags: vec!["x".into(), "y".into(), "z".into()],
            ..Default::default()
        };
        let got = apply(&tasks, &filter);
        assert!(got.len() <= tasks.len());
        for t in got {
            assert!(tasks.iter().any(|orig| orig == t));
        }
    }

    #[test]
    fn assignee_filter_matches_ids() {
        let mut t = task(&[], &[]);
        t.assigned_to = vec!["u1".into(), "u2".into()];
        let filter = FilterSet {
            assignees: vec!["u2".into()],
            ..Default::default()
        };
        assert!(filter.matches(&t));

        let filter = FilterSet {
            assignees: vec!["u9".into()],
            ..Default::default()
        };
        assert!(!filter.matches(&t));
    }

    #[test]
    fn priority_filter_is_exact_on_the_scalar() {
        let mut t = task(&[], &[]);
        t.priority = Some("Alta".into());
        let hit = FilterSet {
            priorities: vec!["Alta".into(), "Baixa".into()],
            ..Default::default()
        };
        assert!(hit.matches(&t));

        let miss = FilterSet {
            priorities: vec!["Baixa".into()],
            ..Default::default()
        };
        assert!(!miss.matches(&t));

        // A constrained priority dimension excludes tasks with none at all.
        t.priority = None;
        assert!(!hit.matches(&t));
    }

    #[test]
    fn due_filter_compares_calendar_day_only() {
        let mut t = task(&[], &[]);
        t.due_date = Some("2024-05-01T18:45:00.000Z".into());
        let filter = FilterSet {
            due_day: NaiveDate::from_ymd_opt(2024, 5, 1),
            ..Default::default()
        };
        assert!(filter.matches(&t));

        t.due_date = Some("2024-05-02T00:00:00.000Z".into());
        assert!(!filter.matches(&t));

        // No due date never matches a due filter.
        t.due_date = None;
        assert!(!filter.matches(&t));
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut sel = Vec::new();
        FilterSet::toggle(&mut sel, "Acme");
        assert_eq!(sel, vec!["Acme"]);
        FilterSet::toggle(&mut sel, "Acme");
        assert!(sel.is_empty());
    }

    #[test]
    fn active_dimensions_counts_constrained_dimensions() {
        let filter = FilterSet {
            clients: vec!["A".into()],
            due_day: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        assert_eq!(filter.active_dimensions(), 2);
        assert!(!filter.is_empty());
        assert_eq!(FilterSet::default().active_dimensions(), 0);
    }
}
