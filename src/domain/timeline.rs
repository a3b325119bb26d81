//! Gantt timeline geometry
//!
//! The visible window covers every planned and actual date with a margin of
//! 3 days before and 10 days after. Bars are expressed in whole days from
//! the window start so the rendering layer can scale them to any cell width.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::task::Task;

const LEAD_DAYS: i64 = 3;
const TRAIL_DAYS: i64 = 10;

/// Position of a bar relative to the window start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bar {
    pub offset_days: i64,
    pub span_days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timeline {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Timeline {
    /// Window for a set of tasks; `None` when there are no tasks.
    ///
    /// Tasks without an actual end keep the window open until `today`.
    pub fn from_tasks(tasks: &[Task], today: NaiveDate) -> Option<Self> {
        let first = tasks.first()?;
        let (mut min, mut max) = (first.start_date, first.end_date);

        for task in tasks {
            min = min.min(task.start_date);
            max = max.max(task.end_date);
            if let Some(actual_start) = task.actual_start_date {
                min = min.min(actual_start);
            }
            max = max.max(task.actual_end_date.unwrap_or(today));
        }

        Some(Self {
            start: min - Duration::days(LEAD_DAYS),
            end: max + Duration::days(TRAIL_DAYS),
        })
    }

    /// Number of day columns, both ends inclusive
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Bar for a date range; spans at least one day
    pub fn bar(&self, start: NaiveDate, end: NaiveDate) -> Bar {
        Bar {
            offset_days: (start - self.start).num_days(),
            span_days: ((end - start).num_days() + 1).max(1),
        }
    }

    /// Planned bar of a task
    pub fn planned(&self, task: &Task) -> Bar {
        self.bar(task.start_date, task.end_date)
    }

    /// Actual bar of a task, if it has started
    pub fn actual(&self, task: &Task, today: NaiveDate) -> Option<Bar> {
        task.actual_start_date
            .map(|start| self.bar(start, task.actual_end_date.unwrap_or(today)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::parse_date;
    use crate::domain::ProjectId;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn task(start: &str, end: &str) -> Task {
        Task::new(
            "t".parse().unwrap(),
            ProjectId::default(),
            "t",
            date(start),
            date(end),
        )
    }

    #[test]
    fn empty_has_no_window() {
        assert!(Timeline::from_tasks(&[], date("2024-01-01")).is_none());
    }

    #[test]
    fn window_pads_planned_range() {
        let tasks = vec![task("2024-01-10", "2024-01-20"), task("2024-01-05", "2024-01-12")];
        let timeline = Timeline::from_tasks(&tasks, date("2024-01-01")).unwrap();

        assert_eq!(timeline.start, date("2024-01-02"));
        assert_eq!(timeline.end, date("2024-01-30"));
        assert_eq!(timeline.days(), 29);
    }

    #[test]
    fn open_actual_run_extends_to_today() {
        let mut t = task("2024-01-10", "2024-01-12");
        t.actual_start_date = Some(date("2024-01-08"));
        let timeline = Timeline::from_tasks(&[t.clone()], date("2024-02-01")).unwrap();

        assert_eq!(timeline.start, date("2024-01-05"));
        assert_eq!(timeline.end, date("2024-02-11"));

        let actual = timeline.actual(&t, date("2024-02-01")).unwrap();
        assert_eq!(actual, Bar { offset_days: 3, span_days: 25 });
    }

    #[test]
    fn bars_span_at_least_one_day() {
        let timeline = Timeline {
            start: date("2024-01-01"),
            end: date("2024-01-31"),
        };
        assert_eq!(
            timeline.planned(&task("2024-01-03", "2024-01-03")),
            Bar { offset_days: 2, span_days: 1 }
        );
        assert_eq!(
            timeline.bar(date("2024-01-10"), date("2024-01-05")).span_days,
            1
        );
        assert!(timeline.actual(&task("2024-01-03", "2024-01-04"), date("2024-01-05")).is_none());
    }
}
