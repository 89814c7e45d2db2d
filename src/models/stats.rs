use chrono::NaiveDate;

use super::Project;

/// Totals shown in the dashboard's chart panel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectStats {
    pub total: usize,
    pub finished: usize,
    pub open: usize,
    pub total_price: f64,
    pub open_price: f64,
    pub average_achievements: f64,
}

impl ProjectStats {
    pub fn from_projects(projects: &[Project]) -> Self {
        let total = projects.len();
        let finished = projects.iter().filter(|p| p.finished).count();
        let total_price = projects.iter().map(|p| p.price).sum();
        let open_price = projects
            .iter()
            .filter(|p| !p.finished)
            .map(|p| p.price)
            .sum();
        let average_achievements = if total == 0 {
            0.0
        } else {
            projects.iter().map(|p| p.achievements).sum::<f64>() / total as f64
        };

        Self {
            total,
            finished,
            open: total - finished,
            total_price,
            open_price,
            average_achievements,
        }
    }

    /// Share of finished projects, 0.0 when there are none
    pub fn completion_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.finished as f64 / self.total as f64
        }
    }
}

/// An open project on the dashboard calendar
#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingDeadline<'a> {
    pub project: &'a Project,
    pub date: NaiveDate,
    /// Negative once the deadline has passed
    pub days_left: i64,
}

/// Open projects with a `YYYY-MM-DD` deadline, soonest first
pub fn upcoming_deadlines(projects: &[Project], today: NaiveDate, limit: usize) -> Vec<UpcomingDeadline<'_>> {
    let mut upcoming: Vec<UpcomingDeadline<'_>> = projects
        .iter()
        .filter(|p| !p.finished)
        .filter_map(|project| {
            let date = NaiveDate::parse_from_str(&project.deadline, "%Y-%m-%d").ok()?;
            Some(UpcomingDeadline {
                project,
                date,
                days_left: (date - today).num_days(),
            })
        })
        .collect();

    upcoming.sort_by_key(|d| (d.date, d.project.id));
    upcoming.truncate(limit);
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: i64, deadline: &str, achievements: f64, price: f64, finished: bool) -> Project {
        Project {
            id,
            title: format!("Project {id}"),
            description: String::new(),
            deadline: deadline.into(),
            person: "Alice".into(),
            client: String::new(),
            contact: String::new(),
            achievements,
            price,
            finished,
        }
    }

    #[test]
    fn stats_split_open_and_finished() {
        let projects = vec![
            project(1, "2024-12-01", 100.0, 1000.0, true),
            project(2, "2024-12-15", 50.0, 500.0, false),
            project(3, "2025-01-10", 0.0, 250.0, false),
        ];
        let stats = ProjectStats::from_projects(&projects);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.finished, 1);
        assert_eq!(stats.open, 2);
        assert_eq!(stats.total_price, 1750.0);
        assert_eq!(stats.open_price, 750.0);
        assert_eq!(stats.average_achievements, 50.0);
        assert!((stats.completion_ratio() - 1.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stats_of_nothing_are_zero() {
        let stats = ProjectStats::from_projects(&[]);
        assert_eq!(stats, ProjectStats::default());
        assert_eq!(stats.completion_ratio(), 0.0);
    }

    #[test]
    fn deadlines_are_sorted_and_skip_finished_or_unparseable() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 10).unwrap();
        let projects = vec![
            project(1, "2024-12-20", 0.0, 0.0, false),
            project(2, "2024-12-01", 0.0, 0.0, false),
            project(3, "2024-12-11", 0.0, 0.0, true),
            project(4, "next week", 0.0, 0.0, false),
            project(5, "2025-02-01", 0.0, 0.0, false),
        ];

        let upcoming = upcoming_deadlines(&projects, today, 2);
        let ids: Vec<i64> = upcoming.iter().map(|d| d.project.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(upcoming[0].days_left, -9);
        assert_eq!(upcoming[1].days_left, 10);
    }
}
