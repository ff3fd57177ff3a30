//! Ticket analytics for the dashboard.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Branch, Priority, SlaHours, Ticket, TicketStatus};

/// Time range for report queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    Last24h,
    #[default]
    Last7d,
    Last30d,
    Last90d,
    Last365d,
}

impl TimeRange {
    pub fn hours(&self) -> i64 {
        match self {
            TimeRange::Last24h => 24,
            TimeRange::Last7d => 24 * 7,
            TimeRange::Last30d => 24 * 30,
            TimeRange::Last90d => 24 * 90,
            TimeRange::Last365d => 24 * 365,
        }
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        Utc::now() - chrono::Duration::hours(self.hours())
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "24h" | "last24h" => Ok(TimeRange::Last24h),
            "7d" | "last7d" => Ok(TimeRange::Last7d),
            "30d" | "last30d" => Ok(TimeRange::Last30d),
            "90d" | "last90d" => Ok(TimeRange::Last90d),
            "365d" | "1y" | "last365d" => Ok(TimeRange::Last365d),
            _ => Err(format!(
                "Invalid time range: {}. Use 24h, 7d, 30d, 90d, or 365d",
                s
            )),
        }
    }
}

/// Count for one bucket of a breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CountPoint {
    pub key: String,
    pub count: i64,
    /// Percentage of the report total (0-100).
    pub percentage: f64,
}

/// Per-branch ticket load.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BranchLoad {
    pub branch_id: Uuid,
    pub branch_name: String,
    pub total: i64,
    /// Tickets still open, in progress, or on hold.
    pub active: i64,
}

/// Aggregated ticket report.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketReport {
    pub range: TimeRange,
    pub total: i64,
    pub by_status: Vec<CountPoint>,
    pub by_priority: Vec<CountPoint>,
    /// Sorted by total, busiest first.
    pub by_branch: Vec<BranchLoad>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_resolution_hours: Option<f64>,
    /// Active tickets older than their priority's SLA.
    pub overdue: i64,
}

impl TicketReport {
    /// Build the report from the tickets filed within `range`. `active`
    /// holds every unfinished ticket regardless of age; only `overdue`
    /// reads it.
    pub fn build(
        range: TimeRange,
        tickets: &[Ticket],
        active: &[Ticket],
        branches: &[Branch],
        sla: &SlaHours,
        now: DateTime<Utc>,
    ) -> Self {
        let total = tickets.len() as i64;

        let by_status = TicketStatus::ALL
            .iter()
            .map(|status| {
                let count = tickets.iter().filter(|t| t.status == *status).count() as i64;
                count_point(status.to_string(), count, total)
            })
            .collect();

        let by_priority = Priority::ALL
            .iter()
            .map(|priority| {
                let count = tickets.iter().filter(|t| t.priority == *priority).count() as i64;
                count_point(priority.to_string(), count, total)
            })
            .collect();

        let names: HashMap<Uuid, &str> = branches.iter().map(|b| (b.id, b.name.as_str())).collect();
        let mut loads: HashMap<Uuid, BranchLoad> = HashMap::new();
        for ticket in tickets {
            let load = loads.entry(ticket.branch_id).or_insert_with(|| BranchLoad {
                branch_id: ticket.branch_id,
                branch_name: names
                    .get(&ticket.branch_id)
                    .map(|n| n.to_string())
                    .unwrap_or_default(),
                total: 0,
                active: 0,
            });
            load.total += 1;
            if ticket.status.is_active() {
                load.active += 1;
            }
        }
        let mut by_branch: Vec<BranchLoad> = loads.into_values().collect();
        by_branch.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.branch_name.cmp(&b.branch_name)));

        let resolution: Vec<f64> = tickets.iter().filter_map(Ticket::resolution_hours).collect();
        let average_resolution_hours = if resolution.is_empty() {
            None
        } else {
            Some(resolution.iter().sum::<f64>() / resolution.len() as f64)
        };

        let overdue = active
            .iter()
            .filter(|t| t.status.is_active())
            .filter(|t| (now - t.created_at).num_hours() > sla.for_priority(t.priority))
            .count() as i64;

        Self {
            range,
            total,
            by_status,
            by_priority,
            by_branch,
            average_resolution_hours,
            overdue,
        }
    }
}

fn count_point(key: String, count: i64, total: i64) -> CountPoint {
    let percentage = if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    };
    CountPoint {
        key,
        count,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewBranch, NewTicket};

    fn ticket(branch: Uuid, priority: Priority, age_hours: i64) -> Ticket {
        let mut t = Ticket::new(
            NewTicket {
                title: "عطل".into(),
                description: None,
                branch_id: branch,
                asset_id: None,
                category: None,
                priority: Some(priority),
            },
            Uuid::new_v4(),
            Priority::Medium,
        );
        t.created_at = Utc::now() - chrono::Duration::hours(age_hours);
        t
    }

    #[test]
    fn test_report_counts() {
        let a = Branch::new(NewBranch {
            name: "فرع أ".into(),
            ..Default::default()
        });
        let b = Branch::new(NewBranch {
            name: "فرع ب".into(),
            ..Default::default()
        });

        let mut resolved = ticket(a.id, Priority::Low, 10);
        resolved.status = TicketStatus::Resolved;
        resolved.resolved_at = Some(resolved.created_at + chrono::Duration::hours(4));

        let tickets = vec![
            ticket(a.id, Priority::Critical, 5), // overdue: 5h > 4h
            ticket(a.id, Priority::High, 1),
            ticket(b.id, Priority::Medium, 1),
            resolved,
        ];

        let report = TicketReport::build(
            TimeRange::Last7d,
            &tickets,
            &tickets,
            &[a.clone(), b],
            &SlaHours::default(),
            Utc::now(),
        );

        assert_eq!(report.total, 4);
        assert_eq!(report.overdue, 1);
        assert_eq!(report.by_branch[0].branch_id, a.id);
        assert_eq!(report.by_branch[0].total, 3);
        assert_eq!(report.by_branch[0].active, 2);
        let open = report.by_status.iter().find(|p| p.key == "open").unwrap();
        assert_eq!(open.count, 3);
        assert!((open.percentage - 75.0).abs() < 1e-9);
        assert!((report.average_resolution_hours.unwrap() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_report() {
        let report = TicketReport::build(
            TimeRange::default(),
            &[],
            &[],
            &[],
            &SlaHours::default(),
            Utc::now(),
        );
        assert_eq!(report.total, 0);
        assert!(report.average_resolution_hours.is_none());
        assert!(report.by_status.iter().all(|p| p.percentage == 0.0));
    }

    #[test]
    fn test_overdue_counts_tickets_older_than_range() {
        let branch = Branch::new(NewBranch {
            name: "فرع ج".into(),
            ..Default::default()
        });
        let stale = ticket(branch.id, Priority::Critical, 24 * 10);

        let report = TicketReport::build(
            TimeRange::Last7d,
            &[],
            &[stale],
            &[branch],
            &SlaHours::default(),
            Utc::now(),
        );

        assert_eq!(report.total, 0);
        assert_eq!(report.overdue, 1);
        assert!(report.by_branch.is_empty());
    }

    #[test]
    fn test_time_range_parse() {
        assert_eq!("30d".parse::<TimeRange>().unwrap(), TimeRange::Last30d);
        assert!("2w".parse::<TimeRange>().is_err());
    }
}
