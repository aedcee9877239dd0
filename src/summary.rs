//! Daily summary aggregation and rendering
//!
//! Pure functions over event lists; no I/O. Categories are grouped by the
//! name stored on each event, counted, and sorted by count descending. The
//! sort is stable, so categories with equal counts keep the order in which
//! they first appeared in the input.

use chrono::{DateTime, Local};
use std::fmt::Write;

use crate::store::Event;

/// Grouping label for events whose category name is empty
pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug, Clone)]
pub struct CategorySummary {
    pub category_name: String,
    pub count: usize,
    pub events: Vec<Event>,
}

/// Derived view of one day's events; never persisted
#[derive(Debug, Clone)]
pub struct DailySummary {
    pub date: DateTime<Local>,
    pub categories: Vec<CategorySummary>,
    pub total_count: usize,
    pub first_at: Option<DateTime<Local>>,
    pub last_at: Option<DateTime<Local>>,
}

pub fn generate(events: &[Event]) -> DailySummary {
    if events.is_empty() {
        return DailySummary {
            date: Local::now(),
            categories: Vec::new(),
            total_count: 0,
            first_at: None,
            last_at: None,
        };
    }

    let mut first_at = events[0].captured_at;
    let mut last_at = events[0].captured_at;
    let mut categories: Vec<CategorySummary> = Vec::new();

    for event in events {
        first_at = first_at.min(event.captured_at);
        last_at = last_at.max(event.captured_at);

        let name = display_name(event);
        match categories.iter_mut().find(|c| c.category_name == name) {
            Some(category) => {
                category.count += 1;
                category.events.push(event.clone());
            }
            None => categories.push(CategorySummary {
                category_name: name.to_string(),
                count: 1,
                events: vec![event.clone()],
            }),
        }
    }

    categories.sort_by(|a, b| b.count.cmp(&a.count));

    DailySummary {
        date: events[0].captured_at.with_timezone(&Local),
        categories,
        total_count: events.len(),
        first_at: Some(first_at.with_timezone(&Local)),
        last_at: Some(last_at.with_timezone(&Local)),
    }
}

fn display_name(event: &Event) -> &str {
    if event.category_name.is_empty() {
        UNCATEGORIZED
    } else {
        &event.category_name
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    count as f64 / total as f64 * 100.0
}

impl DailySummary {
    /// Compact plain-text report
    pub fn format_text(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Daily Report - {}", self.date.format("%Y-%m-%d"));
        let _ = writeln!(out, "{}", "=".repeat(50));
        let _ = writeln!(out);
        let _ = writeln!(out, "Total Events: {}", self.total_count);
        let _ = writeln!(out);

        if let (Some(first), Some(last)) = (self.first_at, self.last_at) {
            let _ = writeln!(out, "First Classified: {}", first.format("%H:%M:%S"));
            let _ = writeln!(out, "Last Classified: {}", last.format("%H:%M:%S"));
            let _ = writeln!(out);
        }

        if self.categories.is_empty() {
            out.push_str("No events recorded.\n");
            return out;
        }

        let _ = writeln!(out, "Summary by Category:");
        let _ = writeln!(out, "{}", "-".repeat(50));
        for category in &self.categories {
            let _ = writeln!(
                out,
                "{}: {} events ({:.1}%)",
                category.category_name,
                category.count,
                percentage(category.count, self.total_count)
            );
        }

        out
    }

    /// Structured markdown report with a chronological event timeline
    pub fn format_markdown(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "# Daily Report - {}", self.date.format("%Y-%m-%d"));
        let _ = writeln!(out);
        let _ = writeln!(out, "**Total Events**: {}", self.total_count);
        let _ = writeln!(out);

        if let (Some(first), Some(last)) = (self.first_at, self.last_at) {
            let _ = writeln!(out, "**First Classified**: {}", first.format("%H:%M:%S"));
            let _ = writeln!(out, "**Last Classified**: {}", last.format("%H:%M:%S"));
            let _ = writeln!(out);
        }

        if self.categories.is_empty() {
            out.push_str("No events recorded.\n");
            return out;
        }

        let _ = writeln!(out, "## Summary by Category");
        let _ = writeln!(out);
        for category in &self.categories {
            let _ = writeln!(out, "### {}", category.category_name);
            let _ = writeln!(out, "- Count: {}", category.count);
            let _ = writeln!(
                out,
                "- Percentage: {:.1}%",
                percentage(category.count, self.total_count)
            );
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "## Timeline");
        let _ = writeln!(out);

        let mut timeline: Vec<&Event> = self
            .categories
            .iter()
            .flat_map(|c| c.events.iter())
            .collect();
        timeline.sort_by_key(|e| e.captured_at);

        for event in timeline {
            let name = display_name(event);
            let _ = writeln!(
                out,
                "- {} | **{}** | confidence: {:.2} | status: {}",
                event.captured_at.with_timezone(&Local).format("%H:%M:%S"),
                name,
                event.confidence,
                event.status
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EventStatus;
    use chrono::{TimeZone, Utc};

    fn event(id: &str, category: &str, hour: u32) -> Event {
        // build from local wall-clock time so the expected local date is fixed
        let captured_at = Local
            .with_ymd_and_hms(2025, 1, 1, hour, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        Event {
            id: id.to_string(),
            captured_at,
            category_name: category.to_string(),
            confidence: 0.8,
            status: EventStatus::Ok,
            agent_version: "gpt-4o".to_string(),
            screenshot_hash: "00".repeat(32),
            detected_apps: Vec::new(),
            detected_keywords: Vec::new(),
            notes: String::new(),
            created_at: captured_at,
        }
    }

    #[test]
    fn test_empty_input() {
        let summary = generate(&[]);
        assert_eq!(summary.total_count, 0);
        assert!(summary.categories.is_empty());
        assert!(summary.first_at.is_none());
        assert!(summary.last_at.is_none());
        assert!(summary.format_text().contains("No events recorded."));
    }

    #[test]
    fn test_counts_sum_to_total() {
        let events = vec![
            event("1", "Work", 9),
            event("2", "Browsing", 10),
            event("3", "Work", 11),
            event("4", "", 12),
        ];
        let summary = generate(&events);
        let sum: usize = summary.categories.iter().map(|c| c.count).sum();
        assert_eq!(sum, summary.total_count);
        assert_eq!(summary.total_count, 4);
    }

    #[test]
    fn test_first_and_last_bound_all_events() {
        let events = vec![
            event("1", "Work", 14),
            event("2", "Work", 8),
            event("3", "Rest", 19),
        ];
        let summary = generate(&events);
        let first = summary.first_at.unwrap();
        let last = summary.last_at.unwrap();
        for e in &events {
            let at = e.captured_at.with_timezone(&Local);
            assert!(first <= at && at <= last);
        }
    }

    #[test]
    fn test_work_and_uncategorized_scenario() {
        let events = vec![
            event("1", "Work", 9),
            event("2", "Work", 10),
            event("3", "", 11),
        ];
        let summary = generate(&events);

        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.categories.len(), 2);
        assert_eq!(summary.categories[0].category_name, "Work");
        assert_eq!(summary.categories[0].count, 2);
        assert_eq!(summary.categories[1].category_name, UNCATEGORIZED);
        assert_eq!(summary.categories[1].count, 1);

        let text = summary.format_text();
        assert!(text.contains("Work: 2 events (66.7%)"));
        assert!(text.contains("uncategorized: 1 events (33.3%)"));
    }

    #[test]
    fn test_equal_counts_keep_first_seen_order() {
        let events = vec![
            event("1", "Rest", 9),
            event("2", "Work", 10),
            event("3", "Rest", 11),
            event("4", "Work", 12),
        ];
        let summary = generate(&events);
        let names: Vec<&str> = summary
            .categories
            .iter()
            .map(|c| c.category_name.as_str())
            .collect();
        assert_eq!(names, vec!["Rest", "Work"]);
    }

    #[test]
    fn test_markdown_timeline_is_chronological() {
        let events = vec![
            event("1", "Work", 15),
            event("2", "Rest", 9),
            event("3", "Work", 12),
        ];
        let summary = generate(&events);
        let markdown = summary.format_markdown();

        let nine = events[1].captured_at.with_timezone(&Local);
        let noon = events[2].captured_at.with_timezone(&Local);
        let three = events[0].captured_at.with_timezone(&Local);

        let pos = |dt: &DateTime<Local>| {
            markdown
                .find(&format!("- {}", dt.format("%H:%M:%S")))
                .unwrap()
        };
        assert!(pos(&nine) < pos(&noon));
        assert!(pos(&noon) < pos(&three));
    }

    #[test]
    fn test_markdown_header_fields() {
        let events = vec![event("1", "Work", 9)];
        let summary = generate(&events);
        let markdown = summary.format_markdown();
        assert!(markdown.contains("# Daily Report - 2025-01-01"));
        assert!(markdown.contains("**Total Events**: 1"));
        assert!(markdown.contains("### Work"));
        assert!(markdown.contains("- Percentage: 100.0%"));
    }
}
