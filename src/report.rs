use std::collections::BTreeMap;
use std::fmt::Write;

use crate::models::{Priority, StudyPlanResponse, SubjectSummary, UnscheduledChapter};

pub fn summarize_by_subject(plan: &StudyPlanResponse) -> Vec<SubjectSummary> {
    let mut summaries: Vec<SubjectSummary> = plan
        .subjects_covered
        .iter()
        .enumerate()
        .map(|(index, subject)| SubjectSummary {
            subject: subject.clone(),
            days: 0,
            chapter_count: 0,
            hours: 0.0,
            priority: if index == 0 {
                Priority::Urgent
            } else {
                Priority::Normal
            },
        })
        .collect();

    for day in &plan.daily_plans {
        let Some(subject) = day.chapters.first().map(|c| c.subject.as_str()) else {
            continue;
        };
        if let Some(summary) = summaries.iter_mut().find(|s| s.subject == subject) {
            summary.days += 1;
            summary.chapter_count += day.chapters.len();
            summary.hours += day.total_hours;
        }
    }

    summaries
}

pub fn build_report(plan: &StudyPlanResponse, unscheduled: &[UnscheduledChapter]) -> String {
    let summaries = summarize_by_subject(plan);

    let mut output = String::new();

    let _ = writeln!(output, "# Study Plan");
    let _ = writeln!(
        output,
        "{} study days, {:.1} hours in total",
        plan.total_days, plan.total_hours
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Subjects");

    if summaries.is_empty() {
        let _ = writeln!(output, "No subjects scheduled.");
    } else {
        for (rank, summary) in summaries.iter().enumerate() {
            let _ = writeln!(
                output,
                "{}. {}{}: {} chapters over {} days ({:.1} hours)",
                rank + 1,
                summary.subject,
                priority_marker(summary.priority),
                summary.chapter_count,
                summary.days,
                summary.hours
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Schedule");

    if plan.daily_plans.is_empty() {
        let _ = writeln!(output, "Nothing to study.");
    } else {
        let _ = writeln!(output, "| Date | Subject | Chapter | Hours |");
        let _ = writeln!(output, "|------|---------|---------|------:|");
        for day in &plan.daily_plans {
            for chapter in &day.chapters {
                let _ = writeln!(
                    output,
                    "| {} | {}{} | {} | {:.1} |",
                    day.date.format("%b %d, %Y"),
                    chapter.subject,
                    priority_marker(chapter.priority),
                    chapter.name,
                    chapter.estimated_hours
                );
            }
        }
    }

    // Subjects run on independent calendars; merge them by date here.
    let mut calendar = BTreeMap::new();
    for day in &plan.daily_plans {
        calendar
            .entry(day.date)
            .or_insert_with(Vec::new)
            .extend(day.chapters.iter());
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Calendar");

    if calendar.is_empty() {
        let _ = writeln!(output, "No study days.");
    } else {
        for (date, chapters) in &calendar {
            let hours: f64 = chapters.iter().map(|c| c.estimated_hours).sum();
            let _ = writeln!(output, "- {} ({:.1} hours)", date.format("%a %b %d"), hours);
            for chapter in chapters {
                let _ = writeln!(output, "  - {}: {}", chapter.subject, chapter.name);
            }
        }
    }

    if !unscheduled.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Unscheduled Chapters");
        let _ = writeln!(
            output,
            "These chapters did not fit before their exam date."
        );
        for chapter in unscheduled {
            let _ = writeln!(output, "- {}: {}", chapter.subject, chapter.name);
        }
    }

    output
}

fn priority_marker(priority: Priority) -> &'static str {
    match priority {
        Priority::Urgent => " (urgent)",
        Priority::Normal => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyPlan, ScheduledChapter};
    use chrono::NaiveDate;

    fn chapter(name: &str, subject: &str, hours: f64, priority: Priority) -> ScheduledChapter {
        ScheduledChapter {
            name: name.to_string(),
            subject: subject.to_string(),
            estimated_hours: hours,
            priority,
        }
    }

    fn sample_plan() -> StudyPlanResponse {
        let day1 = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2026, 3, 11).unwrap();
        let daily_plans = vec![
            DailyPlan {
                date: day1,
                chapters: vec![
                    chapter("Mechanics", "Physics", 2.0, Priority::Urgent),
                    chapter("Optics", "Physics", 2.0, Priority::Urgent),
                ],
                total_hours: 4.0,
            },
            DailyPlan {
                date: day1,
                chapters: vec![chapter("Calculus", "Math", 4.0, Priority::Normal)],
                total_hours: 4.0,
            },
            DailyPlan {
                date: day2,
                chapters: vec![chapter("Algebra", "Math", 4.0, Priority::Normal)],
                total_hours: 4.0,
            },
        ];
        StudyPlanResponse {
            total_days: daily_plans.len(),
            total_hours: 12.0,
            daily_plans,
            subjects_covered: vec!["Physics".to_string(), "Math".to_string()],
        }
    }

    #[test]
    fn summaries_follow_urgency_order() {
        let summaries = summarize_by_subject(&sample_plan());
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].subject, "Physics");
        assert_eq!(summaries[0].priority, Priority::Urgent);
        assert_eq!(summaries[0].days, 1);
        assert_eq!(summaries[0].chapter_count, 2);
        assert_eq!(summaries[1].subject, "Math");
        assert_eq!(summaries[1].days, 2);
        assert!((summaries[1].hours - 8.0).abs() < 0.001);
    }

    #[test]
    fn report_lists_schedule_and_merged_calendar() {
        let report = build_report(&sample_plan(), &[]);
        assert!(report.contains("3 study days, 12.0 hours in total"));
        assert!(report.contains("1. Physics (urgent): 2 chapters over 1 days"));
        assert!(report.contains("| Mar 10, 2026 | Math | Calculus | 4.0 |"));
        assert!(report.contains("- Tue Mar 10 (8.0 hours)"));
        assert!(!report.contains("Unscheduled Chapters"));
    }

    #[test]
    fn report_flags_unscheduled_chapters() {
        let unscheduled = vec![UnscheduledChapter {
            subject: "Math".to_string(),
            name: "Statistics".to_string(),
        }];
        let report = build_report(&sample_plan(), &unscheduled);
        assert!(report.contains("## Unscheduled Chapters"));
        assert!(report.contains("- Math: Statistics"));
    }
}
