use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct StudyPlanRequest {
    pub subjects: Vec<String>,
    pub chapters: HashMap<String, Vec<String>>,
    pub exam_dates: HashMap<String, String>,
    pub daily_hours: u32,
}

/// Only the subject with the nearest exam is `Urgent`; everything else is `Normal`.
///
/// On the wire this is the integer tier, `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum Priority {
    Urgent,
    Normal,
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Urgent => 1,
            Priority::Normal => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledChapter {
    pub name: String,
    pub subject: String,
    pub estimated_hours: f64,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPlan {
    pub date: NaiveDate,
    pub chapters: Vec<ScheduledChapter>,
    pub total_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyPlanResponse {
    pub daily_plans: Vec<DailyPlan>,
    pub total_days: usize,
    pub total_hours: f64,
    pub subjects_covered: Vec<String>,
}

/// A chapter that was supplied but did not fit before its exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnscheduledChapter {
    pub subject: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct SubjectSummary {
    pub subject: String,
    pub days: usize,
    pub chapter_count: usize,
    pub hours: f64,
    pub priority: Priority,
}
