use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{bail, Context};

use crate::error::ScheduleError;
use crate::models::StudyPlanRequest;

pub const MAX_DAILY_HOURS: u32 = 24;

/// Rejects requests that are structurally unusable before they reach the planner.
pub fn validate_request(request: &StudyPlanRequest) -> Result<(), ScheduleError> {
    if request.subjects.is_empty() {
        return Err(ScheduleError::InvalidRequest(
            "at least one subject is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for subject in &request.subjects {
        if !seen.insert(subject.as_str()) {
            return Err(ScheduleError::InvalidRequest(format!(
                "subject {subject} is listed more than once"
            )));
        }
    }

    if !(1..=MAX_DAILY_HOURS).contains(&request.daily_hours) {
        return Err(ScheduleError::InvalidRequest(format!(
            "daily_hours must be between 1 and {MAX_DAILY_HOURS}, got {}",
            request.daily_hours
        )));
    }

    Ok(())
}

pub fn load_json(path: &Path) -> anyhow::Result<StudyPlanRequest> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let request: StudyPlanRequest = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse study plan request in {}", path.display()))?;
    Ok(request)
}

/// Reads `subject,chapter,exam_date` rows into a request.
///
/// Subjects keep the order they first appear in; chapters keep row order.
pub fn load_csv(path: &Path, daily_hours: u32) -> anyhow::Result<StudyPlanRequest> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        subject: String,
        chapter: String,
        exam_date: String,
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut subjects = Vec::new();
    let mut chapters: HashMap<String, Vec<String>> = HashMap::new();
    let mut exam_dates: HashMap<String, String> = HashMap::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("bad row {} in {}", index + 1, path.display()))?;
        let subject = row.subject.trim().to_string();
        let chapter = row.chapter.trim().to_string();
        let exam_date = row.exam_date.trim().to_string();

        if subject.is_empty() || chapter.is_empty() {
            bail!(
                "row {} in {} needs both a subject and a chapter",
                index + 1,
                path.display()
            );
        }

        match exam_dates.get(&subject) {
            Some(existing) if *existing != exam_date => {
                bail!(
                    "subject {subject} has conflicting exam dates {existing} and {exam_date}"
                );
            }
            Some(_) => {}
            None => {
                subjects.push(subject.clone());
                exam_dates.insert(subject.clone(), exam_date);
            }
        }

        chapters.entry(subject).or_default().push(chapter);
    }

    tracing::debug!(
        subjects = subjects.len(),
        path = %path.display(),
        "loaded study plan request from csv"
    );

    Ok(StudyPlanRequest {
        subjects,
        chapters,
        exam_dates,
        daily_hours,
    })
}
