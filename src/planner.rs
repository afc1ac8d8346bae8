use chrono::{Local, NaiveDate};

use crate::error::{ScheduleError, SubjectField};
use crate::models::{
    DailyPlan, Priority, ScheduledChapter, StudyPlanRequest, StudyPlanResponse,
    UnscheduledChapter,
};

pub const EXAM_DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of "today" for the distributor.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Reads the local calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

struct SubjectInput<'a> {
    name: &'a str,
    chapters: &'a [String],
    exam_date: NaiveDate,
}

pub fn parse_exam_date(subject: &str, value: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(value, EXAM_DATE_FORMAT).map_err(|source| {
        ScheduleError::MalformedDate {
            subject: subject.to_string(),
            value: value.to_string(),
            source,
        }
    })
}

pub fn days_until_exam(exam_date: NaiveDate, today: NaiveDate) -> i64 {
    (exam_date - today).num_days()
}

/// Planned chapters per day, never below one.
pub fn chapters_per_day(chapter_count: usize, remaining_days: i64) -> usize {
    let days = usize::try_from(remaining_days).unwrap_or(0).max(1);
    (chapter_count / days).max(1)
}

/// Builds the study plan for `request` as seen from `today`.
///
/// Every subject is checked before anything is allocated, so a failure never
/// carries a partial plan. Subjects are then scheduled one after another in
/// urgency order, each starting from `today`.
pub fn distribute(
    request: &StudyPlanRequest,
    today: NaiveDate,
) -> Result<StudyPlanResponse, ScheduleError> {
    let mut present = Vec::with_capacity(request.subjects.len());
    for subject in &request.subjects {
        let chapters = match request.chapters.get(subject) {
            Some(chapters) if !chapters.is_empty() => chapters,
            _ => return Err(missing(subject, SubjectField::Chapters)),
        };
        let Some(raw_date) = request.exam_dates.get(subject) else {
            return Err(missing(subject, SubjectField::ExamDate));
        };
        present.push((subject, chapters, raw_date));
    }

    // Dates are parsed only once every subject is known to be complete.
    let mut inputs = Vec::with_capacity(present.len());
    for (subject, chapters, raw_date) in present {
        inputs.push(SubjectInput {
            name: subject,
            chapters,
            exam_date: parse_exam_date(subject, raw_date)?,
        });
    }

    let ordered = urgency_order(inputs, today);

    if let Some(expired) = ordered
        .iter()
        .find(|s| days_until_exam(s.exam_date, today) <= 0)
    {
        return Err(ScheduleError::ExpiredExam {
            subject: expired.name.to_string(),
            exam_date: expired.exam_date,
        });
    }

    let mut daily_plans = Vec::new();
    for (index, subject) in ordered.iter().enumerate() {
        let priority = if index == 0 {
            Priority::Urgent
        } else {
            Priority::Normal
        };
        daily_plans.extend(allocate_subject(
            subject,
            today,
            request.daily_hours,
            priority,
        )?);
    }

    let total_hours = daily_plans.iter().map(|plan| plan.total_hours).sum();
    let response = StudyPlanResponse {
        total_days: daily_plans.len(),
        total_hours,
        daily_plans,
        subjects_covered: ordered.iter().map(|s| s.name.to_string()).collect(),
    };

    tracing::info!(
        subjects = response.subjects_covered.len(),
        total_days = response.total_days,
        total_hours = response.total_hours,
        "study plan generated"
    );

    Ok(response)
}

/// Stable ascending sort by days left, so ties keep their input order.
fn urgency_order(mut subjects: Vec<SubjectInput<'_>>, today: NaiveDate) -> Vec<SubjectInput<'_>> {
    subjects.sort_by_key(|s| days_until_exam(s.exam_date, today));
    subjects
}

fn allocate_subject(
    subject: &SubjectInput<'_>,
    today: NaiveDate,
    daily_hours: u32,
    priority: Priority,
) -> Result<Vec<DailyPlan>, ScheduleError> {
    let remaining_days = days_until_exam(subject.exam_date, today);
    let per_day = chapters_per_day(subject.chapters.len(), remaining_days);
    // Same share on every day, including a short last one.
    let share = f64::from(daily_hours) / per_day as f64;

    let mut plans = Vec::new();
    let mut current = today;
    for day in subject.chapters.chunks(per_day) {
        if current >= subject.exam_date {
            break;
        }

        let chapters: Vec<ScheduledChapter> = day
            .iter()
            .map(|name| ScheduledChapter {
                name: name.clone(),
                subject: subject.name.to_string(),
                estimated_hours: share,
                priority,
            })
            .collect();
        let total_hours = chapters.iter().map(|c| c.estimated_hours).sum();
        plans.push(DailyPlan {
            date: current,
            chapters,
            total_hours,
        });

        current = current.succ_opt().ok_or_else(|| {
            ScheduleError::UnexpectedFailure(format!(
                "calendar overflow while scheduling {}",
                subject.name
            ))
        })?;
    }

    let scheduled: usize = plans.iter().map(|p| p.chapters.len()).sum();
    let dropped = subject.chapters.len() - scheduled;
    if dropped > 0 {
        tracing::warn!(
            subject = subject.name,
            dropped,
            exam_date = %subject.exam_date,
            "chapters did not fit before the exam and were left out"
        );
    }
    tracing::debug!(
        subject = subject.name,
        remaining_days,
        chapters_per_day = per_day,
        days = plans.len(),
        "subject allocated"
    );

    Ok(plans)
}

/// Chapters from `request` that `response` never scheduled.
///
/// Chapters are placed in order, so whatever a subject lost is the tail of
/// its list.
pub fn unscheduled_chapters(
    request: &StudyPlanRequest,
    response: &StudyPlanResponse,
) -> Vec<UnscheduledChapter> {
    let mut dropped = Vec::new();
    for subject in &response.subjects_covered {
        let Some(chapters) = request.chapters.get(subject) else {
            continue;
        };
        let scheduled = response
            .daily_plans
            .iter()
            .flat_map(|plan| plan.chapters.iter())
            .filter(|chapter| &chapter.subject == subject)
            .count();
        dropped.extend(chapters.iter().skip(scheduled).map(|name| UnscheduledChapter {
            subject: subject.clone(),
            name: name.clone(),
        }));
    }
    dropped
}

fn missing(subject: &str, field: SubjectField) -> ScheduleError {
    ScheduleError::MissingSubjectData {
        subject: subject.to_string(),
        field,
    }
}
