use std::fmt;

use chrono::NaiveDate;

/// Which per-subject entry a request left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectField {
    Chapters,
    ExamDate,
}

impl fmt::Display for SubjectField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectField::Chapters => f.write_str("chapters"),
            SubjectField::ExamDate => f.write_str("exam date"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("no {field} provided for subject: {subject}")]
    MissingSubjectData { subject: String, field: SubjectField },
    #[error("exam date for {subject} ({exam_date}) has already passed")]
    ExpiredExam { subject: String, exam_date: NaiveDate },
    #[error("exam date {value:?} for {subject} is not a YYYY-MM-DD date")]
    MalformedDate {
        subject: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("unexpected scheduling failure: {0}")]
    UnexpectedFailure(String),
}

impl ScheduleError {
    /// Whether the caller sent something wrong, as opposed to the planner failing.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ScheduleError::UnexpectedFailure(_))
    }

    pub fn subject(&self) -> Option<&str> {
        match self {
            ScheduleError::MissingSubjectData { subject, .. }
            | ScheduleError::ExpiredExam { subject, .. }
            | ScheduleError::MalformedDate { subject, .. } => Some(subject),
            ScheduleError::InvalidRequest(_) | ScheduleError::UnexpectedFailure(_) => None,
        }
    }
}
