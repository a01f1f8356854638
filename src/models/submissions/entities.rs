use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 提交状态
///
/// 只在创建时根据提交时间与截止时间计算一次，之后不再重算。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "submission.ts")]
pub enum SubmissionStatus {
    OnTime,
    Late,
}

impl SubmissionStatus {
    pub const ON_TIME: &'static str = "on_time";
    pub const LATE: &'static str = "late";

    /// 恰好等于截止时间仍算按时
    pub fn classify(submitted_at: DateTime<Utc>, deadline: DateTime<Utc>) -> Self {
        if submitted_at > deadline {
            SubmissionStatus::Late
        } else {
            SubmissionStatus::OnTime
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::OnTime => Self::ON_TIME,
            SubmissionStatus::Late => Self::LATE,
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::ON_TIME => Ok(SubmissionStatus::OnTime),
            Self::LATE => Ok(SubmissionStatus::Late),
            _ => Err(format!("Invalid submission status: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
    // 作业文件的访问地址
    pub artifact_ref: String,
    pub grade: Option<f64>,
    pub feedback: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_classify_boundary() {
        let deadline = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(
            SubmissionStatus::classify(deadline, deadline),
            SubmissionStatus::OnTime
        );
        assert_eq!(
            SubmissionStatus::classify(deadline + Duration::seconds(1), deadline),
            SubmissionStatus::Late
        );
        assert_eq!(
            SubmissionStatus::classify(deadline - Duration::days(3), deadline),
            SubmissionStatus::OnTime
        );
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(SubmissionStatus::OnTime.to_string(), "on_time");
        assert_eq!("late".parse::<SubmissionStatus>(), Ok(SubmissionStatus::Late));
        assert!("graded".parse::<SubmissionStatus>().is_err());
    }
}
