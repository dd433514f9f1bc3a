//! Job-application records and the payloads that create and update them.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Statuses an application can be in, in pipeline order.
pub const STATUS_OPTIONS: [&str; 6] = [
    "Applied",
    "Screening",
    "Interviewing",
    "Offer",
    "Rejected",
    "Withdrawn",
];

/// Status assumed when none is given.
pub const DEFAULT_STATUS: &str = "Applied";

const BASE_POINTS: i64 = 10;
const TAILORED_BONUS: i64 = 5;
const REFERRAL_BONUS: i64 = 7;

/// Whether `status` is one of [`STATUS_OPTIONS`].
pub fn is_known_status(status: &str) -> bool {
    STATUS_OPTIONS.contains(&status)
}

/// Points awarded for a new application.
pub fn calculate_points(is_tailored: bool, has_referral: bool) -> i64 {
    let mut points = BASE_POINTS;
    if is_tailored {
        points += TAILORED_BONUS;
    }
    if has_referral {
        points += REFERRAL_BONUS;
    }
    points
}

/// One job application.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub job_title: String,
    pub company_name: String,
    pub points_earned: i64,
    #[serde(default)]
    pub is_tailored: bool,
    #[serde(default)]
    pub has_referral: bool,
    /// Date applied.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub follow_up_date: String,
    #[serde(default)]
    pub interview_date: String,
    #[serde(default)]
    pub job_link: String,
    #[serde(default)]
    pub notes: String,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

/// Every record in the file plus the derived running total.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub applications: Vec<Record>,
    pub total_score: i64,
}

impl Listing {
    /// Build a listing, deriving the total from the records.
    pub fn new(applications: Vec<Record>) -> Self {
        let total_score = applications
            .iter()
            .fold(0i64, |total, r| total.saturating_add(r.points_earned));
        Self {
            applications,
            total_score,
        }
    }
}

/// Create payload. Required fields are optional here so that missing ones
/// surface as validation errors instead of deserialization failures.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    pub id: Option<String>,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub points_earned: Option<i64>,
    pub is_tailored: Option<bool>,
    pub has_referral: Option<bool>,
    pub timestamp: Option<String>,
    pub status: Option<String>,
    pub follow_up_date: Option<String>,
    pub interview_date: Option<String>,
    pub job_link: Option<String>,
    pub notes: Option<String>,
}

impl NewRecord {
    /// Validate required fields and fill defaults.
    pub fn into_record(self) -> Result<Record> {
        let id = required(self.id, "id")?;
        let job_title = required(self.job_title, "jobTitle")?;
        let company_name = required(self.company_name, "companyName")?;
        let points_earned = self
            .points_earned
            .ok_or_else(|| Error::Validation("missing required field: pointsEarned".to_string()))?;

        let status = match self.status {
            Some(s) if !s.is_empty() => check_status(s)?,
            _ => default_status(),
        };

        Ok(Record {
            id,
            job_title,
            company_name,
            points_earned,
            is_tailored: self.is_tailored.unwrap_or(false),
            has_referral: self.has_referral.unwrap_or(false),
            timestamp: self.timestamp.unwrap_or_default(),
            status,
            follow_up_date: self.follow_up_date.unwrap_or_default(),
            interview_date: self.interview_date.unwrap_or_default(),
            job_link: self.job_link.unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
        })
    }
}

impl From<Record> for NewRecord {
    fn from(record: Record) -> Self {
        Self {
            id: Some(record.id),
            job_title: Some(record.job_title),
            company_name: Some(record.company_name),
            points_earned: Some(record.points_earned),
            is_tailored: Some(record.is_tailored),
            has_referral: Some(record.has_referral),
            timestamp: Some(record.timestamp),
            status: Some(record.status),
            follow_up_date: Some(record.follow_up_date),
            interview_date: Some(record.interview_date),
            job_link: Some(record.job_link),
            notes: Some(record.notes),
        }
    }
}

/// Update payload: keys that are present replace the stored values,
/// absent keys keep them.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_earned: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_tailored: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_referral: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RecordPatch {
    /// Empty patch addressed at `id`.
    pub fn for_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Check the patch targets `id` and carries acceptable values.
    pub fn validate(&self, id: &str) -> Result<()> {
        if self.id.as_deref() != Some(id) {
            return Err(Error::Validation(format!(
                "application id mismatch: path has '{}', body has {:?}",
                id, self.id
            )));
        }
        if matches!(self.job_title.as_deref(), Some("")) {
            return Err(Error::Validation("jobTitle must not be empty".to_string()));
        }
        if matches!(self.company_name.as_deref(), Some("")) {
            return Err(Error::Validation("companyName must not be empty".to_string()));
        }
        if let Some(status) = self.status.as_deref() {
            if !status.is_empty() && !is_known_status(status) {
                return Err(unknown_status(status));
            }
        }
        Ok(())
    }

    /// Shallow merge of this patch over `existing`.
    pub fn apply(&self, existing: &Record) -> Record {
        let mut merged = existing.clone();
        if let Some(v) = &self.job_title {
            merged.job_title = v.clone();
        }
        if let Some(v) = &self.company_name {
            merged.company_name = v.clone();
        }
        if let Some(v) = self.points_earned {
            merged.points_earned = v;
        }
        if let Some(v) = self.is_tailored {
            merged.is_tailored = v;
        }
        if let Some(v) = self.has_referral {
            merged.has_referral = v;
        }
        if let Some(v) = &self.timestamp {
            merged.timestamp = v.clone();
        }
        if let Some(v) = &self.status {
            merged.status = if v.is_empty() {
                default_status()
            } else {
                v.clone()
            };
        }
        if let Some(v) = &self.follow_up_date {
            merged.follow_up_date = v.clone();
        }
        if let Some(v) = &self.interview_date {
            merged.interview_date = v.clone();
        }
        if let Some(v) = &self.job_link {
            merged.job_link = v.clone();
        }
        if let Some(v) = &self.notes {
            merged.notes = v.clone();
        }
        merged
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::Validation(format!("missing required field: {}", field))),
    }
}

fn check_status(status: String) -> Result<String> {
    if is_known_status(&status) {
        Ok(status)
    } else {
        Err(unknown_status(&status))
    }
}

fn unknown_status(status: &str) -> Error {
    Error::Validation(format!(
        "unknown status '{}', expected one of: {}",
        status,
        STATUS_OPTIONS.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        NewRecord {
            id: Some("1".to_string()),
            job_title: Some("Eng".to_string()),
            company_name: Some("Acme".to_string()),
            points_earned: Some(10),
            ..NewRecord::default()
        }
        .into_record()
        .unwrap()
    }

    #[test]
    fn test_points_rule() {
        assert_eq!(calculate_points(false, false), 10);
        assert_eq!(calculate_points(true, false), 15);
        assert_eq!(calculate_points(false, true), 17);
        assert_eq!(calculate_points(true, true), 22);
    }

    #[test]
    fn test_new_record_defaults() {
        let record = sample();
        assert_eq!(record.status, "Applied");
        assert!(!record.is_tailored);
        assert!(!record.has_referral);
        assert_eq!(record.notes, "");
        assert_eq!(record.follow_up_date, "");
    }

    #[test]
    fn test_new_record_missing_fields() {
        let missing_company = NewRecord {
            id: Some("1".to_string()),
            job_title: Some("Eng".to_string()),
            points_earned: Some(10),
            ..NewRecord::default()
        };
        let err = missing_company.into_record().unwrap_err();
        assert!(err.to_string().contains("companyName"));

        let missing_points = NewRecord {
            id: Some("1".to_string()),
            job_title: Some("Eng".to_string()),
            company_name: Some("Acme".to_string()),
            ..NewRecord::default()
        };
        assert!(matches!(
            missing_points.into_record(),
            Err(Error::Validation(_))
        ));

        let blank_id = NewRecord {
            id: Some("  ".to_string()),
            ..NewRecord::from(sample())
        };
        assert!(matches!(blank_id.into_record(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_new_record_rejects_unknown_status() {
        let input = NewRecord {
            status: Some("Ghosted".to_string()),
            ..NewRecord::from(sample())
        };
        assert!(matches!(input.into_record(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_patch_merge_keeps_unset_fields() {
        let existing = Record {
            notes: "met at meetup".to_string(),
            ..sample()
        };
        let patch = RecordPatch {
            status: Some("Offer".to_string()),
            ..RecordPatch::for_id("1")
        };

        let merged = patch.apply(&existing);
        assert_eq!(merged.status, "Offer");
        assert_eq!(merged.notes, "met at meetup");
        assert_eq!(merged.job_title, existing.job_title);
        assert_eq!(merged.points_earned, existing.points_earned);
    }

    #[test]
    fn test_patch_validate() {
        assert!(RecordPatch::for_id("1").validate("1").is_ok());
        assert!(RecordPatch::for_id("2").validate("1").is_err());
        assert!(RecordPatch::default().validate("1").is_err());

        let bad_status = RecordPatch {
            status: Some("Ghosted".to_string()),
            ..RecordPatch::for_id("1")
        };
        assert!(bad_status.validate("1").is_err());
    }

    #[test]
    fn test_patch_deserializes_camel_case() {
        let patch: RecordPatch =
            serde_json::from_str(r#"{"id": "1", "status": "Offer", "interviewDate": "2024-05-01"}"#)
                .unwrap();
        assert_eq!(patch.status.as_deref(), Some("Offer"));
        assert_eq!(patch.interview_date.as_deref(), Some("2024-05-01"));
        assert!(patch.notes.is_none());
    }

    #[test]
    fn test_patch_empty_status_becomes_default() {
        let existing = Record {
            status: "Screening".to_string(),
            ..sample()
        };
        let patch = RecordPatch {
            status: Some(String::new()),
            ..RecordPatch::for_id("1")
        };
        assert!(patch.validate("1").is_ok());
        assert_eq!(patch.apply(&existing).status, DEFAULT_STATUS);
    }

    #[test]
    fn test_listing_total_saturates() {
        let big = Record {
            points_earned: i64::MAX,
            ..sample()
        };
        let listing = Listing::new(vec![big, sample()]);
        assert_eq!(listing.total_score, i64::MAX);

        let low = Record {
            points_earned: i64::MIN,
            ..sample()
        };
        let listing = Listing::new(vec![low, Record { points_earned: -1, ..sample() }]);
        assert_eq!(listing.total_score, i64::MIN);
    }

    #[test]
    fn test_listing_total() {
        let a = sample();
        let b = Record {
            id: "2".to_string(),
            points_earned: 22,
            ..sample()
        };
        let listing = Listing::new(vec![a, b]);
        assert_eq!(listing.total_score, 32);

        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["totalScore"], 32);
        assert_eq!(json["applications"][0]["jobTitle"], "Eng");
    }
}
