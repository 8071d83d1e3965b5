//! The structured CV record consumed by the view provider.
//!
//! A record is produced by the form wizard and handed over complete; the
//! pipeline never reorders or filters its lists. Work and education entries
//! carry an [`EntryId`] minted by the record itself. The mint counter only
//! moves forward, so an id removed earlier in a session is never handed out
//! again.
//!
//! Field names serialise in camelCase to match the JSON the browser form
//! exports.

use crate::error::CvPressError;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Stable identifier of a work or education entry.
///
/// The browser form mints ids as numeric strings; both `7` and `"7"` load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(EntryId(n)),
            Raw::Text(s) => s
                .trim()
                .parse()
                .map(EntryId)
                .map_err(|_| de::Error::custom(format!("entry id '{s}' is not numeric"))),
        }
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl PersonalInfo {
    /// Online profiles that are present and non-blank, in display order.
    pub fn links(&self) -> Vec<&str> {
        [&self.linked_in, &self.github, &self.website]
            .into_iter()
            .filter_map(|l| non_blank(l.as_deref()))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkExperience {
    pub id: EntryId,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub is_current_job: bool,
    pub responsibilities: Vec<String>,
}

impl WorkExperience {
    /// "start - end", with "Present" for the current job.
    pub fn period(&self) -> String {
        let end = if self.is_current_job {
            "Present"
        } else {
            self.end_date.as_str()
        };
        format!("{} - {}", self.start_date, end)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseType {
    #[default]
    University,
    Polytechnic,
    College,
    Secondary,
    Certification,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub id: EntryId,
    pub degree: String,
    pub institution: String,
    pub location: String,
    pub graduation_year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    pub course_type: CourseType,
}

/// National service record (completion flag, year, region).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NationalService {
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(alias = "state", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl NationalService {
    /// One-line summary, or `None` when service was not completed.
    pub fn summary(&self) -> Option<String> {
        if !self.completed {
            return None;
        }
        let mut line = String::from("Completed national service");
        if let Some(year) = non_blank(self.year.as_deref()) {
            line.push_str(&format!(" in {year}"));
        }
        if let Some(region) = non_blank(self.region.as_deref()) {
            line.push_str(&format!(", {region}"));
        }
        Some(line)
    }
}

/// The complete CV content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvRecord {
    pub personal_info: PersonalInfo,
    pub career_objective: String,
    pub work_experience: Vec<WorkExperience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
    pub job_type: String,
    #[serde(alias = "nysc", skip_serializing_if = "Option::is_none")]
    pub national_service: Option<NationalService>,
    /// Next id to mint. Never decreases.
    #[serde(skip)]
    next_entry_id: u64,
}

impl CvRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a record from JSON and re-seed the id counter above every
    /// id already present.
    pub fn from_json_str(json: &str) -> Result<Self, CvPressError> {
        let mut record: CvRecord =
            serde_json::from_str(json).map_err(|e| CvPressError::InvalidRecord(e.to_string()))?;
        record.check_ids()?;
        record.next_entry_id = match record
            .work_experience
            .iter()
            .map(|w| w.id.0)
            .chain(record.education.iter().map(|e| e.id.0))
            .max()
        {
            Some(max) => max.checked_add(1).ok_or_else(|| {
                CvPressError::InvalidRecord(format!("entry id {max} leaves no room for new ids"))
            })?,
            None => 0,
        };
        Ok(record)
    }

    /// Read and parse a record file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CvPressError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            CvPressError::InvalidRecord(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, CvPressError> {
        serde_json::to_string_pretty(self).map_err(|e| CvPressError::Internal(e.to_string()))
    }

    /// Hand out the next id. Fails once the counter is exhausted rather
    /// than wrapping onto an id that may still be in use.
    fn mint_id(&mut self) -> Result<EntryId, CvPressError> {
        let id = EntryId(self.next_entry_id);
        self.next_entry_id = self
            .next_entry_id
            .checked_add(1)
            .ok_or_else(|| CvPressError::InvalidRecord("entry ids exhausted".into()))?;
        Ok(id)
    }

    fn check_ids(&self) -> Result<(), CvPressError> {
        let mut seen = HashSet::new();
        let ids = self
            .work_experience
            .iter()
            .map(|w| w.id)
            .chain(self.education.iter().map(|e| e.id));
        for id in ids {
            if !seen.insert(id) {
                return Err(CvPressError::InvalidRecord(format!(
                    "duplicate entry id {id}"
                )));
            }
        }
        Ok(())
    }

    // ── Work experience ──────────────────────────────────────────────────

    /// Append an entry, assigning it a fresh id. Any id on `entry` is replaced.
    ///
    /// # Errors
    /// `InvalidRecord` when no unused id is left.
    pub fn add_work_experience(
        &mut self,
        mut entry: WorkExperience,
    ) -> Result<EntryId, CvPressError> {
        entry.id = self.mint_id()?;
        let id = entry.id;
        self.work_experience.push(entry);
        Ok(id)
    }

    /// Edit an entry in place. Returns `false` when `id` is unknown.
    pub fn update_work_experience(
        &mut self,
        id: EntryId,
        edit: impl FnOnce(&mut WorkExperience),
    ) -> bool {
        match self.work_experience.iter_mut().find(|w| w.id == id) {
            Some(entry) => {
                edit(entry);
                entry.id = id;
                true
            }
            None => false,
        }
    }

    pub fn remove_work_experience(&mut self, id: EntryId) -> bool {
        let before = self.work_experience.len();
        self.work_experience.retain(|w| w.id != id);
        self.work_experience.len() != before
    }

    // ── Education ────────────────────────────────────────────────────────

    pub fn add_education(&mut self, mut entry: Education) -> Result<EntryId, CvPressError> {
        entry.id = self.mint_id()?;
        let id = entry.id;
        self.education.push(entry);
        Ok(id)
    }

    pub fn update_education(&mut self, id: EntryId, edit: impl FnOnce(&mut Education)) -> bool {
        match self.education.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                edit(entry);
                entry.id = id;
                true
            }
            None => false,
        }
    }

    pub fn remove_education(&mut self, id: EntryId) -> bool {
        let before = self.education.len();
        self.education.retain(|e| e.id != id);
        self.education.len() != before
    }

    /// Clear all content. The id counter keeps counting.
    pub fn reset(&mut self) {
        let next = self.next_entry_id;
        *self = Self::default();
        self.next_entry_id = next;
    }
}

pub(crate) fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str) -> WorkExperience {
        WorkExperience {
            job_title: title.into(),
            company: "Acme".into(),
            ..Default::default()
        }
    }

    #[test]
    fn ids_are_unique_and_never_reused() {
        let mut record = CvRecord::new();
        let a = record.add_work_experience(job("Analyst")).unwrap();
        let b = record.add_education(Education::default()).unwrap();
        assert_ne!(a, b);

        assert!(record.remove_work_experience(a));
        let c = record.add_work_experience(job("Engineer")).unwrap();
        assert_ne!(c, a);
        assert_ne!(c, b);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut record = CvRecord::new();
        record.add_work_experience(job("Third")).unwrap();
        record.add_work_experience(job("First")).unwrap();
        record.add_work_experience(job("Second")).unwrap();
        let titles: Vec<_> = record
            .work_experience
            .iter()
            .map(|w| w.job_title.as_str())
            .collect();
        assert_eq!(titles, ["Third", "First", "Second"]);
    }

    #[test]
    fn update_keeps_id() {
        let mut record = CvRecord::new();
        let id = record.add_work_experience(job("Analyst")).unwrap();
        assert!(record.update_work_experience(id, |w| {
            w.job_title = "Senior Analyst".into();
            w.id = EntryId(999);
        }));
        assert_eq!(record.work_experience[0].id, id);
        assert_eq!(record.work_experience[0].job_title, "Senior Analyst");
        assert!(!record.update_work_experience(EntryId(42), |_| {}));
    }

    #[test]
    fn reset_does_not_rewind_ids() {
        let mut record = CvRecord::new();
        let first = record.add_education(Education::default()).unwrap();
        record.reset();
        assert!(record.education.is_empty());
        let second = record.add_education(Education::default()).unwrap();
        assert!(second > first);
    }

    #[test]
    fn loads_browser_json_and_reseeds_counter() {
        let json = r#"{
            "personalInfo": { "fullName": "Ada Obi", "email": "ada@example.com", "phone": "0800" },
            "careerObjective": "Build things.",
            "workExperience": [
                { "id": 7, "jobTitle": "Engineer", "company": "Acme", "isCurrentJob": true, "startDate": "2021" }
            ],
            "education": [
                { "id": 3, "degree": "BSc", "institution": "Unilag", "courseType": "polytechnic" }
            ],
            "skills": ["Rust"],
            "jobType": "Software Engineering",
            "nysc": { "completed": true, "year": "2020", "state": "Lagos" }
        }"#;
        let mut record = CvRecord::from_json_str(json).unwrap();
        assert_eq!(record.personal_info.full_name, "Ada Obi");
        assert_eq!(record.education[0].course_type, CourseType::Polytechnic);
        assert_eq!(record.work_experience[0].period(), "2021 - Present");
        let service = record.national_service.as_ref().unwrap();
        assert_eq!(service.region.as_deref(), Some("Lagos"));

        let id = record.add_work_experience(job("Lead")).unwrap();
        assert_eq!(id, EntryId(8));
    }

    #[test]
    fn string_ids_from_the_browser_load() {
        let json = r#"{ "workExperience": [{ "id": "1712345678901", "jobTitle": "Intern" }] }"#;
        let record = CvRecord::from_json_str(json).unwrap();
        assert_eq!(record.work_experience[0].id, EntryId(1_712_345_678_901));

        let bad = r#"{ "education": [{ "id": "abc" }] }"#;
        assert!(CvRecord::from_json_str(bad).is_err());
    }

    #[test]
    fn largest_possible_id_is_rejected_on_load() {
        let json = r#"{ "workExperience": [{ "id": "18446744073709551615" }] }"#;
        let err = CvRecord::from_json_str(json).unwrap_err();
        assert!(matches!(err, CvPressError::InvalidRecord(_)));
    }

    #[test]
    fn exhausted_counter_never_wraps() {
        let json = r#"{ "education": [{ "id": "18446744073709551614" }] }"#;
        let mut record = CvRecord::from_json_str(json).unwrap();
        assert_eq!(record.next_entry_id, u64::MAX);

        let err = record.add_work_experience(job("Late")).unwrap_err();
        assert!(matches!(err, CvPressError::InvalidRecord(_)));
        assert!(record.work_experience.is_empty());
        assert!(record.add_education(Education::default()).is_err());
        assert_eq!(record.education.len(), 1);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let json = r#"{
            "workExperience": [{ "id": 1 }],
            "education": [{ "id": 1 }]
        }"#;
        let err = CvRecord::from_json_str(json).unwrap_err();
        assert!(matches!(err, CvPressError::InvalidRecord(_)));
    }

    #[test]
    fn national_service_summary() {
        let service = NationalService {
            completed: true,
            year: Some("2019".into()),
            region: Some("Oyo".into()),
        };
        assert_eq!(
            service.summary().as_deref(),
            Some("Completed national service in 2019, Oyo")
        );
        assert!(NationalService::default().summary().is_none());
    }

    #[test]
    fn links_skip_blank_entries() {
        let info = PersonalInfo {
            linked_in: Some("linkedin.com/in/ada".into()),
            github: Some("  ".into()),
            website: None,
            ..Default::default()
        };
        assert_eq!(info.links(), vec!["linkedin.com/in/ada"]);
    }
}
