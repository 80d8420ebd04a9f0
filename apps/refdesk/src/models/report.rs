use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder for a field the extraction could not find.
pub const NOT_FOUND: &str = "Not found";

/// Placeholder for a field whose extraction call failed outright. Kept distinct
/// from `NOT_FOUND` so the report shows a failed parse differently from a
/// genuinely absent value.
pub const PARSE_ERROR: &str = "Error parsing API response";

/// Years of experience as it appears in a report row: a quarter-rounded number
/// or a placeholder string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearsOfExperience {
    Years(f64),
    Placeholder(String),
}

impl YearsOfExperience {
    /// Snaps to the nearest 0.25. Negative or non-finite input is not a duration.
    pub fn quarter_rounded(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        Some(Self::Years((value * 4.0).round() / 4.0))
    }

    pub fn not_found() -> Self {
        Self::Placeholder(NOT_FOUND.to_string())
    }

    #[cfg(test)]
    pub fn is_quarter_multiple(&self) -> bool {
        match self {
            Self::Years(years) => (years * 4.0).fract() == 0.0,
            Self::Placeholder(_) => false,
        }
    }
}

impl fmt::Display for YearsOfExperience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Years(years) => write!(f, "{years}"),
            Self::Placeholder(text) => f.write_str(text),
        }
    }
}

/// Fields reconciled from the résumé call and the job-id call, before the
/// required-field contract is applied. `None` means absent, empty or null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub years_of_experience: Option<YearsOfExperience>,
    pub job_id: Option<String>,
}

/// One row of the referral report. All five fields are always populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferralReportRow {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub years_of_experience: YearsOfExperience,
    pub job_id: String,
}

impl From<ExtractedProfile> for ReferralReportRow {
    fn from(profile: ExtractedProfile) -> Self {
        Self {
            name: or_not_found(profile.name),
            email: or_not_found(profile.email),
            phone: or_not_found(profile.phone),
            years_of_experience: profile
                .years_of_experience
                .unwrap_or_else(YearsOfExperience::not_found),
            job_id: or_not_found(profile.job_id),
        }
    }
}

fn or_not_found(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| NOT_FOUND.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_rounding_snaps_to_nearest_quarter() {
        assert_eq!(
            YearsOfExperience::quarter_rounded(3.4),
            Some(YearsOfExperience::Years(3.5))
        );
        assert_eq!(
            YearsOfExperience::quarter_rounded(3.1),
            Some(YearsOfExperience::Years(3.0))
        );
        assert_eq!(
            YearsOfExperience::quarter_rounded(0.2),
            Some(YearsOfExperience::Years(0.25))
        );
    }

    #[test]
    fn test_quarter_rounding_rejects_negative_and_nan() {
        assert_eq!(YearsOfExperience::quarter_rounded(-1.0), None);
        assert_eq!(YearsOfExperience::quarter_rounded(f64::NAN), None);
    }

    #[test]
    fn test_years_display() {
        assert_eq!(YearsOfExperience::Years(5.0).to_string(), "5");
        assert_eq!(YearsOfExperience::Years(3.75).to_string(), "3.75");
        assert_eq!(YearsOfExperience::not_found().to_string(), "Not found");
    }

    #[test]
    fn test_years_serde_untagged() {
        let years: YearsOfExperience = serde_json::from_str("2.5").unwrap();
        assert_eq!(years, YearsOfExperience::Years(2.5));
        let placeholder: YearsOfExperience = serde_json::from_str(r#""Not found""#).unwrap();
        assert_eq!(placeholder, YearsOfExperience::not_found());
    }

    #[test]
    fn test_row_from_empty_profile_is_all_placeholders() {
        let row = ReferralReportRow::from(ExtractedProfile::default());
        assert_eq!(row.name, NOT_FOUND);
        assert_eq!(row.email, NOT_FOUND);
        assert_eq!(row.phone, NOT_FOUND);
        assert_eq!(row.years_of_experience, YearsOfExperience::not_found());
        assert_eq!(row.job_id, NOT_FOUND);
    }

    #[test]
    fn test_row_treats_blank_strings_as_absent() {
        let row = ReferralReportRow::from(ExtractedProfile {
            name: Some("  ".to_string()),
            email: Some("a@b.com".to_string()),
            ..Default::default()
        });
        assert_eq!(row.name, NOT_FOUND);
        assert_eq!(row.email, "a@b.com");
    }
}
