//! Compliance framework and requirement models.
//!
//! Scores are stored as supplied; nothing here computes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::field_map::{FieldMap, FieldSpec};
use uuid::Uuid;
use validator::Validate;

string_enum! {
    FrameworkStatus {
        Active => "active",
        Inactive => "inactive",
        Draft => "draft",
    }
}

string_enum! {
    RequirementStatus {
        Compliant => "compliant",
        NonCompliant => "non-compliant",
        Partial => "partial",
        NotAssessed => "not-assessed",
    }
}

impl Default for FrameworkStatus {
    fn default() -> Self {
        FrameworkStatus::Draft
    }
}

impl Default for RequirementStatus {
    fn default() -> Self {
        RequirementStatus::NotAssessed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceFramework {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
    pub status: FrameworkStatus,
    pub requirements_count: i32,
    pub compliance_score: f64,
    pub last_assessment: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceRequirement {
    pub id: Uuid,
    pub framework_id: Uuid,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub status: RequirementStatus,
    pub evidence: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFrameworkInput {
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 50, message = "Version must be at most 50 characters"))]
    pub version: Option<String>,

    #[serde(default)]
    pub status: FrameworkStatus,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0, message = "Compliance score must be between 0 and 100"))]
    pub compliance_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateFrameworkInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[validate(length(max = 50, message = "Version must be at most 50 characters"))]
    pub version: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<FrameworkStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 100.0, message = "Compliance score must be between 0 and 100"))]
    pub compliance_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub last_assessment: Option<Option<DateTime<Utc>>>,
}

lazy_static::lazy_static! {
    /// Requirement codes look like `POPIA-19`, `SARS.4.2` or `ISO27001_A5`.
    pub static ref REQUIREMENT_CODE_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Z0-9][A-Z0-9._-]{0,31}$").unwrap();
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequirementInput {
    pub framework_id: Uuid,

    #[validate(regex(
        path = *REQUIREMENT_CODE_REGEX,
        message = "Code must be 1-32 uppercase letters, digits, '.', '_' or '-'"
    ))]
    pub code: String,

    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub status: RequirementStatus,

    pub evidence: Option<String>,

    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateRequirementInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RequirementStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub evidence: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

pub const COMPLIANCE_FRAMEWORK_FIELDS: FieldMap = FieldMap::new(
    "compliance framework",
    &[
        FieldSpec::read_only("id", "id"),
        FieldSpec::writable("name", "name"),
        FieldSpec::writable("description", "description"),
        FieldSpec::writable("version", "version"),
        FieldSpec::writable("status", "status"),
        FieldSpec::read_only("requirementsCount", "requirements_count"),
        FieldSpec::writable("complianceScore", "compliance_score"),
        FieldSpec::writable("lastAssessment", "last_assessment"),
        FieldSpec::read_only("createdAt", "created_at"),
        FieldSpec::read_only("updatedAt", "updated_at"),
    ],
);

pub const COMPLIANCE_REQUIREMENT_FIELDS: FieldMap = FieldMap::new(
    "compliance requirement",
    &[
        FieldSpec::read_only("id", "id"),
        FieldSpec::read_only("frameworkId", "framework_id"),
        FieldSpec::read_only("code", "code"),
        FieldSpec::writable("title", "title"),
        FieldSpec::writable("description", "description"),
        FieldSpec::writable("status", "status"),
        FieldSpec::writable("evidence", "evidence"),
        FieldSpec::writable("dueDate", "due_date"),
        FieldSpec::read_only("createdAt", "created_at"),
        FieldSpec::read_only("updatedAt", "updated_at"),
    ],
);
