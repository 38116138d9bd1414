//! Compliance framework and requirement entities.

use chrono::{DateTime, Utc};
use domain::models::{
    ComplianceFramework, ComplianceRequirement, COMPLIANCE_FRAMEWORK_FIELDS,
    COMPLIANCE_REQUIREMENT_FIELDS,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::map_row;
use crate::error::DecodeError;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ComplianceFrameworkEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
    pub status: String,
    pub requirements_count: i32,
    pub compliance_score: f64,
    pub last_assessment: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ComplianceFrameworkEntity> for ComplianceFramework {
    type Error = DecodeError;

    fn try_from(entity: ComplianceFrameworkEntity) -> Result<Self, Self::Error> {
        map_row(&COMPLIANCE_FRAMEWORK_FIELDS, &entity)
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ComplianceRequirementEntity {
    pub id: Uuid,
    pub framework_id: Uuid,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub evidence: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ComplianceRequirementEntity> for ComplianceRequirement {
    type Error = DecodeError;

    fn try_from(entity: ComplianceRequirementEntity) -> Result<Self, Self::Error> {
        map_row(&COMPLIANCE_REQUIREMENT_FIELDS, &entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{FrameworkStatus, RequirementStatus};

    #[test]
    fn test_framework_entity_to_domain() {
        let now = Utc::now();
        let framework = ComplianceFramework::try_from(ComplianceFrameworkEntity {
            id: Uuid::new_v4(),
            name: "POPIA".to_string(),
            description: None,
            version: Some("2021".to_string()),
            status: "active".to_string(),
            requirements_count: 12,
            compliance_score: 87.5,
            last_assessment: Some(now),
            created_at: now,
            updated_at: now,
        })
        .unwrap();
        assert_eq!(framework.status, FrameworkStatus::Active);
        assert_eq!(framework.requirements_count, 12);
        assert_eq!(framework.compliance_score, 87.5);
        assert_eq!(framework.last_assessment, Some(now));
        assert_eq!(framework.description, None);
    }

    #[test]
    fn test_requirement_entity_bad_status() {
        let now = Utc::now();
        let entity = ComplianceRequirementEntity {
            id: Uuid::new_v4(),
            framework_id: Uuid::new_v4(),
            code: "POPIA-19".to_string(),
            title: "Security safeguards".to_string(),
            description: None,
            status: "waived".to_string(),
            evidence: None,
            due_date: None,
            created_at: now,
            updated_at: now,
        };
        assert!(ComplianceRequirement::try_from(entity.clone()).is_err());

        let requirement = ComplianceRequirement::try_from(ComplianceRequirementEntity {
            status: "partial".to_string(),
            ..entity
        })
        .unwrap();
        assert_eq!(requirement.status, RequirementStatus::Partial);
    }
}
