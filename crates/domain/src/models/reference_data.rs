//! Static reference data served to the business-tier screens.
//!
//! Loaded once with the configuration and never written at runtime. Read from
//! snake_case config keys, served camelCase.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ReferenceData {
    #[serde(default)]
    pub infrastructure_regions: Vec<InfrastructureRegion>,
    #[serde(default)]
    pub white_label_packages: Vec<WhiteLabelPackage>,
    #[serde(default)]
    pub report_template_categories: Vec<String>,
}

/// A hosting region offered for dedicated infrastructure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct InfrastructureRegion {
    pub code: String,
    pub name: String,
}

/// A white-label plan tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct WhiteLabelPackage {
    pub id: String,
    pub name: String,
    pub monthly_price_zar: u32,
    #[serde(default)]
    pub features: Vec<String>,
}
