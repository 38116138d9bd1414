//! Domain models for the business-tier data-access layer.
//!
//! Models serialize camelCase, the shape every caller of the service sees.

/// Declares a closed set of values stored as text.
///
/// Generates serde renames, `as_str`, `Display`, `FromStr` and an `ALL` table
/// so the storage layer can round-trip the enum through a TEXT column.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    _ => Err(format!("Unknown {}: {}", stringify!($name), s)),
                }
            }
        }
    };
}

pub mod account_manager;
pub mod audit_log;
pub mod compliance;
pub mod envelope;
pub mod integration;
pub mod reference_data;
pub mod support;
pub mod system_metrics;

pub use account_manager::{
    AccountManager, AccountManagerStatus, AssignedManager, CreateMeetingInput, CreateMessageInput,
    MeetingStatus, MessageSender, AccountManagerMeeting, AccountManagerMessage, UserAccountManager,
};
pub use audit_log::{AuditLog, AuditLogPage, CreateAuditLogInput, ListAuditLogsQuery};
pub use compliance::{
    ComplianceFramework, ComplianceRequirement, CreateFrameworkInput, CreateRequirementInput,
    FrameworkStatus, RequirementStatus, UpdateFrameworkInput, UpdateRequirementInput,
    COMPLIANCE_FRAMEWORK_FIELDS, COMPLIANCE_REQUIREMENT_FIELDS,
};
pub use envelope::{ApiResponse, FailureKind};
pub use integration::{
    CreateIntegrationInput, Integration, IntegrationAction, IntegrationLog, IntegrationLogStatus,
    IntegrationStatus, IntegrationTestResult, IntegrationType, NewIntegrationLog,
    UpdateIntegrationInput, INTEGRATION_FIELDS,
};
pub use reference_data::ReferenceData;
pub use support::{
    AgentStatus, CreateTicketInput, SupportAgent, SupportTicket, TicketAssignment,
    TicketCategory, TicketPriority, TicketStatus, UpdateTicketInput, SUPPORT_TICKET_FIELDS,
};
pub use system_metrics::{
    IncidentReport, IncidentSeverity, IncidentStatus, SlaMetric, SystemMetric,
    SystemMetricsQuery,
};
