//! In-process datastore.
//!
//! Keeps the same snake_case rows as PostgreSQL in plain vectors behind one
//! mutex. Every trait method runs under a single lock acquisition, so
//! multi-step operations (assignment, requirement counting) are atomic.
//! Column patches are applied by merging JSON into the serialized row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::{
    AccountManager, AccountManagerMeeting, AccountManagerMessage, AssignedManager, AuditLog,
    ComplianceFramework, ComplianceRequirement, CreateAuditLogInput, CreateFrameworkInput,
    CreateIntegrationInput, CreateMeetingInput, CreateMessageInput, CreateRequirementInput,
    CreateTicketInput, IncidentReport, IncidentStatus, Integration, IntegrationLog,
    ListAuditLogsQuery, MeetingStatus, NewIntegrationLog, SlaMetric, SupportAgent, SupportTicket,
    SystemMetric, SystemMetricsQuery, TicketAssignment,
};
use domain::store::{
    AccountManagerStore, AuditStore, ColumnPatch, ComplianceStore, IntegrationStore,
    MetricsStore, StoreError, StoreResult, SupportStore,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::pagination::PageRequest;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::entities::{
    AccountManagerEntity, AuditLogEntity, ComplianceFrameworkEntity, ComplianceRequirementEntity,
    IncidentReportEntity, IntegrationEntity, IntegrationLogEntity, MeetingEntity, MessageEntity,
    SlaMetricEntity, SupportAgentEntity, SupportTicketEntity, SystemMetricEntity,
    UserAccountManagerEntity,
};

const REFERENCE_NOT_FOUND: &str = "Referenced resource not found";

#[derive(Debug, Default)]
struct Tables {
    support_tickets: Vec<SupportTicketEntity>,
    support_agents: Vec<SupportAgentEntity>,
    account_managers: Vec<AccountManagerEntity>,
    user_account_managers: Vec<UserAccountManagerEntity>,
    meetings: Vec<MeetingEntity>,
    messages: Vec<MessageEntity>,
    integrations: Vec<IntegrationEntity>,
    integration_logs: Vec<IntegrationLogEntity>,
    frameworks: Vec<ComplianceFrameworkEntity>,
    requirements: Vec<ComplianceRequirementEntity>,
    audit_logs: Vec<AuditLogEntity>,
    system_metrics: Vec<SystemMetricEntity>,
    sla_metrics: Vec<SlaMetricEntity>,
    incident_reports: Vec<IncidentReportEntity>,
}

/// Shared in-memory tables. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add or replace a support agent.
    pub fn insert_agent(&self, agent: &SupportAgent) {
        let mut tables = self.tables();
        tables.support_agents.retain(|a| a.id != agent.id);
        tables.support_agents.push(agent.into());
    }

    /// Add or replace an account manager.
    pub fn insert_account_manager(&self, manager: &AccountManager) {
        let mut tables = self.tables();
        tables.account_managers.retain(|m| m.id != manager.id);
        tables.account_managers.push(manager.into());
    }

    pub fn insert_system_metric(&self, metric: &SystemMetric) {
        self.tables().system_metrics.push(metric.into());
    }

    pub fn insert_sla_metric(&self, metric: &SlaMetric) {
        self.tables().sla_metrics.push(metric.into());
    }

    pub fn insert_incident_report(&self, incident: &IncidentReport) {
        self.tables().incident_reports.push(incident.into());
    }
}

/// Merge a column patch into a row through its JSON form.
fn patched<T>(row: &T, patch: &ColumnPatch) -> StoreResult<T>
where
    T: Serialize + DeserializeOwned,
{
    let mut value = serde_json::to_value(row).map_err(|e| StoreError::Database(e.to_string()))?;
    let fields = value
        .as_object_mut()
        .ok_or_else(|| StoreError::Database("Row is not an object".to_string()))?;

    for (column, new_value) in patch {
        if !fields.contains_key(column) {
            return Err(StoreError::Invalid(format!("Unknown column '{}'", column)));
        }
        fields.insert(column.clone(), new_value.clone());
    }

    serde_json::from_value(value).map_err(|e| StoreError::Invalid(e.to_string()))
}

fn convert<E, T>(rows: impl IntoIterator<Item = E>) -> StoreResult<Vec<T>>
where
    T: TryFrom<E>,
    StoreError: From<T::Error>,
{
    rows.into_iter()
        .map(|row| T::try_from(row).map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl SupportStore for MemoryStore {
    async fn list_tickets(&self, user_id: Uuid) -> StoreResult<Vec<SupportTicket>> {
        let tables = self.tables();
        let mut rows: Vec<_> = tables
            .support_tickets
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        convert(rows)
    }

    async fn find_ticket(&self, id: Uuid) -> StoreResult<Option<SupportTicket>> {
        let tables = self.tables();
        let row = tables.support_tickets.iter().find(|t| t.id == id).cloned();
        Ok(row.map(SupportTicket::try_from).transpose()?)
    }

    async fn create_ticket(&self, input: &CreateTicketInput) -> StoreResult<TicketAssignment> {
        let mut tables = self.tables();

        let agent = tables
            .support_agents
            .iter_mut()
            .filter(|a| a.status == "online")
            .min_by(|a, b| a.active_tickets.cmp(&b.active_tickets).then(a.id.cmp(&b.id)));
        let agent = agent.map(|a| {
            a.active_tickets += 1;
            a.clone()
        });

        let now = Utc::now();
        let ticket = SupportTicketEntity {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            agent_id: agent.as_ref().map(|a| a.id),
            subject: input.subject.clone(),
            description: input.description.clone(),
            status: "open".to_string(),
            priority: input.priority.as_str().to_string(),
            category: input.category.as_str().to_string(),
            created_at: now,
            updated_at: now,
            resolved_at: None,
        };
        tables.support_tickets.push(ticket.clone());

        Ok(TicketAssignment {
            ticket: ticket.try_into()?,
            agent: agent.map(SupportAgent::try_from).transpose()?,
        })
    }

    async fn update_ticket(&self, id: Uuid, patch: &ColumnPatch) -> StoreResult<Option<SupportTicket>> {
        let mut tables = self.tables();
        let Some(index) = tables.support_tickets.iter().position(|t| t.id == id) else {
            return Ok(None);
        };

        let mut row = patched(&tables.support_tickets[index], patch)?;
        if let Some(agent_id) = row.agent_id {
            if !tables.support_agents.iter().any(|a| a.id == agent_id) {
                return Err(StoreError::NotFound(REFERENCE_NOT_FOUND.to_string()));
            }
        }
        row.updated_at = Utc::now();

        let ticket = SupportTicket::try_from(row.clone())?;
        tables.support_tickets[index] = row;
        Ok(Some(ticket))
    }

    async fn list_agents(&self) -> StoreResult<Vec<SupportAgent>> {
        let mut rows = self.tables().support_agents.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        convert(rows)
    }
}

fn assigned_manager(
    assignment: UserAccountManagerEntity,
    manager: AccountManagerEntity,
) -> StoreResult<AssignedManager> {
    Ok(AssignedManager {
        assignment: assignment.into(),
        manager: manager.try_into()?,
    })
}

impl Tables {
    fn assignment_for(&self, user_id: Uuid) -> StoreResult<Option<AssignedManager>> {
        let Some(assignment) = self
            .user_account_managers
            .iter()
            .find(|a| a.user_id == user_id)
        else {
            return Ok(None);
        };
        let manager = self
            .account_managers
            .iter()
            .find(|m| m.id == assignment.account_manager_id)
            .ok_or_else(|| StoreError::NotFound(REFERENCE_NOT_FOUND.to_string()))?;
        assigned_manager(assignment.clone(), manager.clone()).map(Some)
    }

    fn require_manager(&self, id: Uuid) -> StoreResult<()> {
        if self.account_managers.iter().any(|m| m.id == id) {
            Ok(())
        } else {
            Err(StoreError::NotFound(REFERENCE_NOT_FOUND.to_string()))
        }
    }
}

#[async_trait]
impl AccountManagerStore for MemoryStore {
    async fn list_managers(&self) -> StoreResult<Vec<AccountManager>> {
        let mut rows = self.tables().account_managers.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        convert(rows)
    }

    async fn find_assignment(&self, user_id: Uuid) -> StoreResult<Option<AssignedManager>> {
        self.tables().assignment_for(user_id)
    }

    async fn assign_least_loaded(&self, user_id: Uuid) -> StoreResult<AssignedManager> {
        let mut tables = self.tables();
        if let Some(existing) = tables.assignment_for(user_id)? {
            return Ok(existing);
        }

        let manager = tables
            .account_managers
            .iter_mut()
            .filter(|m| m.status == "active")
            .min_by(|a, b| a.total_clients.cmp(&b.total_clients).then(a.id.cmp(&b.id)))
            .ok_or_else(|| StoreError::NotFound("No available account manager".to_string()))?;
        manager.total_clients += 1;
        let manager = manager.clone();

        let assignment = UserAccountManagerEntity {
            id: Uuid::new_v4(),
            user_id,
            account_manager_id: manager.id,
            assigned_at: Utc::now(),
        };
        tables.user_account_managers.push(assignment.clone());

        assigned_manager(assignment, manager)
    }

    async fn create_meeting(&self, input: &CreateMeetingInput) -> StoreResult<AccountManagerMeeting> {
        let mut tables = self.tables();
        tables.require_manager(input.account_manager_id)?;

        let row = MeetingEntity {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            account_manager_id: input.account_manager_id,
            title: input.title.clone(),
            scheduled_at: input.scheduled_at,
            duration_minutes: input.duration_minutes,
            status: MeetingStatus::Scheduled.as_str().to_string(),
            notes: input.notes.clone(),
            created_at: Utc::now(),
        };
        tables.meetings.push(row.clone());
        Ok(row.try_into()?)
    }

    async fn list_meetings(&self, user_id: Uuid) -> StoreResult<Vec<AccountManagerMeeting>> {
        let tables = self.tables();
        let mut rows: Vec<_> = tables
            .meetings
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at).then(a.id.cmp(&b.id)));
        convert(rows)
    }

    async fn update_meeting_status(
        &self,
        id: Uuid,
        status: MeetingStatus,
    ) -> StoreResult<Option<AccountManagerMeeting>> {
        let mut tables = self.tables();
        let Some(row) = tables.meetings.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        row.status = status.as_str().to_string();
        Ok(Some(row.clone().try_into()?))
    }

    async fn create_message(&self, input: &CreateMessageInput) -> StoreResult<AccountManagerMessage> {
        let mut tables = self.tables();
        tables.require_manager(input.account_manager_id)?;

        let row = MessageEntity {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            account_manager_id: input.account_manager_id,
            sender: input.sender.as_str().to_string(),
            content: input.content.clone(),
            read: false,
            created_at: Utc::now(),
        };
        tables.messages.push(row.clone());
        Ok(row.try_into()?)
    }

    async fn list_messages(&self, user_id: Uuid) -> StoreResult<Vec<AccountManagerMessage>> {
        let tables = self.tables();
        let mut rows: Vec<_> = tables
            .messages
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        convert(rows)
    }

    async fn mark_messages_read(&self, user_id: Uuid) -> StoreResult<u64> {
        let mut tables = self.tables();
        let mut changed = 0;
        for message in tables
            .messages
            .iter_mut()
            .filter(|m| m.user_id == user_id && m.sender == "manager" && !m.read)
        {
            message.read = true;
            changed += 1;
        }
        Ok(changed)
    }
}

#[async_trait]
impl IntegrationStore for MemoryStore {
    async fn list_integrations(&self, user_id: Uuid) -> StoreResult<Vec<Integration>> {
        let tables = self.tables();
        let mut rows: Vec<_> = tables
            .integrations
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        convert(rows)
    }

    async fn find_integration(&self, id: Uuid) -> StoreResult<Option<Integration>> {
        let row = self.tables().integrations.iter().find(|i| i.id == id).cloned();
        Ok(row.map(Integration::try_from).transpose()?)
    }

    async fn create_integration(&self, input: &CreateIntegrationInput) -> StoreResult<Integration> {
        let now = Utc::now();
        let row = IntegrationEntity {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            name: input.name.clone(),
            provider: input.provider.clone(),
            integration_type: input.integration_type.as_str().to_string(),
            config: input.config.clone(),
            credentials: input.credentials.clone(),
            status: "inactive".to_string(),
            enabled: input.enabled,
            last_sync: None,
            created_at: now,
            updated_at: now,
        };
        self.tables().integrations.push(row.clone());
        Ok(row.try_into()?)
    }

    async fn update_integration(&self, id: Uuid, patch: &ColumnPatch) -> StoreResult<Option<Integration>> {
        let mut tables = self.tables();
        let Some(index) = tables.integrations.iter().position(|i| i.id == id) else {
            return Ok(None);
        };

        let mut row = patched(&tables.integrations[index], patch)?;
        row.updated_at = Utc::now();
        let integration = Integration::try_from(row.clone())?;
        tables.integrations[index] = row;
        Ok(Some(integration))
    }

    async fn mark_synced(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<Option<Integration>> {
        let mut tables = self.tables();
        let Some(row) = tables.integrations.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        row.status = "active".to_string();
        row.last_sync = Some(at);
        row.updated_at = Utc::now();
        Ok(Some(row.clone().try_into()?))
    }

    async fn delete_integration(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables();
        let before = tables.integrations.len();
        tables.integrations.retain(|i| i.id != id);
        Ok(tables.integrations.len() != before)
    }

    async fn insert_integration_log(&self, log: &NewIntegrationLog) -> StoreResult<IntegrationLog> {
        let row = IntegrationLogEntity {
            id: Uuid::new_v4(),
            integration_id: log.integration_id,
            action: log.action.as_str().to_string(),
            status: log.status.as_str().to_string(),
            message: log.message.clone(),
            details: log.details.clone(),
            created_at: Utc::now(),
        };
        self.tables().integration_logs.push(row.clone());
        Ok(row.try_into()?)
    }

    async fn list_integration_logs(&self, integration_id: Uuid) -> StoreResult<Vec<IntegrationLog>> {
        let tables = self.tables();
        let mut rows: Vec<_> = tables
            .integration_logs
            .iter()
            .filter(|l| l.integration_id == integration_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        convert(rows)
    }
}

#[async_trait]
impl ComplianceStore for MemoryStore {
    async fn list_frameworks(&self) -> StoreResult<Vec<ComplianceFramework>> {
        let mut rows = self.tables().frameworks.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        convert(rows)
    }

    async fn find_framework(&self, id: Uuid) -> StoreResult<Option<ComplianceFramework>> {
        let row = self.tables().frameworks.iter().find(|f| f.id == id).cloned();
        Ok(row.map(ComplianceFramework::try_from).transpose()?)
    }

    async fn create_framework(&self, input: &CreateFrameworkInput) -> StoreResult<ComplianceFramework> {
        let now = Utc::now();
        let row = ComplianceFrameworkEntity {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            description: input.description.clone(),
            version: input.version.clone(),
            status: input.status.as_str().to_string(),
            requirements_count: 0,
            compliance_score: input.compliance_score,
            last_assessment: None,
            created_at: now,
            updated_at: now,
        };
        self.tables().frameworks.push(row.clone());
        Ok(row.try_into()?)
    }

    async fn update_framework(
        &self,
        id: Uuid,
        patch: &ColumnPatch,
    ) -> StoreResult<Option<ComplianceFramework>> {
        let mut tables = self.tables();
        let Some(index) = tables.frameworks.iter().position(|f| f.id == id) else {
            return Ok(None);
        };

        let mut row = patched(&tables.frameworks[index], patch)?;
        row.updated_at = Utc::now();
        let framework = ComplianceFramework::try_from(row.clone())?;
        tables.frameworks[index] = row;
        Ok(Some(framework))
    }

    async fn delete_framework(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables();
        let before = tables.frameworks.len();
        tables.frameworks.retain(|f| f.id != id);
        if tables.frameworks.len() == before {
            return Ok(false);
        }
        tables.requirements.retain(|r| r.framework_id != id);
        Ok(true)
    }

    async fn list_requirements(&self, framework_id: Uuid) -> StoreResult<Vec<ComplianceRequirement>> {
        let tables = self.tables();
        let mut rows: Vec<_> = tables
            .requirements
            .iter()
            .filter(|r| r.framework_id == framework_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.code.cmp(&b.code).then(a.id.cmp(&b.id)));
        convert(rows)
    }

    async fn create_requirement(
        &self,
        input: &CreateRequirementInput,
    ) -> StoreResult<ComplianceRequirement> {
        let mut tables = self.tables();
        if tables
            .requirements
            .iter()
            .any(|r| r.framework_id == input.framework_id && r.code == input.code)
        {
            return Err(StoreError::Conflict("Resource already exists".to_string()));
        }

        let now = Utc::now();
        let framework = tables
            .frameworks
            .iter_mut()
            .find(|f| f.id == input.framework_id)
            .ok_or_else(|| StoreError::not_found("Compliance framework"))?;
        framework.requirements_count += 1;
        framework.updated_at = now;

        let row = ComplianceRequirementEntity {
            id: Uuid::new_v4(),
            framework_id: input.framework_id,
            code: input.code.clone(),
            title: input.title.clone(),
            description: input.description.clone(),
            status: input.status.as_str().to_string(),
            evidence: input.evidence.clone(),
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
        };
        tables.requirements.push(row.clone());
        Ok(row.try_into()?)
    }

    async fn update_requirement(
        &self,
        id: Uuid,
        patch: &ColumnPatch,
    ) -> StoreResult<Option<ComplianceRequirement>> {
        let mut tables = self.tables();
        let Some(index) = tables.requirements.iter().position(|r| r.id == id) else {
            return Ok(None);
        };

        let mut row = patched(&tables.requirements[index], patch)?;
        row.updated_at = Utc::now();
        let requirement = ComplianceRequirement::try_from(row.clone())?;
        tables.requirements[index] = row;
        Ok(Some(requirement))
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn insert_audit_log(&self, input: &CreateAuditLogInput) -> StoreResult<AuditLog> {
        let row = AuditLogEntity {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            action: input.action.clone(),
            resource_type: input.resource_type.clone(),
            resource_id: input.resource_id.clone(),
            details: input.details.clone(),
            ip_address: input.ip_address.clone(),
            user_agent: input.user_agent.clone(),
            created_at: Utc::now(),
        };
        self.tables().audit_logs.push(row.clone());
        Ok(row.into())
    }

    async fn list_audit_logs(
        &self,
        query: &ListAuditLogsQuery,
        page: PageRequest,
    ) -> StoreResult<(Vec<AuditLog>, i64)> {
        let tables = self.tables();
        let mut logs: Vec<AuditLog> = tables
            .audit_logs
            .iter()
            .cloned()
            .map(AuditLog::from)
            .filter(|log| query.matches(log))
            .collect();
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = logs.len() as i64;
        let logs = logs
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((logs, total))
    }
}

#[async_trait]
impl MetricsStore for MemoryStore {
    async fn list_system_metrics(&self, query: &SystemMetricsQuery) -> StoreResult<Vec<SystemMetric>> {
        let tables = self.tables();
        let mut rows: Vec<_> = tables
            .system_metrics
            .iter()
            .filter(|m| query.name.as_ref().map_or(true, |n| &m.name == n))
            .filter(|m| query.since.map_or(true, |since| m.timestamp >= since))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        rows.truncate(query.effective_limit() as usize);
        Ok(rows.into_iter().map(SystemMetric::from).collect())
    }

    async fn list_sla_metrics(&self, period: Option<&str>) -> StoreResult<Vec<SlaMetric>> {
        let tables = self.tables();
        let mut rows: Vec<_> = tables
            .sla_metrics
            .iter()
            .filter(|m| period.map_or(true, |p| m.period == p))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(rows.into_iter().map(SlaMetric::from).collect())
    }

    async fn list_incident_reports(
        &self,
        status: Option<IncidentStatus>,
    ) -> StoreResult<Vec<IncidentReport>> {
        let tables = self.tables();
        let mut rows: Vec<_> = tables
            .incident_reports
            .iter()
            .filter(|i| status.map_or(true, |s| i.status == s.as_str()))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(b.id.cmp(&a.id)));
        convert(rows)
    }
}
