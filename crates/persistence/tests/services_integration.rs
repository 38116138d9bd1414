//! Service-level tests over the in-memory store.
//!
//! Run with: cargo test -p persistence --test services_integration

mod common;

use chrono::{Duration, Utc};
use common::{agent, integration_input, manager, ticket_input, Harness};
use domain::models::{
    AccountManagerStatus, AgentStatus, CreateFrameworkInput, CreateMeetingInput,
    CreateMessageInput, CreateRequirementInput, FailureKind, FrameworkStatus, IntegrationAction,
    IntegrationLogStatus, IntegrationStatus, ListAuditLogsQuery, MessageSender,
    RequirementStatus, TicketStatus,
};
use serde_json::{json, Map, Value};
use uuid::Uuid;

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

// ============================================================================
// Support
// ============================================================================

#[tokio::test]
async fn test_ticket_goes_to_least_loaded_online_agent() {
    let h = Harness::new();
    let busy = agent(AgentStatus::Online, 4);
    let idle = agent(AgentStatus::Online, 1);
    let offline = agent(AgentStatus::Offline, 0);
    for a in [&busy, &idle, &offline] {
        h.memory.insert_agent(a);
    }

    let user_id = Uuid::new_v4();
    let resp = h.support.create_ticket(ticket_input(user_id)).await;
    assert!(resp.success, "{:?}", resp.error);

    let ticket = resp.data.unwrap();
    assert_eq!(ticket.agent_id, Some(idle.id));
    assert_eq!(ticket.status, TicketStatus::Open);

    let agents = h.support.get_agents().await.data.unwrap();
    let idle_after = agents.iter().find(|a| a.id == idle.id).unwrap();
    let busy_after = agents.iter().find(|a| a.id == busy.id).unwrap();
    assert_eq!(idle_after.active_tickets, 2);
    assert_eq!(busy_after.active_tickets, 4);
}

#[tokio::test]
async fn test_ticket_without_online_agent_is_unassigned() {
    let h = Harness::new();
    h.memory.insert_agent(&agent(AgentStatus::Busy, 0));

    let resp = h.support.create_ticket(ticket_input(Uuid::new_v4())).await;

    assert!(resp.success);
    assert_eq!(resp.data.unwrap().agent_id, None);
}

#[tokio::test]
async fn test_ticket_validation_failure_envelope() {
    let h = Harness::new();
    let mut input = ticket_input(Uuid::new_v4());
    input.subject = "   ".to_string();

    let resp = h.support.create_ticket(input).await;

    assert!(!resp.success);
    assert!(resp.data.is_none());
    assert_eq!(resp.failure, Some(FailureKind::Invalid));
    assert!(resp.error.is_some());
}

#[tokio::test]
async fn test_ticket_round_trip_and_idempotent_reads() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let created = h.support.create_ticket(ticket_input(user_id)).await.data.unwrap();

    let first = h.support.get_ticket(created.id).await;
    let second = h.support.get_ticket(created.id).await;
    assert_eq!(first, second);
    assert_eq!(first.data.unwrap(), created);

    let listed = h.support.get_tickets(user_id).await.data.unwrap();
    assert_eq!(listed, vec![created]);
}

#[tokio::test]
async fn test_resolving_ticket_sets_resolved_at() {
    let h = Harness::new();
    let created = h
        .support
        .create_ticket(ticket_input(Uuid::new_v4()))
        .await
        .data
        .unwrap();

    let resolved = h
        .support
        .update_ticket(created.id, object(json!({"status": "resolved"})))
        .await
        .data
        .unwrap();
    assert_eq!(resolved.status, TicketStatus::Resolved);
    assert!(resolved.resolved_at.is_some());

    let reopened = h
        .support
        .update_ticket(created.id, object(json!({"status": "in-progress"})))
        .await
        .data
        .unwrap();
    assert!(reopened.resolved_at.is_none());
}

#[tokio::test]
async fn test_ticket_patch_rejects_unknown_and_read_only_fields() {
    let h = Harness::new();
    let created = h
        .support
        .create_ticket(ticket_input(Uuid::new_v4()))
        .await
        .data
        .unwrap();

    let unknown = h
        .support
        .update_ticket(created.id, object(json!({"severity": "high"})))
        .await;
    assert_eq!(unknown.failure, Some(FailureKind::Invalid));

    let read_only = h
        .support
        .update_ticket(created.id, object(json!({"userId": Uuid::new_v4()})))
        .await;
    assert_eq!(read_only.failure, Some(FailureKind::Invalid));

    let unchanged = h.support.get_ticket(created.id).await.data.unwrap();
    assert_eq!(unchanged, created);
}

#[tokio::test]
async fn test_ticket_patch_null_unassigns_agent() {
    let h = Harness::new();
    let online = agent(AgentStatus::Online, 0);
    h.memory.insert_agent(&online);
    let created = h
        .support
        .create_ticket(ticket_input(Uuid::new_v4()))
        .await
        .data
        .unwrap();
    assert_eq!(created.agent_id, Some(online.id));

    let updated = h
        .support
        .update_ticket(created.id, object(json!({"agentId": null, "status": "waiting"})))
        .await;
    assert!(updated.success, "{:?}", updated.error);
    let updated = updated.data.unwrap();
    assert_eq!(updated.agent_id, None);
    assert_eq!(updated.status, TicketStatus::Waiting);

    let only_null = h
        .support
        .update_ticket(created.id, object(json!({"agentId": null})))
        .await;
    assert!(only_null.success, "{:?}", only_null.error);
    assert_eq!(h.support.get_ticket(created.id).await.data.unwrap().agent_id, None);
}

#[tokio::test]
async fn test_ticket_patch_null_for_required_field_is_invalid() {
    let h = Harness::new();
    let created = h
        .support
        .create_ticket(ticket_input(Uuid::new_v4()))
        .await
        .data
        .unwrap();

    let resp = h
        .support
        .update_ticket(created.id, object(json!({"subject": null, "priority": "high"})))
        .await;
    assert_eq!(resp.failure, Some(FailureKind::Invalid));
    assert_eq!(
        resp.error.as_deref(),
        Some("Field 'subject' of support ticket cannot be null")
    );
    assert_eq!(h.support.get_ticket(created.id).await.data.unwrap(), created);
}

#[tokio::test]
async fn test_missing_ticket_is_not_found() {
    let h = Harness::new();
    let resp = h.support.get_ticket(Uuid::new_v4()).await;

    assert!(!resp.success);
    assert_eq!(resp.failure, Some(FailureKind::NotFound));
    assert_eq!(resp.error.as_deref(), Some("Support ticket not found"));
}

#[tokio::test]
async fn test_concurrent_tickets_spread_across_agents() {
    let h = Harness::new();
    let agents = [
        agent(AgentStatus::Online, 0),
        agent(AgentStatus::Online, 0),
        agent(AgentStatus::Online, 0),
    ];
    for a in &agents {
        h.memory.insert_agent(a);
    }

    let mut handles = Vec::new();
    for _ in 0..30 {
        let store = h.stores.support.clone();
        handles.push(tokio::spawn(async move {
            store.create_ticket(&ticket_input(Uuid::new_v4())).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let counts: Vec<i32> = h
        .stores
        .support
        .list_agents()
        .await
        .unwrap()
        .iter()
        .map(|a| a.active_tickets)
        .collect();
    assert_eq!(counts, vec![10, 10, 10]);
}

// ============================================================================
// Account managers
// ============================================================================

#[tokio::test]
async fn test_assignment_is_idempotent() {
    let h = Harness::new();
    let loaded = manager(AccountManagerStatus::Active, 12);
    let light = manager(AccountManagerStatus::Active, 3);
    let inactive = manager(AccountManagerStatus::Inactive, 0);
    for m in [&loaded, &light, &inactive] {
        h.memory.insert_account_manager(m);
    }

    let user_id = Uuid::new_v4();
    let first = h.account_managers.assign_account_manager(user_id).await.data.unwrap();
    let second = h.account_managers.assign_account_manager(user_id).await.data.unwrap();

    assert_eq!(first.manager.id, light.id);
    assert_eq!(first.manager.total_clients, 4);
    assert_eq!(first, second);

    let assigned = h.account_managers.get_assigned_manager(user_id).await;
    assert_eq!(assigned.data.unwrap(), Some(first));
}

#[tokio::test]
async fn test_unassigned_user_reads_null() {
    let h = Harness::new();
    let resp = h.account_managers.get_assigned_manager(Uuid::new_v4()).await;

    assert!(resp.success);
    assert_eq!(resp.data, Some(None));
}

#[tokio::test]
async fn test_assignment_without_active_manager_fails() {
    let h = Harness::new();
    h.memory
        .insert_account_manager(&manager(AccountManagerStatus::Inactive, 0));

    let resp = h.account_managers.assign_account_manager(Uuid::new_v4()).await;

    assert!(!resp.success);
    assert_eq!(resp.failure, Some(FailureKind::NotFound));
    assert_eq!(resp.error.as_deref(), Some("No available account manager"));
}

#[tokio::test]
async fn test_meetings_and_messages() {
    let h = Harness::new();
    let m = manager(AccountManagerStatus::Active, 0);
    h.memory.insert_account_manager(&m);
    let user_id = Uuid::new_v4();

    let past = h
        .account_managers
        .schedule_meeting(CreateMeetingInput {
            user_id,
            account_manager_id: m.id,
            title: "Provisional tax review".to_string(),
            scheduled_at: Utc::now() - Duration::hours(1),
            duration_minutes: 30,
            notes: None,
        })
        .await;
    assert_eq!(past.failure, Some(FailureKind::Invalid));

    let meeting = h
        .account_managers
        .schedule_meeting(CreateMeetingInput {
            user_id,
            account_manager_id: m.id,
            title: "Provisional tax review".to_string(),
            scheduled_at: Utc::now() + Duration::days(2),
            duration_minutes: 45,
            notes: Some("Bring IRP6 workings".to_string()),
        })
        .await
        .data
        .unwrap();

    let listed = h.account_managers.get_meetings(user_id).await.data.unwrap();
    assert_eq!(listed, vec![meeting.clone()]);

    let message = |sender, content: &str| CreateMessageInput {
        user_id,
        account_manager_id: m.id,
        sender,
        content: content.to_string(),
    };
    assert!(h.account_managers.send_message(message(MessageSender::User, "Hi")).await.success);
    assert!(h.account_managers.send_message(message(MessageSender::Manager, "Hello")).await.success);
    assert!(h.account_managers.send_message(message(MessageSender::Manager, "Docs?")).await.success);

    let thread = h.account_managers.get_messages(user_id).await.data.unwrap();
    assert_eq!(thread.len(), 3);

    assert_eq!(h.account_managers.mark_messages_read(user_id).await.data, Some(2));
    assert_eq!(h.account_managers.mark_messages_read(user_id).await.data, Some(0));
}

#[tokio::test]
async fn test_meeting_with_unknown_manager_is_not_found() {
    let h = Harness::new();
    let resp = h
        .account_managers
        .schedule_meeting(CreateMeetingInput {
            user_id: Uuid::new_v4(),
            account_manager_id: Uuid::new_v4(),
            title: "Intro".to_string(),
            scheduled_at: Utc::now() + Duration::days(1),
            duration_minutes: 30,
            notes: None,
        })
        .await;

    assert_eq!(resp.failure, Some(FailureKind::NotFound));
}

#[tokio::test]
async fn test_concurrent_assignments_balance_load() {
    let h = Harness::new();
    let managers = [
        manager(AccountManagerStatus::Active, 0),
        manager(AccountManagerStatus::Active, 0),
    ];
    for m in &managers {
        h.memory.insert_account_manager(m);
    }

    let mut handles = Vec::new();
    for _ in 0..20 {
        let api = h.account_managers.clone();
        handles.push(tokio::spawn(async move {
            api.assign_account_manager(Uuid::new_v4()).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().success);
    }

    let totals: Vec<i32> = h
        .account_managers
        .get_account_managers()
        .await
        .data
        .unwrap()
        .iter()
        .map(|m| m.total_clients)
        .collect();
    assert_eq!(totals, vec![10, 10]);
}

// ============================================================================
// Integrations
// ============================================================================

#[tokio::test]
async fn test_new_integration_is_inactive() {
    let h = Harness::new();
    let integration = h
        .integrations
        .create_integration(integration_input(Uuid::new_v4()))
        .await
        .data
        .unwrap();

    assert_eq!(integration.status, IntegrationStatus::Inactive);
    assert!(integration.last_sync.is_none());
}

#[tokio::test]
async fn test_delete_integration_writes_delete_log() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let integration = h
        .integrations
        .create_integration(integration_input(user_id))
        .await
        .data
        .unwrap();

    let resp = h.integrations.delete_integration(integration.id).await;
    assert_eq!(resp.data, Some(integration.id));

    h.dispatcher.flush().await;

    let logs = h
        .integrations
        .get_integration_logs(integration.id)
        .await
        .data
        .unwrap();
    assert!(logs
        .iter()
        .any(|l| l.action == IntegrationAction::Delete && l.status == IntegrationLogStatus::Success));
    assert!(logs.iter().any(|l| l.action == IntegrationAction::Create));

    let gone = h.integrations.get_integration(integration.id).await;
    assert_eq!(gone.failure, Some(FailureKind::NotFound));
    assert!(h.integrations.get_integrations(user_id).await.data.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_missing_integration_is_not_found() {
    let h = Harness::new();
    let resp = h.integrations.delete_integration(Uuid::new_v4()).await;

    assert!(!resp.success);
    assert_eq!(resp.failure, Some(FailureKind::NotFound));
}

#[tokio::test]
async fn test_sync_and_test_integration() {
    let h = Harness::new();
    let integration = h
        .integrations
        .create_integration(integration_input(Uuid::new_v4()))
        .await
        .data
        .unwrap();

    let tested = h.integrations.test_integration(integration.id).await.data.unwrap();
    assert_eq!(tested.integration_id, integration.id);

    let synced = h.integrations.sync_integration(integration.id).await.data.unwrap();
    assert_eq!(synced.status, IntegrationStatus::Active);
    assert!(synced.last_sync.is_some());

    let disabled = h
        .integrations
        .update_integration(integration.id, object(json!({"enabled": false})))
        .await
        .data
        .unwrap();
    assert!(!disabled.enabled);

    let refused = h.integrations.sync_integration(integration.id).await;
    assert_eq!(refused.failure, Some(FailureKind::Invalid));

    h.dispatcher.flush().await;
    let logs = h
        .integrations
        .get_integration_logs(integration.id)
        .await
        .data
        .unwrap();
    assert!(logs
        .iter()
        .any(|l| l.action == IntegrationAction::Sync && l.status == IntegrationLogStatus::Error));
}

// ============================================================================
// Compliance
// ============================================================================

#[tokio::test]
async fn test_requirements_follow_framework() {
    let h = Harness::new();
    let framework = h
        .compliance
        .create_framework(CreateFrameworkInput {
            name: "POPIA".to_string(),
            description: Some("Protection of Personal Information Act".to_string()),
            version: Some("2021".to_string()),
            status: FrameworkStatus::Active,
            compliance_score: 0.0,
        })
        .await
        .data
        .unwrap();

    let requirement = |code: &str| CreateRequirementInput {
        framework_id: framework.id,
        code: code.to_string(),
        title: "Security safeguards".to_string(),
        description: None,
        status: RequirementStatus::NotAssessed,
        evidence: None,
        due_date: None,
    };

    assert!(h.compliance.create_requirement(requirement("POPIA-19")).await.success);
    let duplicate = h.compliance.create_requirement(requirement("POPIA-19")).await;
    assert_eq!(duplicate.failure, Some(FailureKind::Conflict));

    let bad_code = h.compliance.create_requirement(requirement("popia 19")).await;
    assert_eq!(bad_code.failure, Some(FailureKind::Invalid));

    let reread = h.compliance.get_framework(framework.id).await.data.unwrap();
    assert_eq!(reread.requirements_count, 1);

    assert_eq!(
        h.compliance.delete_framework(framework.id).await.data,
        Some(framework.id)
    );
    assert!(h
        .compliance
        .get_requirements(framework.id)
        .await
        .data
        .unwrap()
        .is_empty());

    h.dispatcher.flush().await;
    let query = ListAuditLogsQuery {
        resource_id: Some(framework.id.to_string()),
        ..Default::default()
    };
    let entries = h.audit.get_audit_logs(&query).await.data.unwrap();
    let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
    assert!(actions.contains(&"create"));
    assert!(actions.contains(&"delete"));
}

#[tokio::test]
async fn test_framework_and_requirement_patches_clear_nullable_fields() {
    let h = Harness::new();
    let framework = h
        .compliance
        .create_framework(CreateFrameworkInput {
            name: "SARS Tax Administration Act".to_string(),
            description: Some("Record keeping duties".to_string()),
            version: Some("2011".to_string()),
            status: FrameworkStatus::Active,
            compliance_score: 40.0,
        })
        .await
        .data
        .unwrap();

    let assessed = h
        .compliance
        .update_framework(framework.id, object(json!({"lastAssessment": Utc::now()})))
        .await
        .data
        .unwrap();
    assert!(assessed.last_assessment.is_some());

    let cleared = h
        .compliance
        .update_framework(
            framework.id,
            object(json!({"description": null, "version": null, "lastAssessment": null})),
        )
        .await;
    assert!(cleared.success, "{:?}", cleared.error);
    let cleared = cleared.data.unwrap();
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.version, None);
    assert_eq!(cleared.last_assessment, None);
    assert_eq!(cleared.name, framework.name);

    let requirement = h
        .compliance
        .create_requirement(CreateRequirementInput {
            framework_id: framework.id,
            code: "TAA-29".to_string(),
            title: "Retain records for five years".to_string(),
            description: Some("Section 29".to_string()),
            status: RequirementStatus::Partial,
            evidence: Some("Archive policy".to_string()),
            due_date: Some(Utc::now() + Duration::days(30)),
        })
        .await
        .data
        .unwrap();

    let cleared = h
        .compliance
        .update_requirement(
            requirement.id,
            object(json!({"evidence": null, "dueDate": null, "description": null})),
        )
        .await;
    assert!(cleared.success, "{:?}", cleared.error);
    let cleared = cleared.data.unwrap();
    assert_eq!(cleared.evidence, None);
    assert_eq!(cleared.due_date, None);
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.status, RequirementStatus::Partial);

    let required = h
        .compliance
        .update_requirement(requirement.id, object(json!({"title": null})))
        .await;
    assert_eq!(required.failure, Some(FailureKind::Invalid));
}

#[tokio::test]
async fn test_requirement_for_unknown_framework_is_not_found() {
    let h = Harness::new();
    let resp = h
        .compliance
        .create_requirement(CreateRequirementInput {
            framework_id: Uuid::new_v4(),
            code: "SARS-1".to_string(),
            title: "Record keeping".to_string(),
            description: None,
            status: RequirementStatus::Compliant,
            evidence: None,
            due_date: None,
        })
        .await;

    assert_eq!(resp.failure, Some(FailureKind::NotFound));
}
