mod common;

use chrono::Utc;
use relo_portal_server::{PortalError, Storage};

#[tokio::test]
async fn provisioning_creates_the_full_chain_with_placeholders() {
    let state = common::app_state_with_memory();

    let provisioned = state
        .provisioning
        .provision_client("cliente@test.com", "temporal1")
        .await
        .expect("provisioning should succeed");

    assert!(provisioned.client_id > 0);
    assert_eq!(provisioned.username, "cliente");

    // Profile row exists, role client, active
    let profile = state
        .storage
        .get_profile(&provisioned.identity_id)
        .await
        .unwrap()
        .expect("profile row must exist");
    assert_eq!(profile.email, "cliente@test.com");
    assert!(profile.is_active);

    // Client record carries the placeholder policy
    let record = state
        .storage
        .get_client_by_identity(&provisioned.identity_id)
        .await
        .unwrap()
        .expect("client record must exist");
    assert_eq!(record.id, provisioned.client_id);
    assert_eq!(record.full_name, "cliente@test.com");
    assert!(record.passport_number.starts_with("TEMP-"));
    assert_eq!(record.phone, "000000000");
    assert_eq!(record.date_of_birth, Utc::now().date_naive());
    assert!(record.created_by_admin);
    assert!(!record.first_login_completed);
    assert!(!record.has_completed_form);
}

#[tokio::test]
async fn resubmitting_an_email_reports_already_registered_without_writes() {
    let state = common::app_state_with_memory();

    state
        .provisioning
        .provision_client("cliente@test.com", "temporal1")
        .await
        .unwrap();

    let err = state
        .provisioning
        .provision_client("cliente@test.com", "otraclave2")
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::AlreadyRegistered(_)));

    // No second client row appeared
    let clients = state.storage.list_clients(10).await.unwrap();
    assert_eq!(clients.len(), 1);
}

#[tokio::test]
async fn username_collisions_point_the_admin_at_a_different_email() {
    let state = common::app_state_with_memory();

    state
        .provisioning
        .provision_client("ana@empresa-uno.com", "temporal1")
        .await
        .unwrap();

    let err = state
        .provisioning
        .provision_client("ana@empresa-dos.com", "temporal1")
        .await
        .unwrap_err();

    match err {
        PortalError::DuplicateUsername(msg) => assert!(msg.contains("different email")),
        other => panic!("expected DuplicateUsername, got {:?}", other),
    }

    // The orphaned identity from the failed run is reported, not rolled back:
    // logging in with it fails only because the profile chain is missing.
    let clients = state.storage.list_clients(10).await.unwrap();
    assert_eq!(clients.len(), 1);
}
