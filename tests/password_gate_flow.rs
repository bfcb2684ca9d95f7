mod common;

use chrono::NaiveDate;
use relo_portal_server::models::ClientFormData;
use relo_portal_server::services::ChangePasswordRequest;
use relo_portal_server::{GateState, IdentityProvider, PortalError, Storage};

#[tokio::test]
async fn admin_provisioned_client_changes_password_on_first_login() {
    let state = common::app_state_with_memory();

    // Admin provisions the account
    let provisioned = state
        .provisioning
        .provision_client("cliente@test.com", "temporal1")
        .await
        .unwrap();

    // Client logs in with the temporary password
    let login = state
        .sessions
        .login("cliente@test.com", "temporal1")
        .await
        .unwrap();
    assert_eq!(login.identity_id, provisioned.identity_id);
    let session = state.sessions.authenticate(&login.token).await.unwrap();

    // Gate finds the change required
    assert_eq!(
        state.gate.check(&session.identity_id).await.unwrap(),
        GateState::Required
    );

    // Client submits the new password
    let request = ChangePasswordRequest {
        current_password: Some("temporal1".to_string()),
        new_password: "NuevoPass1".to_string(),
        confirm_password: "NuevoPass1".to_string(),
    };
    assert_eq!(
        state.gate.change_password(&session, &request).await.unwrap(),
        GateState::Changed
    );

    // Flag flipped, gate stays closed on the next activation
    let record = state
        .storage
        .get_client_by_identity(&session.identity_id)
        .await
        .unwrap()
        .unwrap();
    assert!(record.first_login_completed);
    assert_eq!(
        state.gate.check(&session.identity_id).await.unwrap(),
        GateState::NotRequired
    );

    // The old credential is dead and the new one works
    assert!(state
        .sessions
        .login("cliente@test.com", "temporal1")
        .await
        .is_err());
    assert!(state
        .sessions
        .login("cliente@test.com", "NuevoPass1")
        .await
        .is_ok());
}

#[tokio::test]
async fn mismatch_and_weak_passwords_keep_the_gate_open() {
    let state = common::app_state_with_memory();

    state
        .provisioning
        .provision_client("cliente@test.com", "temporal1")
        .await
        .unwrap();
    let login = state
        .sessions
        .login("cliente@test.com", "temporal1")
        .await
        .unwrap();
    let session = state.sessions.authenticate(&login.token).await.unwrap();
    state.gate.check(&session.identity_id).await.unwrap();

    // Mismatched confirmation
    let mismatch = ChangePasswordRequest {
        current_password: Some("temporal1".to_string()),
        new_password: "NuevoPass1".to_string(),
        confirm_password: "NuevoPass2".to_string(),
    };
    assert!(matches!(
        state.gate.change_password(&session, &mismatch).await.unwrap_err(),
        PortalError::Validation(_)
    ));

    // Policy violation ("abc123" is below the strict policy)
    let weak = ChangePasswordRequest {
        current_password: Some("temporal1".to_string()),
        new_password: "abc123".to_string(),
        confirm_password: "abc123".to_string(),
    };
    assert!(matches!(
        state.gate.change_password(&session, &weak).await.unwrap_err(),
        PortalError::WeakCredential(_)
    ));

    // Still gated, still able to log in with the temporary password
    assert_eq!(state.gate.state_of(&session.identity_id), GateState::Required);
    assert!(state
        .sessions
        .login("cliente@test.com", "temporal1")
        .await
        .is_ok());
}

#[tokio::test]
async fn completed_form_replaces_the_placeholders() {
    let state = common::app_state_with_memory();

    let provisioned = state
        .provisioning
        .provision_client("cliente@test.com", "temporal1")
        .await
        .unwrap();

    let form = ClientFormData {
        full_name: "María López".to_string(),
        passport_number: "XDA441502".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1991, 7, 23).unwrap(),
        phone: "611222333".to_string(),
        current_job: "Care assistant".to_string(),
        agency: Some("Agencia Norte".to_string()),
    };
    state
        .storage
        .update_client_form(&provisioned.identity_id, &form)
        .await
        .unwrap();

    let record = state
        .storage
        .get_client_by_identity(&provisioned.identity_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.full_name, "María López");
    assert!(!record.passport_number.starts_with("TEMP-"));
    assert!(record.has_completed_form);
    assert!(!record.has_placeholder_passport());
}

#[tokio::test]
async fn gate_never_opens_for_accounts_the_admin_did_not_create() {
    let state = common::app_state_with_memory();

    // A record that exists but was not admin-provisioned
    let identity = state
        .provider
        .create_identity("walkin@test.com", "supassword1")
        .await
        .unwrap();
    let mut record =
        relo_portal_server::models::ClientRecord::admin_provisioned(&identity.id, "walkin@test.com");
    record.created_by_admin = false;
    state.storage.insert_client(&record).await.unwrap();

    assert_eq!(
        state.gate.check(&identity.id).await.unwrap(),
        GateState::NotRequired
    );
}
