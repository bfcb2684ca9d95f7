use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::constants::{PLACEHOLDER_PASSPORT_PREFIX, PLACEHOLDER_PHONE};

/// Service-client record holding case data and onboarding flags.
///
/// A client record always references an identity whose profile row already
/// exists; the provisioning workflow enforces the creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    /// generated row id (0 until inserted)
    pub id: u64,
    /// external identity id
    pub identity_id: String,
    /// email address
    pub email: String,
    /// full name
    pub full_name: String,
    /// passport number
    pub passport_number: String,
    /// date of birth
    pub date_of_birth: NaiveDate,
    /// phone number
    pub phone: String,
    /// current job
    pub current_job: String,
    /// recruiting agency, if any
    pub agency: Option<String>,
    /// whether the client completed the profile form
    pub has_completed_form: bool,
    /// whether the record was provisioned by an administrator
    pub created_by_admin: bool,
    /// whether the forced first-login password change finished
    pub first_login_completed: bool,
    /// creation time
    pub created_at: DateTime<Utc>,
    /// update time
    pub updated_at: DateTime<Utc>,
}

impl ClientRecord {
    /// Build the record inserted by the provisioning workflow.
    ///
    /// Admin-provisioned rows start with non-null placeholders: the full name
    /// repeats the email, the passport number is the TEMP prefix plus the
    /// creation timestamp, the date of birth is the provisioning date and the
    /// phone is a fixed literal. The client overwrites all of them when
    /// completing the profile form.
    pub fn admin_provisioned(identity_id: &str, email: &str) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            identity_id: identity_id.to_string(),
            email: email.to_string(),
            full_name: email.to_string(),
            passport_number: format!("{}{}", PLACEHOLDER_PASSPORT_PREFIX, now.timestamp()),
            date_of_birth: now.date_naive(),
            phone: PLACEHOLDER_PHONE.to_string(),
            current_job: String::new(),
            agency: None,
            has_completed_form: false,
            created_by_admin: true,
            first_login_completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the record still carries the provisioning placeholders
    pub fn has_placeholder_passport(&self) -> bool {
        self.passport_number.starts_with(PLACEHOLDER_PASSPORT_PREFIX)
    }
}

/// Fields the client submits when completing the profile form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientFormData {
    pub full_name: String,
    pub passport_number: String,
    pub date_of_birth: NaiveDate,
    pub phone: String,
    pub current_job: String,
    #[serde(default)]
    pub agency: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_provisioned_record_carries_placeholders() {
        let record = ClientRecord::admin_provisioned("id-1", "cliente@test.com");
        assert_eq!(record.full_name, "cliente@test.com");
        assert!(record.passport_number.starts_with("TEMP-"));
        assert_eq!(record.phone, PLACEHOLDER_PHONE);
        assert_eq!(record.date_of_birth, Utc::now().date_naive());
        assert!(record.created_by_admin);
        assert!(!record.first_login_completed);
        assert!(!record.has_completed_form);
        assert!(record.has_placeholder_passport());
    }
}
