use chrono::{DateTime, NaiveDate, Utc};
use mysql_async::prelude::*;
use mysql_async::{Row, Value};
use tracing::debug;

use crate::models::{ClientFormData, ClientRecord};
use crate::storage::mysql::{map_mysql_error, MySqlStorage};
use crate::storage::{Result, StorageError};

/// Client-record operations on the MySQL backend
pub trait MySqlClientExt {
    async fn insert_client(&self, client: &ClientRecord) -> Result<u64>;
    async fn get_client_by_identity(&self, identity_id: &str) -> Result<Option<ClientRecord>>;
    async fn get_client_by_id(&self, client_id: u64) -> Result<Option<ClientRecord>>;
    async fn list_clients(&self, limit: u32) -> Result<Vec<ClientRecord>>;
    async fn update_client_form(&self, identity_id: &str, form: &ClientFormData) -> Result<()>;
    async fn set_first_login_completed(&self, identity_id: &str) -> Result<()>;
}

// Dates travel as formatted strings so the driver needs no calendar-type
// integration; MySQL coerces them into the DATE column.
const SELECT_CLIENT: &str = r"SELECT
        id, identity_id, email, full_name, passport_number,
        DATE_FORMAT(date_of_birth, '%Y-%m-%d') AS date_of_birth,
        phone, current_job, agency,
        has_completed_form, created_by_admin, first_login_completed,
        created_at, updated_at
      FROM clients";

// The row is wider than the driver's typed-tuple support, so columns are
// pulled out of the raw row one by one.
fn column<T>(row: &mut Row, index: usize, name: &str) -> Result<T>
where
    T: FromValue,
{
    row.take_opt::<T, usize>(index)
        .ok_or_else(|| StorageError::InvalidData(format!("Missing column {}", name)))?
        .map_err(|e| StorageError::InvalidData(format!("Invalid value in column {}: {:?}", name, e)))
}

fn client_from_row(mut row: Row) -> Result<ClientRecord> {
    let id: u64 = column(&mut row, 0, "id")?;
    let identity_id: String = column(&mut row, 1, "identity_id")?;
    let email: String = column(&mut row, 2, "email")?;
    let full_name: String = column(&mut row, 3, "full_name")?;
    let passport_number: String = column(&mut row, 4, "passport_number")?;
    let date_of_birth: String = column(&mut row, 5, "date_of_birth")?;
    let phone: String = column(&mut row, 6, "phone")?;
    let current_job: String = column(&mut row, 7, "current_job")?;
    let agency: Option<String> = column(&mut row, 8, "agency")?;
    let has_completed_form: bool = column(&mut row, 9, "has_completed_form")?;
    let created_by_admin: bool = column(&mut row, 10, "created_by_admin")?;
    let first_login_completed: bool = column(&mut row, 11, "first_login_completed")?;
    let created_at: i64 = column(&mut row, 12, "created_at")?;
    let updated_at: i64 = column(&mut row, 13, "updated_at")?;

    let date_of_birth = NaiveDate::parse_from_str(&date_of_birth, "%Y-%m-%d")
        .map_err(|e| StorageError::InvalidData(format!("Invalid date_of_birth: {}", e)))?;
    let created_at = DateTime::from_timestamp(created_at, 0)
        .ok_or_else(|| StorageError::InvalidData("Invalid created_at timestamp".to_string()))?;
    let updated_at = DateTime::from_timestamp(updated_at, 0)
        .ok_or_else(|| StorageError::InvalidData("Invalid updated_at timestamp".to_string()))?;

    Ok(ClientRecord {
        id,
        identity_id,
        email,
        full_name,
        passport_number,
        date_of_birth,
        phone,
        current_job,
        agency,
        has_completed_form,
        created_by_admin,
        first_login_completed,
        created_at,
        updated_at,
    })
}

impl MySqlClientExt for MySqlStorage {
    async fn insert_client(&self, client: &ClientRecord) -> Result<u64> {
        let mut conn = self.get_pool().get_conn().await.map_err(|e| {
            StorageError::Connection(format!("Failed to get connection: {}", e))
        })?;

        conn.exec_drop(
            r"INSERT INTO clients (
                identity_id, email, full_name, passport_number, date_of_birth,
                phone, current_job, agency, has_completed_form,
                created_by_admin, first_login_completed, created_at, updated_at
              ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            // 13 bound params exceed mysql_async's tuple Into<Params> impl
            // (max 12), so the identical values are passed as positional Values.
            vec![
                Value::from(client.identity_id.clone()),
                Value::from(client.email.clone()),
                Value::from(client.full_name.clone()),
                Value::from(client.passport_number.clone()),
                Value::from(client.date_of_birth.format("%Y-%m-%d").to_string()),
                Value::from(client.phone.clone()),
                Value::from(client.current_job.clone()),
                Value::from(client.agency.clone()),
                Value::from(client.has_completed_form),
                Value::from(client.created_by_admin),
                Value::from(client.first_login_completed),
                Value::from(client.created_at.timestamp()),
                Value::from(client.updated_at.timestamp()),
            ],
        )
        .await
        .map_err(|e| map_mysql_error("Failed to insert client", e))?;

        let client_id = conn.last_insert_id().ok_or_else(|| {
            StorageError::Database("Insert returned no generated id".to_string())
        })?;

        debug!("Inserted client {} for identity {}", client_id, client.identity_id);
        Ok(client_id)
    }

    async fn get_client_by_identity(&self, identity_id: &str) -> Result<Option<ClientRecord>> {
        let mut conn = self.get_pool().get_conn().await.map_err(|e| {
            StorageError::Connection(format!("Failed to get connection: {}", e))
        })?;

        let row: Option<Row> = conn
            .exec_first(
                format!("{} WHERE identity_id = ?", SELECT_CLIENT),
                (identity_id,),
            )
            .await
            .map_err(|e| StorageError::Database(format!("Failed to query client: {}", e)))?;

        row.map(client_from_row).transpose()
    }

    async fn get_client_by_id(&self, client_id: u64) -> Result<Option<ClientRecord>> {
        let mut conn = self.get_pool().get_conn().await.map_err(|e| {
            StorageError::Connection(format!("Failed to get connection: {}", e))
        })?;

        let row: Option<Row> = conn
            .exec_first(format!("{} WHERE id = ?", SELECT_CLIENT), (client_id,))
            .await
            .map_err(|e| StorageError::Database(format!("Failed to query client: {}", e)))?;

        row.map(client_from_row).transpose()
    }

    async fn list_clients(&self, limit: u32) -> Result<Vec<ClientRecord>> {
        let mut conn = self.get_pool().get_conn().await.map_err(|e| {
            StorageError::Connection(format!("Failed to get connection: {}", e))
        })?;

        let rows: Vec<Row> = conn
            .exec(
                format!("{} ORDER BY created_at DESC LIMIT ?", SELECT_CLIENT),
                (limit,),
            )
            .await
            .map_err(|e| StorageError::Database(format!("Failed to list clients: {}", e)))?;

        rows.into_iter().map(client_from_row).collect()
    }

    async fn update_client_form(&self, identity_id: &str, form: &ClientFormData) -> Result<()> {
        let mut conn = self.get_pool().get_conn().await.map_err(|e| {
            StorageError::Connection(format!("Failed to get connection: {}", e))
        })?;

        conn.exec_drop(
            r"UPDATE clients SET
                full_name = ?,
                passport_number = ?,
                date_of_birth = ?,
                phone = ?,
                current_job = ?,
                agency = ?,
                has_completed_form = TRUE,
                updated_at = ?
              WHERE identity_id = ?",
            (
                &form.full_name,
                &form.passport_number,
                form.date_of_birth.format("%Y-%m-%d").to_string(),
                &form.phone,
                &form.current_job,
                &form.agency,
                Utc::now().timestamp(),
                identity_id,
            ),
        )
        .await
        .map_err(|e| StorageError::Database(format!("Failed to update client: {}", e)))?;

        if conn.affected_rows() == 0 {
            return Err(StorageError::NotFound(format!(
                "No client record for identity {}",
                identity_id
            )));
        }

        Ok(())
    }

    async fn set_first_login_completed(&self, identity_id: &str) -> Result<()> {
        let mut conn = self.get_pool().get_conn().await.map_err(|e| {
            StorageError::Connection(format!("Failed to get connection: {}", e))
        })?;

        conn.exec_drop(
            r"UPDATE clients SET first_login_completed = TRUE, updated_at = ?
              WHERE identity_id = ?",
            (Utc::now().timestamp(), identity_id),
        )
        .await
        .map_err(|e| StorageError::Database(format!("Failed to update client: {}", e)))?;

        if conn.affected_rows() == 0 {
            return Err(StorageError::NotFound(format!(
                "No client record for identity {}",
                identity_id
            )));
        }

        Ok(())
    }
}
