use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use thiserror::Error;
use tracing::error;

use empdir_core::mapper;
use empdir_core::types::EmployeeDto;
use empdir_core::validate::validate_employee;
use empdir_storage::{Database, EmployeeStoreError};

/// Orchestrates the employee record lifecycle: mapping, validation, email
/// uniqueness, and delegation to the document store.
///
/// Holds no state beyond the storage handle and a clock; every operation
/// takes and returns wire representations.
#[derive(Clone)]
pub struct EmployeeService {
    database: Database,
    clock: Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>,
}

impl EmployeeService {
    pub fn new(database: Database) -> Self {
        Self {
            database,
            clock: Arc::new(Utc::now),
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Lists every stored record.
    ///
    /// An empty store is reported as an operation failure rather than an
    /// empty list, matching the upstream contract this service replaces.
    pub async fn list_all(&self) -> Result<Vec<EmployeeDto>, EmployeeServiceError> {
        let result = self.list_all_inner().await;
        record_operation("list_all", result)
    }

    async fn list_all_inner(&self) -> Result<Vec<EmployeeDto>, EmployeeServiceError> {
        let documents = self
            .database
            .employees()
            .find_all()
            .await
            .map_err(|err| {
                storage_failure("failed to list employees", "Unable to fetch employees", err)
            })?;

        if documents.is_empty() {
            return Err(EmployeeServiceError::Operation(
                "No employees found".to_string(),
            ));
        }

        Ok(mapper::employees_to_dtos(documents))
    }

    /// Fetches a single record by id.
    pub async fn get_by_id(&self, id: &str) -> Result<EmployeeDto, EmployeeServiceError> {
        let result = self.get_by_id_inner(id).await;
        record_operation("get_by_id", result)
    }

    async fn get_by_id_inner(&self, id: &str) -> Result<EmployeeDto, EmployeeServiceError> {
        let document = self
            .database
            .employees()
            .find_by_id(id)
            .await
            .map_err(|err| {
                storage_failure("failed to load employee", "Unable to fetch employee", err)
            })?
            .ok_or_else(|| {
                EmployeeServiceError::NotFound(format!("Employee with id {id} not found"))
            })?;

        Ok(mapper::employee_to_dto(document))
    }

    /// Fetches a single record by its unique email.
    pub async fn get_by_email(&self, email: &str) -> Result<EmployeeDto, EmployeeServiceError> {
        let result = self.get_by_email_inner(email).await;
        record_operation("get_by_email", result)
    }

    async fn get_by_email_inner(&self, email: &str) -> Result<EmployeeDto, EmployeeServiceError> {
        let document = self
            .database
            .employees()
            .find_by_email(email)
            .await
            .map_err(|err| {
                storage_failure("failed to load employee", "Unable to fetch employee", err)
            })?
            .ok_or_else(|| {
                EmployeeServiceError::NotFound(format!("Employee with email {email} not found"))
            })?;

        Ok(mapper::employee_to_dto(document))
    }

    /// Creates a new record, assigning a storage-generated id.
    ///
    /// Validation failures surface before any storage access. The email
    /// pre-check gives a friendly conflict error; the unique index behind
    /// [`EmployeeStoreError::DuplicateEmail`] closes the remaining race
    /// between the check and the insert.
    pub async fn create(&self, employee: EmployeeDto) -> Result<EmployeeDto, EmployeeServiceError> {
        let result = self.create_inner(employee).await;
        record_operation("create", result)
    }

    async fn create_inner(
        &self,
        employee: EmployeeDto,
    ) -> Result<EmployeeDto, EmployeeServiceError> {
        let document = mapper::employee_to_document(employee);
        validate_employee(&document)
            .map_err(|err| EmployeeServiceError::InvalidData(err.message.to_string()))?;

        let repo = self.database.employees();
        let email = document.email.clone();

        let existing = repo
            .find_by_email(&email)
            .await
            .map_err(|err| {
                storage_failure("failed to check email", "Unable to create employee", err)
            })?;
        if existing.is_some() {
            return Err(already_exists(&email));
        }

        let saved = repo
            .save(document, self.now())
            .await
            .map_err(|err| match err {
                EmployeeStoreError::DuplicateEmail => already_exists(&email),
                other => {
                    storage_failure("failed to insert employee", "Unable to create employee", other)
                }
            })?;

        Ok(mapper::employee_to_dto(saved))
    }

    /// Replaces the mutable fields of an existing record.
    ///
    /// The email check skips the record being updated, so keeping an
    /// unchanged email does not self-conflict.
    pub async fn update(
        &self,
        id: &str,
        employee: EmployeeDto,
    ) -> Result<EmployeeDto, EmployeeServiceError> {
        let result = self.update_inner(id, employee).await;
        record_operation("update", result)
    }

    async fn update_inner(
        &self,
        id: &str,
        employee: EmployeeDto,
    ) -> Result<EmployeeDto, EmployeeServiceError> {
        let incoming = mapper::employee_to_document(employee);
        validate_employee(&incoming)
            .map_err(|err| EmployeeServiceError::InvalidData(err.message.to_string()))?;

        let repo = self.database.employees();

        let mut existing = repo
            .find_by_id(id)
            .await
            .map_err(|err| {
                storage_failure("failed to load employee", "Unable to update employee", err)
            })?
            .ok_or_else(|| {
                EmployeeServiceError::NotFound(format!("Employee with id {id} not found"))
            })?;

        let email = incoming.email.clone();
        let email_owner = repo
            .find_by_email(&email)
            .await
            .map_err(|err| {
                storage_failure("failed to check email", "Unable to update employee", err)
            })?;
        if let Some(owner) = email_owner {
            if owner.id.as_deref() != Some(id) {
                return Err(already_exists(&email));
            }
        }

        existing.first_name = incoming.first_name;
        existing.last_name = incoming.last_name;
        existing.email = incoming.email;
        existing.address = incoming.address;
        existing.phones = incoming.phones;

        let saved = repo
            .save(existing, self.now())
            .await
            .map_err(|err| match err {
                EmployeeStoreError::DuplicateEmail => already_exists(&email),
                other => {
                    storage_failure("failed to replace employee", "Unable to update employee", other)
                }
            })?;

        Ok(mapper::employee_to_dto(saved))
    }

    /// Deletes an existing record.
    pub async fn delete(&self, id: &str) -> Result<(), EmployeeServiceError> {
        let result = self.delete_inner(id).await;
        record_operation("delete", result)
    }

    async fn delete_inner(&self, id: &str) -> Result<(), EmployeeServiceError> {
        let repo = self.database.employees();

        let document = repo
            .find_by_id(id)
            .await
            .map_err(|err| {
                storage_failure("failed to load employee", "Unable to delete employee", err)
            })?
            .ok_or_else(|| {
                EmployeeServiceError::NotFound(format!("Employee with id {id} not found"))
            })?;

        repo.delete(&document).await.map_err(|err| {
            storage_failure("failed to delete employee", "Unable to delete employee", err)
        })?;

        Ok(())
    }
}

/// Domain error taxonomy surfaced to the HTTP boundary.
#[derive(Debug, Error)]
pub enum EmployeeServiceError {
    #[error("{0}")]
    InvalidData(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    AlreadyExists(String),
    #[error("{0}")]
    Operation(String),
}

impl EmployeeServiceError {
    /// Short category label used in error payloads and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidData(_) => "invalid_data",
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::Operation(_) => "operation_failed",
        }
    }
}

fn already_exists(email: &str) -> EmployeeServiceError {
    EmployeeServiceError::AlreadyExists(format!("Employee with email {email} already exists"))
}

/// Wraps a storage failure into a generic operation error. The underlying
/// cause is logged here and never leaked to the caller.
fn storage_failure(
    context: &'static str,
    message: &'static str,
    err: EmployeeStoreError,
) -> EmployeeServiceError {
    error!(stage = "service", error = %err, "{context}");
    EmployeeServiceError::Operation(message.to_string())
}

fn record_operation<T>(
    operation: &'static str,
    result: Result<T, EmployeeServiceError>,
) -> Result<T, EmployeeServiceError> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(err) => err.kind(),
    };
    counter!("employee_requests_total", "operation" => operation, "result" => outcome)
        .increment(1);
    result
}
