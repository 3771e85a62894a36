//! Equipment, new-employee, and new-student request endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::{with_query, ApiClient};
use crate::error::ApiError;
use crate::models::{EmployeeRequest, EquipmentRequest, ProvisioningField, StudentRequest};
use crate::query::RecordSource;

/// Search-only filter shared by the three request lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestFilters {
    pub search: String,
}

fn list_endpoint(base: &str, filters: &RequestFilters) -> String {
    with_query(base, &[("search", filters.search.as_str())])
}

// --- Equipment requests ---

#[derive(Debug, Clone, Serialize)]
pub struct NewEquipmentRequest {
    pub name: String,
    pub event: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub equipment: String,
    pub description: String,
    pub return_date: String,
    pub return_time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EquipmentUpdate {
    pub message: String,
    pub request: EquipmentRequest,
}

pub async fn create_equipment(
    client: &ApiClient,
    request: &NewEquipmentRequest,
) -> Result<EquipmentRequest, ApiError> {
    client.post_json("/requests/equipment", request).await
}

pub async fn list_equipment(
    client: &ApiClient,
    filters: &RequestFilters,
) -> Result<Vec<EquipmentRequest>, ApiError> {
    client
        .get(&list_endpoint("/requests/equipment", filters))
        .await
}

pub async fn get_equipment(
    client: &ApiClient,
    request_id: &str,
) -> Result<EquipmentRequest, ApiError> {
    client.get(&format!("/requests/equipment/{request_id}")).await
}

pub async fn approve_equipment(
    client: &ApiClient,
    request_id: &str,
) -> Result<EquipmentUpdate, ApiError> {
    client
        .put_empty(&format!("/requests/equipment/{request_id}/approve"))
        .await
}

pub async fn deny_equipment(
    client: &ApiClient,
    request_id: &str,
) -> Result<EquipmentUpdate, ApiError> {
    client
        .put_empty(&format!("/requests/equipment/{request_id}/deny"))
        .await
}

pub async fn close_equipment(
    client: &ApiClient,
    request_id: &str,
) -> Result<EquipmentUpdate, ApiError> {
    client
        .put_empty(&format!("/requests/equipment/{request_id}/close"))
        .await
}

// --- New-employee requests ---

#[derive(Debug, Clone, Serialize)]
pub struct NewEmployeeRequest {
    pub fname: String,
    pub lname: String,
    pub job_title: String,
    pub department: String,
    pub start_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeUpdate {
    pub message: String,
    pub request: EmployeeRequest,
}

pub async fn create_employee(
    client: &ApiClient,
    request: &NewEmployeeRequest,
) -> Result<EmployeeRequest, ApiError> {
    client.post_json("/requests/users", request).await
}

pub async fn list_employee(
    client: &ApiClient,
    filters: &RequestFilters,
) -> Result<Vec<EmployeeRequest>, ApiError> {
    client.get(&list_endpoint("/requests/users", filters)).await
}

pub async fn get_employee(
    client: &ApiClient,
    request_id: &str,
) -> Result<EmployeeRequest, ApiError> {
    client.get(&format!("/requests/users/{request_id}")).await
}

pub async fn close_employee(
    client: &ApiClient,
    request_id: &str,
) -> Result<EmployeeUpdate, ApiError> {
    client
        .put_empty(&format!("/requests/users/{request_id}/close"))
        .await
}

// --- New-student requests ---

#[derive(Debug, Clone, Serialize)]
pub struct NewStudentRequest {
    pub fname: String,
    pub lname: String,
    pub grade: String,
    pub teacher: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StudentUpdate {
    pub message: String,
    pub request: StudentRequest,
}

pub async fn create_student(
    client: &ApiClient,
    request: &NewStudentRequest,
) -> Result<StudentRequest, ApiError> {
    client.post_json("/requests/students", request).await
}

pub async fn list_student(
    client: &ApiClient,
    filters: &RequestFilters,
) -> Result<Vec<StudentRequest>, ApiError> {
    client
        .get(&list_endpoint("/requests/students", filters))
        .await
}

pub async fn get_student(
    client: &ApiClient,
    request_id: &str,
) -> Result<StudentRequest, ApiError> {
    client.get(&format!("/requests/students/{request_id}")).await
}

pub async fn close_student(
    client: &ApiClient,
    request_id: &str,
) -> Result<StudentUpdate, ApiError> {
    client
        .put_empty(&format!("/requests/students/{request_id}/close"))
        .await
}

/// Flip one provisioning checkbox on a student request.
pub async fn toggle_student_provisioning(
    client: &ApiClient,
    request_id: &str,
    field: ProvisioningField,
) -> Result<StudentUpdate, ApiError> {
    client
        .put_empty(&format!(
            "/requests/students/{request_id}/toggle/{}",
            field.as_str()
        ))
        .await
}

// --- List backing stores (no per-row enrichment on request lists) ---

macro_rules! request_directory {
    ($name:ident, $record:ty, $fetch:ident) => {
        pub struct $name {
            client: Arc<ApiClient>,
        }

        impl $name {
            pub fn new(client: Arc<ApiClient>) -> Self {
                Self { client }
            }
        }

        #[async_trait]
        impl RecordSource for $name {
            type Record = $record;
            type Filters = RequestFilters;

            async fn fetch_all(
                &self,
                filters: &RequestFilters,
            ) -> Result<Vec<$record>, ApiError> {
                $fetch(&self.client, filters).await
            }
        }
    };
}

request_directory!(EquipmentDirectory, EquipmentRequest, list_equipment);
request_directory!(EmployeeDirectory, EmployeeRequest, list_employee);
request_directory!(StudentDirectory, StudentRequest, list_student);
