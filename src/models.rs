//! Wire-shape data types for the DeskMate API.
//!
//! Timestamps arrive as ISO strings and are kept verbatim; helpers parse
//! the few the client actually computes with.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Association tags for a user, carried on the wire as a comma-joined
/// string (`"bravo,echo"`). Parsed into a set so access checks are
/// membership tests, never substring matches.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AssociationSet {
    tags: BTreeSet<String>,
}

impl AssociationSet {
    pub fn parse(raw: &str) -> Self {
        let tags = raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self { tags }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

impl From<String> for AssociationSet {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<AssociationSet> for String {
    fn from(set: AssociationSet) -> Self {
        set.to_string()
    }
}

impl fmt::Display for AssociationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.tags.iter().map(String::as_str).collect();
        write!(f, "{}", joined.join(","))
    }
}

/// The authenticated caller, as confirmed by the status probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub role: Role,
    pub associations: AssociationSet,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Wire shape of `GET /auth/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthStatus {
    pub is_authenticated: bool,
    pub user_email: Option<String>,
    pub user_role: Option<Role>,
    pub user_associations: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "IT")]
    It,
    Maintenance,
    Management,
}

impl Department {
    /// Wire name, as used in filters and form fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::It => "IT",
            Department::Maintenance => "Maintenance",
            Department::Management => "Management",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub ticket_id: String,
    pub user_email: Option<String>,
    pub text: String,
    pub timestamp: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub user_email: Option<String>,
    pub timestamp: String,
    /// `"open"`, or `"Closed: YYYY-MM-DD HH:MM:SS"`.
    pub status: String,
    pub assignee_email: Option<String>,
    /// Admin-only visibility flag.
    pub shimmer: bool,
    pub department: Department,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub comments: Option<Vec<Comment>>,
    /// Enrichment field, populated per page by the list controller.
    #[serde(default)]
    pub total_comments: Option<u64>,
}

impl Ticket {
    pub fn is_open(&self) -> bool {
        self.status == "open"
    }

    /// Closing time parsed out of the status string, when closed.
    pub fn closed_at(&self) -> Option<NaiveDateTime> {
        let stamp = self.status.strip_prefix("Closed: ")?;
        NaiveDateTime::parse_from_str(stamp.trim(), "%Y-%m-%d %H:%M:%S").ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EquipmentRequest {
    pub id: String,
    pub name: String,
    pub event: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub equipment: String,
    pub description: String,
    pub return_date: String,
    pub return_time: String,
    pub user_email: Option<String>,
    pub timestamp: String,
    pub status: RequestStatus,
    pub approval_status: ApprovalStatus,
}

/// New-employee onboarding request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmployeeRequest {
    pub id: String,
    pub fname: String,
    pub lname: String,
    pub job_title: String,
    pub department: String,
    pub start_date: String,
    pub description: String,
    pub user_email: Option<String>,
    pub timestamp: String,
    pub status: RequestStatus,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StudentRequest {
    pub id: String,
    pub fname: String,
    pub lname: String,
    pub grade: String,
    pub teacher: String,
    pub description: String,
    pub user_email: Option<String>,
    pub timestamp: String,
    pub status: RequestStatus,
    pub email_created: bool,
    pub computer_created: bool,
    pub bag_created: bool,
    pub id_card_created: bool,
    pub azure_created: bool,
}

/// Provisioning steps tracked per student request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningField {
    EmailCreated,
    ComputerCreated,
    BagCreated,
    IdCardCreated,
    AzureCreated,
}

impl ProvisioningField {
    /// Path segment used by the toggle endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvisioningField::EmailCreated => "email_created",
            ProvisioningField::ComputerCreated => "computer_created",
            ProvisioningField::BagCreated => "bag_created",
            ProvisioningField::IdCardCreated => "id_card_created",
            ProvisioningField::AzureCreated => "azure_created",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Tech,
    Maintenance,
    Administration,
}

impl TaskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Tech => "tech",
            TaskCategory::Maintenance => "maintenance",
            TaskCategory::Administration => "administration",
        }
    }
}

/// Recurring administrative task.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: String,
    pub completed: bool,
    pub completed_at: Option<String>,
    pub last_completed_at: Option<String>,
    pub category: TaskCategory,
    pub created_by_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub message: String,
    pub timestamp: String,
    pub category: TaskCategory,
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardStatistics {
    pub num_total_tickets: u64,
    pub num_open_tickets: u64,
    pub num_closed_tickets: u64,
    pub num_comments: u64,
    pub num_shimmer_tickets: u64,
    pub num_equipment_requests: u64,
    pub num_user_requests: u64,
    pub num_student_requests: u64,
    pub total_requests: u64,
    pub total_users: u64,
    pub tickets_by_department: std::collections::BTreeMap<String, u64>,
}

/// A user row in the management view.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManagedUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub associations: AssociationSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_association_set_membership_not_substring() {
        let set = AssociationSet::parse("DIGITAL,bravo");
        assert!(set.contains("DIGITAL"));
        assert!(set.contains("bravo"));
        // "IT" appears inside "DIGITAL" but is not a tag.
        assert!(!set.contains("IT"));
    }

    #[test]
    fn test_association_set_parse_trims_and_drops_empties() {
        let set = AssociationSet::parse(" bravo , echo ,, ");
        assert!(set.contains("bravo"));
        assert!(set.contains("echo"));
        assert_eq!(set.iter().count(), 2);
    }

    #[test]
    fn test_association_set_round_trip() {
        let set = AssociationSet::parse("echo,bravo");
        // BTreeSet order, comma-joined.
        assert_eq!(set.to_string(), "bravo,echo");

        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "\"bravo,echo\"");
        let back: AssociationSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_ticket_deserializes_from_wire_shape() {
        let ticket: Ticket = serde_json::from_str(
            r#"{
                "id": "t-17",
                "title": "Projector dead in room 204",
                "description": "No signal on either input.",
                "location": "Room 204",
                "user_email": "staff@example.org",
                "timestamp": "2024-09-12T08:30:00",
                "status": "open",
                "assignee_email": null,
                "shimmer": false,
                "department": "IT",
                "attachments": []
            }"#,
        )
        .unwrap();

        assert!(ticket.is_open());
        assert_eq!(ticket.department, Department::It);
        assert_eq!(ticket.total_comments, None);
        assert!(ticket.closed_at().is_none());
    }

    #[test]
    fn test_ticket_closed_at_parses_status_suffix() {
        let ticket: Ticket = serde_json::from_str(
            r#"{
                "id": "t-2",
                "title": "Done",
                "description": "",
                "location": "",
                "user_email": null,
                "timestamp": "2024-09-01T10:00:00",
                "status": "Closed: 2024-09-03 16:45:00",
                "assignee_email": "admin@example.org",
                "shimmer": false,
                "department": "Maintenance"
            }"#,
        )
        .unwrap();

        assert!(!ticket.is_open());
        let closed = ticket.closed_at().expect("closed timestamp should parse");
        assert_eq!(closed.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-09-03 16:45:00");
    }

    #[test]
    fn test_auth_status_minimal_body() {
        let status: AuthStatus = serde_json::from_str(r#"{"is_authenticated": false}"#).unwrap();
        assert!(!status.is_authenticated);
        assert!(status.user_email.is_none());
        assert!(status.user_role.is_none());
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::to_string(&Department::It).unwrap(),
            "\"IT\""
        );
        assert_eq!(
            serde_json::to_string(&TaskCategory::Administration).unwrap(),
            "\"administration\""
        );
        let approval: ApprovalStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(approval, ApprovalStatus::Pending);
    }
}
