//! Client-side form validation. These checks run before any request is
//! issued; failures are field-keyed so a form can render each message
//! next to the offending input.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::services::requests::{NewEmployeeRequest, NewEquipmentRequest, NewStudentRequest};
use crate::services::tickets::NewTicket;

fn require(errors: &mut ValidationError, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

pub fn login_form(email: &str, password: &str) -> Result<(), ValidationError> {
    let mut errors = ValidationError::new();
    require(&mut errors, "email", email, "Email is required.");
    require(&mut errors, "password", password, "Password is required.");
    errors.into_result()
}

pub fn register_form(
    email: &str,
    password: &str,
    confirm_password: &str,
    auth_code: &str,
) -> Result<(), ValidationError> {
    let mut errors = ValidationError::new();
    if !email.contains('@') {
        errors.add("email", "Invalid email address.");
    }
    if password.len() < 6 {
        errors.add("password", "Password must be at least 6 characters.");
    }
    if password != confirm_password {
        errors.add("confirm_password", "Passwords do not match.");
    }
    require(
        &mut errors,
        "auth_code",
        auth_code,
        "Authentication code is required.",
    );
    errors.into_result()
}

pub fn change_password_form(
    old_password: &str,
    new_password: &str,
    confirm_new_password: &str,
) -> Result<(), ValidationError> {
    let mut errors = ValidationError::new();
    if old_password.is_empty() {
        errors.add("old_password", "Old password is required.");
    }
    if new_password.len() < 6 {
        errors.add("new_password", "New password must be at least 6 characters.");
    }
    if new_password != confirm_new_password {
        errors.add("confirm_new_password", "New passwords do not match.");
    }
    errors.into_result()
}

pub fn ticket_form(ticket: &NewTicket) -> Result<(), ValidationError> {
    let mut errors = ValidationError::new();
    require(&mut errors, "title", &ticket.title, "Title is required.");
    require(
        &mut errors,
        "description",
        &ticket.description,
        "Description is required.",
    );
    require(&mut errors, "location", &ticket.location, "Location is required.");
    errors.into_result()
}

pub fn equipment_request_form(request: &NewEquipmentRequest) -> Result<(), ValidationError> {
    let mut errors = ValidationError::new();
    require(&mut errors, "name", &request.name, "Requester name is required.");
    require(&mut errors, "event", &request.event, "Event name is required.");
    require(&mut errors, "date", &request.date, "Event date is required.");
    require(&mut errors, "time", &request.time, "Event time is required.");
    require(&mut errors, "location", &request.location, "Location is required.");
    require(
        &mut errors,
        "equipment",
        &request.equipment,
        "Equipment details are required.",
    );
    require(
        &mut errors,
        "description",
        &request.description,
        "Description is required.",
    );
    require(
        &mut errors,
        "return_date",
        &request.return_date,
        "Return date is required.",
    );
    require(
        &mut errors,
        "return_time",
        &request.return_time,
        "Return time is required.",
    );

    if let (Ok(date), Ok(return_date)) = (
        NaiveDate::parse_from_str(&request.date, "%Y-%m-%d"),
        NaiveDate::parse_from_str(&request.return_date, "%Y-%m-%d"),
    ) {
        if return_date < date {
            errors.add("return_date", "Return date cannot be before the event date.");
        }
    }
    errors.into_result()
}

pub fn employee_request_form(request: &NewEmployeeRequest) -> Result<(), ValidationError> {
    let mut errors = ValidationError::new();
    require(&mut errors, "fname", &request.fname, "First name is required.");
    require(&mut errors, "lname", &request.lname, "Last name is required.");
    require(
        &mut errors,
        "job_title",
        &request.job_title,
        "Job title is required.",
    );
    require(
        &mut errors,
        "department",
        &request.department,
        "Department is required.",
    );
    require(
        &mut errors,
        "start_date",
        &request.start_date,
        "Start date is required.",
    );
    require(
        &mut errors,
        "description",
        &request.description,
        "Description of needs is required.",
    );
    errors.into_result()
}

pub fn student_request_form(request: &NewStudentRequest) -> Result<(), ValidationError> {
    let mut errors = ValidationError::new();
    require(&mut errors, "fname", &request.fname, "First name is required.");
    require(&mut errors, "lname", &request.lname, "Last name is required.");
    require(&mut errors, "grade", &request.grade, "Grade level is required.");
    require(
        &mut errors,
        "teacher",
        &request.teacher,
        "Teacher's name is required.",
    );
    require(
        &mut errors,
        "description",
        &request.description,
        "Description of needs is required.",
    );
    errors.into_result()
}
