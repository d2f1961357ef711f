use std::path::Path;

use chrono::{DateTime, Utc};
use mime::Mime;
use validator::{Validate, ValidationError};

use crate::config::AppConfig;
use crate::models::auth::{LoginRequest, RegisterRequest};
use crate::models::defect::{CreateDefectRequest, UpdateDefectRequest};
use crate::models::project::CreateProjectRequest;
use crate::models::{DefectPriority, Role};
use crate::utils::errors::{ClientError, ClientResult};

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("This field is required".into());
        return Err(err);
    }
    Ok(())
}

fn known_role(role: &Role) -> Result<(), ValidationError> {
    if role.id().is_none() {
        let mut err = ValidationError::new("role");
        err.message = Some("Choose engineer, manager or observer".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
}

impl LoginForm {
    pub fn into_request(self) -> ClientResult<LoginRequest> {
        self.validate()?;
        Ok(LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Validate)]
pub struct RegisterForm {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
    #[validate(custom(function = "not_blank"))]
    pub full_name: String,
    #[validate(custom(function = "known_role"))]
    pub role: Role,
}

impl RegisterForm {
    pub fn into_request(self) -> ClientResult<RegisterRequest> {
        self.validate()?;
        let role_id = self
            .role
            .id()
            .ok_or_else(|| ClientError::Validation("role: unknown".to_string()))?;
        Ok(RegisterRequest {
            email: self.email.trim().to_string(),
            password: self.password,
            full_name: self.full_name.trim().to_string(),
            role_id,
        })
    }
}

fn deadline_in_future(form: &DefectForm) -> Result<(), ValidationError> {
    match form.deadline {
        Some(deadline) if deadline <= form.now => {
            let mut err = ValidationError::new("deadline");
            err.message = Some("Deadline must be in the future".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "deadline_in_future", skip_on_field_errors = false))]
pub struct DefectForm {
    #[validate(custom(function = "not_blank"), length(max = 255))]
    pub title: String,
    pub description: String,
    pub priority: DefectPriority,
    pub deadline: Option<DateTime<Utc>>,
    #[validate(range(min = 1, message = "Select a project"))]
    pub project_id: i64,
    pub assignee_id: Option<i64>,
    /// Reference time for the deadline check.
    pub now: DateTime<Utc>,
}

impl DefectForm {
    pub fn into_request(self) -> ClientResult<CreateDefectRequest> {
        self.validate()?;
        Ok(CreateDefectRequest {
            title: self.title.trim().to_string(),
            description: self.description,
            priority: self.priority,
            deadline: self.deadline,
            project_id: self.project_id,
            assignee_id: self.assignee_id,
        })
    }
}

/// Edit-form rules. Fields left unset are not touched by the update and are
/// not checked.
#[derive(Debug, Clone, Validate)]
pub struct DefectEditForm {
    #[validate(custom(function = "not_blank"), length(max = 255))]
    pub title: Option<String>,
}

impl DefectEditForm {
    pub fn check(request: &UpdateDefectRequest) -> ClientResult<()> {
        DefectEditForm {
            title: request.title.clone(),
        }
        .validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Validate)]
pub struct ProjectForm {
    #[validate(custom(function = "not_blank"), length(max = 255))]
    pub name: String,
    pub description: String,
    #[validate(range(min = 1, message = "Select a manager"))]
    pub manager_id: i64,
}

impl ProjectForm {
    pub fn into_request(self) -> ClientResult<CreateProjectRequest> {
        self.validate()?;
        Ok(CreateProjectRequest {
            name: self.name.trim().to_string(),
            description: self.description,
            manager_id: self.manager_id,
        })
    }
}

#[derive(Debug, Clone, Validate)]
pub struct CommentForm {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
}

impl CommentForm {
    pub fn into_text(self) -> ClientResult<String> {
        self.validate()?;
        Ok(self.text.trim().to_string())
    }
}

/// Maps a file extension to the MIME type sent with the upload.
pub fn mime_for_extension(file_name: &str) -> Mime {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "png" => mime::IMAGE_PNG,
        "gif" => mime::IMAGE_GIF,
        "pdf" => mime::APPLICATION_PDF,
        "txt" => mime::TEXT_PLAIN,
        "csv" => mime::TEXT_CSV,
        "json" => mime::APPLICATION_JSON,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

/// Size and type limits for attachments, checked before upload.
#[derive(Debug, Clone)]
pub struct AttachmentRules {
    pub max_file_size: u64,
    pub allowed_types: Vec<Mime>,
}

impl AttachmentRules {
    pub fn from_config(config: &AppConfig) -> Self {
        AttachmentRules {
            max_file_size: config.max_file_size,
            allowed_types: config
                .allowed_file_types
                .iter()
                .filter_map(|t| t.parse::<Mime>().ok())
                .collect(),
        }
    }

    /// Returns the MIME type to upload with, or why the file is refused.
    pub fn check(
        &self,
        file_name: &str,
        size: u64,
        declared_type: Option<&str>,
    ) -> ClientResult<Mime> {
        if file_name.trim().is_empty() {
            return Err(ClientError::Validation("File name is required".to_string()));
        }
        if size == 0 {
            return Err(ClientError::Validation("File is empty".to_string()));
        }
        if size > self.max_file_size {
            return Err(ClientError::Validation(format!(
                "File size exceeds {}MB limit",
                self.max_file_size / (1024 * 1024)
            )));
        }

        let mime_type = match declared_type {
            Some(declared) => declared.parse::<Mime>().map_err(|_| {
                ClientError::Validation(format!("'{}' is not a valid MIME type", declared))
            })?,
            None => mime_for_extension(file_name),
        };

        let allowed = self
            .allowed_types
            .iter()
            .any(|t| t.essence_str() == mime_type.essence_str());
        if !allowed {
            return Err(ClientError::Validation(format!(
                "File type '{}' not allowed",
                mime_type.essence_str()
            )));
        }

        Ok(mime_type)
    }
}
