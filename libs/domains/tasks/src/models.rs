use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ValidationError;

/// Longest accepted title, in characters.
pub const MAX_TITLE_CHARS: usize = 255;
/// Longest accepted description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Task entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque identifier, UUID v4 text when generated by the service
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    /// Never earlier than `created_at`
    pub updated_at: DateTime<Utc>,
    /// Starts at 1, bumped by every successful update
    pub version: i64,
}

impl Task {
    /// Overlay the mutable fields from an update request.
    ///
    /// `updated_at` never moves backwards, even if the wall clock does.
    pub fn apply_update(&mut self, update: &UpdateTask, now: DateTime<Utc>) {
        self.title = update.title.clone();
        self.description = update.description.clone();
        self.completed = update.completed;
        self.updated_at = now.max(self.updated_at);
    }
}

/// Fields accepted when creating a task
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct CreateTask {
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    #[validate(custom(function = "validate_description"))]
    pub description: String,
}

/// Fields accepted when updating a task. All mutable fields are replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct UpdateTask {
    #[validate(custom(function = "validate_id"))]
    pub id: String,
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    #[validate(custom(function = "validate_description"))]
    pub description: String,
    pub completed: bool,
    /// Reject the update unless the stored version matches
    pub expected_version: Option<i64>,
}

/// List request as received: raw page size and opaque token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTasks {
    pub page_size: i32,
    pub page_token: Option<String>,
}

fn validate_id(id: &str) -> Result<(), validator::ValidationError> {
    if id.is_empty() {
        return Err(validator::ValidationError::new("missing_id"));
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<(), validator::ValidationError> {
    if title.is_empty() {
        return Err(validator::ValidationError::new("empty_title"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(validator::ValidationError::new("title_too_long"));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), validator::ValidationError> {
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(validator::ValidationError::new("description_too_long"));
    }
    Ok(())
}

/// Fields in the order their violations are reported.
const FIELD_PRECEDENCE: [&str; 3] = ["id", "title", "description"];

/// Run the field validators and report the first violation by precedence:
/// missing id, then title, then description.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ValidationError> {
    let Err(errors) = input.validate() else {
        return Ok(());
    };
    let field_errors = errors.field_errors();

    let code = FIELD_PRECEDENCE
        .iter()
        .filter_map(|field| field_errors.get(*field))
        .filter_map(|errs| errs.first())
        .map(|err| err.code.as_ref())
        .next();

    Err(match code {
        Some("missing_id") => ValidationError::MissingId,
        Some("empty_title") => ValidationError::EmptyTitle,
        Some("title_too_long") => ValidationError::TitleTooLong,
        Some("description_too_long") => ValidationError::DescriptionTooLong,
        other => ValidationError::Other(other.unwrap_or("unknown").to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(title: &str, description: &str) -> CreateTask {
        CreateTask {
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    fn update(id: &str, title: &str, description: &str) -> UpdateTask {
        UpdateTask {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_create() {
        assert_eq!(validate_input(&create("Buy milk", "2 liters")), Ok(()));
        assert_eq!(validate_input(&create("Buy milk", "")), Ok(()));
    }

    #[test]
    fn test_empty_title() {
        assert_eq!(
            validate_input(&create("", "")),
            Err(ValidationError::EmptyTitle)
        );
    }

    #[test]
    fn test_title_boundary() {
        let exact = "a".repeat(MAX_TITLE_CHARS);
        assert_eq!(validate_input(&create(&exact, "")), Ok(()));

        let over = "a".repeat(MAX_TITLE_CHARS + 1);
        assert_eq!(
            validate_input(&create(&over, "")),
            Err(ValidationError::TitleTooLong)
        );
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        // 255 three-byte characters: 765 bytes
        let title = "日".repeat(MAX_TITLE_CHARS);
        assert_eq!(validate_input(&create(&title, "")), Ok(()));
    }

    #[test]
    fn test_description_boundary() {
        let exact = "d".repeat(MAX_DESCRIPTION_CHARS);
        assert_eq!(validate_input(&create("t", &exact)), Ok(()));

        let over = "d".repeat(MAX_DESCRIPTION_CHARS + 1);
        assert_eq!(
            validate_input(&create("t", &over)),
            Err(ValidationError::DescriptionTooLong)
        );
    }

    #[test]
    fn test_precedence_title_before_description() {
        let long_description = "d".repeat(MAX_DESCRIPTION_CHARS + 1);
        assert_eq!(
            validate_input(&create("", &long_description)),
            Err(ValidationError::EmptyTitle)
        );
    }

    #[test]
    fn test_update_missing_id_reported_first() {
        assert_eq!(
            validate_input(&update("", "", "")),
            Err(ValidationError::MissingId)
        );
        assert_eq!(
            validate_input(&update("abc", "", "")),
            Err(ValidationError::EmptyTitle)
        );
        assert_eq!(validate_input(&update("abc", "t", "")), Ok(()));
    }

    #[test]
    fn test_apply_update_overlays_fields() {
        let created = Utc::now();
        let mut task = Task {
            id: "t-1".to_string(),
            title: "old".to_string(),
            description: "old".to_string(),
            completed: false,
            created_at: created,
            updated_at: created,
            version: 1,
        };

        let later = created + chrono::Duration::seconds(5);
        task.apply_update(
            &UpdateTask {
                id: "t-1".to_string(),
                title: "new".to_string(),
                description: String::new(),
                completed: true,
                expected_version: None,
            },
            later,
        );

        assert_eq!(task.title, "new");
        assert_eq!(task.description, "");
        assert!(task.completed);
        assert_eq!(task.created_at, created);
        assert_eq!(task.updated_at, later);
    }

    #[test]
    fn test_apply_update_never_moves_updated_at_backwards() {
        let created = Utc::now();
        let mut task = Task {
            id: "t-1".to_string(),
            title: "t".to_string(),
            description: String::new(),
            completed: false,
            created_at: created,
            updated_at: created,
            version: 1,
        };

        let skewed = created - chrono::Duration::seconds(30);
        task.apply_update(&update("t-1", "t", ""), skewed);
        assert_eq!(task.updated_at, created);
    }
}
