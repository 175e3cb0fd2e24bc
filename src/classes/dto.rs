use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::classes::repo::{ClassRow, EnrollmentRow};

#[derive(Debug, Deserialize)]
pub struct CreateClassRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateClassRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Public user reference embedded in class and enrollment payloads.
#[derive(Debug, Serialize)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDto {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_by: Option<UserRef>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<ClassRow> for ClassDto {
    fn from(row: ClassRow) -> Self {
        let created_by = match (row.created_by, row.creator_name, row.creator_email) {
            (Some(id), Some(name), Some(email)) => Some(UserRef { id, name, email }),
            _ => None,
        };
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClassEnvelope {
    pub message: String,
    pub class: ClassDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedClass {
    pub message: String,
    pub deleted_class: ClassDto,
}

/// Class reference embedded in an enrollment payload.
#[derive(Debug, Serialize)]
pub struct ClassRef {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentDto {
    pub id: Uuid,
    pub user: UserRef,
    pub class: ClassRef,
    pub role: String,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub joined_at: OffsetDateTime,
}

impl From<EnrollmentRow> for EnrollmentDto {
    fn from(row: EnrollmentRow) -> Self {
        Self {
            id: row.id,
            user: UserRef {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
            },
            class: ClassRef {
                id: row.class_id,
                name: row.class_name,
                description: row.class_description,
            },
            role: row.role,
            status: row.status,
            joined_at: row.joined_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<EnrollmentDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_row(created_by: Option<Uuid>, creator: Option<(&str, &str)>) -> ClassRow {
        let now = OffsetDateTime::now_utc();
        ClassRow {
            id: Uuid::new_v4(),
            name: "Rust 101".into(),
            description: Some("intro".into()),
            created_by,
            created_at: now,
            updated_at: now,
            creator_name: creator.map(|(n, _)| n.to_string()),
            creator_email: creator.map(|(_, e)| e.to_string()),
        }
    }

    #[test]
    fn creator_is_embedded_when_present() {
        let id = Uuid::new_v4();
        let dto = ClassDto::from(class_row(Some(id), Some(("Tony", "tony@example.com"))));
        let creator = dto.created_by.expect("creator");
        assert_eq!(creator.id, id);
        assert_eq!(creator.name, "Tony");
        assert_eq!(creator.email, "tony@example.com");
    }

    #[test]
    fn creator_is_null_when_absent() {
        let dto = ClassDto::from(class_row(None, None));
        assert!(dto.created_by.is_none());
        let json = serde_json::to_value(&dto).unwrap();
        assert!(json["createdBy"].is_null());
    }

    #[test]
    fn enrollment_serializes_contract_keys() {
        let now = OffsetDateTime::now_utc();
        let dto = EnrollmentDto::from(EnrollmentRow {
            id: Uuid::new_v4(),
            role: "student".into(),
            status: "active".into(),
            joined_at: now,
            user_id: Uuid::new_v4(),
            user_name: "Tony".into(),
            user_email: "tony@example.com".into(),
            class_id: Uuid::new_v4(),
            class_name: "Rust 101".into(),
            class_description: None,
        });
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["role"], "student");
        assert_eq!(json["status"], "active");
        assert!(json.get("joinedAt").is_some());
        assert_eq!(json["user"]["name"], "Tony");
        assert_eq!(json["class"]["name"], "Rust 101");
    }
}
