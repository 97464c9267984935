use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationErrors};

use super::{present, reject_nulls};

/// A task as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i32,
    pub titulo: String,
    pub descricao: String,
    /// When the task is scheduled, if at all.
    pub data_realizacao: Option<DateTime<Utc>>,
    /// Owning user. Only the store's foreign key vouches for it.
    pub user_id: i32,
}

/// Creation body for a task.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(required)]
    pub titulo: Option<String>,
    #[validate(required)]
    pub descricao: Option<String>,
    #[serde(default, deserialize_with = "optional_date_time")]
    pub data_realizacao: Option<DateTime<Utc>>,
    #[validate(required)]
    pub user_id: Option<i32>,
}

/// A task ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub titulo: String,
    pub descricao: String,
    pub data_realizacao: Option<DateTime<Utc>>,
    pub user_id: i32,
}

impl TryFrom<TaskInput> for NewTask {
    type Error = ValidationErrors;

    fn try_from(input: TaskInput) -> Result<Self, Self::Error> {
        input.validate()?;
        let (Some(titulo), Some(descricao), Some(user_id)) =
            (input.titulo, input.descricao, input.user_id)
        else {
            return Err(ValidationErrors::new());
        };
        Ok(NewTask {
            titulo,
            descricao,
            data_realizacao: input.data_realizacao,
            user_id,
        })
    }
}

/// Update body for a task as sent. Every field is read as absent, `null` or
/// a value so that a `null` on a required column can be rejected.
#[derive(Debug, Default, Deserialize)]
pub struct TaskChangesInput {
    #[serde(default, deserialize_with = "present")]
    pub titulo: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub descricao: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_date_time")]
    pub data_realizacao: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "present")]
    pub user_id: Option<Option<i32>>,
}

/// Changes to apply to a task. Absent fields stay unchanged; a
/// `Some(None)` schedule clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub titulo: Option<String>,
    pub descricao: Option<String>,
    pub data_realizacao: Option<Option<DateTime<Utc>>>,
    pub user_id: Option<i32>,
}

impl TryFrom<TaskChangesInput> for TaskChanges {
    type Error = ValidationErrors;

    fn try_from(input: TaskChangesInput) -> Result<Self, Self::Error> {
        reject_nulls(&[
            ("titulo", matches!(input.titulo, Some(None))),
            ("descricao", matches!(input.descricao, Some(None))),
            ("user_id", matches!(input.user_id, Some(None))),
        ])?;
        Ok(TaskChanges {
            titulo: input.titulo.flatten(),
            descricao: input.descricao.flatten(),
            data_realizacao: input.data_realizacao,
            user_id: input.user_id.flatten(),
        })
    }
}

impl TaskChanges {
    /// Applies the changes in place and reports whether any value differs
    /// from what was stored.
    pub fn apply(&self, task: &mut Task) -> bool {
        let before = task.clone();
        if let Some(titulo) = &self.titulo {
            task.titulo = titulo.clone();
        }
        if let Some(descricao) = &self.descricao {
            task.descricao = descricao.clone();
        }
        if let Some(data_realizacao) = self.data_realizacao {
            task.data_realizacao = data_realizacao;
        }
        if let Some(user_id) = self.user_id {
            task.user_id = user_id;
        }
        *task != before
    }
}

/// Accepts RFC 3339 timestamps as well as the bare `YYYY-MM-DD` and
/// `YYYY-MM-DD HH:MM:SS` forms, the latter two read as UTC.
pub fn parse_date_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn optional_date_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_date_time(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("data_realizacao inválida: {}", raw))),
    }
}

fn present_date_time<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_date_time(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn stored() -> Task {
        Task {
            id: 7,
            titulo: "Dentista".to_string(),
            descricao: "Consulta de rotina".to_string(),
            data_realizacao: Some(Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap()),
            user_id: 1,
        }
    }

    #[test]
    fn test_task_input_requires_fields() {
        let input: TaskInput = serde_json::from_value(json!({
            "titulo": "Dentista",
            "descricao": "Consulta",
            "user_id": 1
        }))
        .unwrap();
        let task = NewTask::try_from(input).unwrap();
        assert_eq!(task.titulo, "Dentista");
        assert!(task.data_realizacao.is_none());

        let input: TaskInput = serde_json::from_value(json!({ "titulo": "Dentista" })).unwrap();
        let errors = NewTask::try_from(input).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("descricao"));
        assert!(fields.contains_key("user_id"));
        assert!(!fields.contains_key("titulo"));
    }

    #[test]
    fn test_date_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap();
        assert_eq!(parse_date_time("2024-05-01T14:00:00Z"), Some(expected));
        assert_eq!(parse_date_time("2024-05-01T11:00:00-03:00"), Some(expected));
        assert_eq!(parse_date_time("2024-05-01 14:00:00"), Some(expected));
        assert_eq!(
            parse_date_time("2024-05-01"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_date_time("amanhã"), None);
    }

    #[test]
    fn test_malformed_date_is_a_parse_error() {
        let result: Result<TaskInput, _> = serde_json::from_value(json!({
            "titulo": "x",
            "descricao": "y",
            "user_id": 1,
            "data_realizacao": "amanhã"
        }));
        assert!(result.is_err());
    }

    fn changes(body: serde_json::Value) -> Result<TaskChanges, ValidationErrors> {
        let input: TaskChangesInput = serde_json::from_value(body).unwrap();
        TaskChanges::try_from(input)
    }

    #[test]
    fn test_changes_distinguish_absent_and_null_date() {
        let absent = changes(json!({ "titulo": "Médico" })).unwrap();
        assert_eq!(absent.data_realizacao, None);

        let null = changes(json!({ "data_realizacao": null })).unwrap();
        assert_eq!(null.data_realizacao, Some(None));
    }

    #[test]
    fn test_changes_reject_null_on_required_fields() {
        let errors = changes(json!({ "titulo": null, "user_id": null })).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("titulo"));
        assert!(fields.contains_key("user_id"));
        assert!(!fields.contains_key("descricao"));

        assert!(changes(json!({ "descricao": null, "titulo": "x" })).is_err());
    }

    #[test]
    fn test_changes_apply_only_given_fields() {
        let mut task = stored();
        let rename = changes(json!({ "titulo": "Médico" })).unwrap();
        assert!(rename.apply(&mut task));
        assert_eq!(task.titulo, "Médico");
        assert_eq!(task.descricao, "Consulta de rotina");
        assert!(task.data_realizacao.is_some());
        assert_eq!(task.user_id, 1);

        let clear = changes(json!({ "data_realizacao": null })).unwrap();
        assert!(clear.apply(&mut task));
        assert!(task.data_realizacao.is_none());
        assert!(!clear.apply(&mut task));
    }
}
