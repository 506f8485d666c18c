use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

/// A persisted row of the `books` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Identity assigned by the database
    pub id: i64,
    pub author: Option<String>,
    pub title: Option<String>,
    pub publisher: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Set when the book is deleted; deleted rows are never returned
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deleted_at: Option<OffsetDateTime>,
}

/// Request model for creating a new book.
///
/// A field that is missing or `null` in the body is stored as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBook {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub publisher: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_null_fields_become_empty_strings() {
        let book: CreateBook =
            serde_json::from_str(r#"{"title":"Solaris","publisher":null}"#).unwrap();

        assert_eq!(
            book,
            CreateBook {
                author: String::new(),
                title: "Solaris".into(),
                publisher: String::new(),
            }
        );
    }

    #[test]
    fn non_string_field_is_rejected() {
        assert!(serde_json::from_str::<CreateBook>(r#"{"author":7}"#).is_err());
    }
}
