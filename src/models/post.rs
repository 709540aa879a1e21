//! Post model
//!
//! Blog-style posts. The backend speaks Portuguese field names
//! (`titulo`, `conteudo`, `autor`...), mapped here onto English ones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author summary embedded in every post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Author {
    /// Author name, or "Desconhecido" when the backend has none
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => "Desconhecido",
        }
    }
}

/// A published post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    /// Markdown source
    #[serde(rename = "conteudo")]
    pub body: String,
    #[serde(rename = "autorId")]
    pub author_id: i64,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "atualizacao", default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "autor", default)]
    pub author: Option<Author>,
}

impl Post {
    /// Name shown next to the post
    pub fn author_name(&self) -> &str {
        self.author.as_ref().map_or("Desconhecido", Author::display_name)
    }

    /// Whether `user_id` (a session user id) wrote this post
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author_id.to_string() == user_id
    }

    /// First `max_chars` characters of the body, for list cards
    pub fn excerpt(&self, max_chars: usize) -> String {
        let mut chars = self.body.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{}…", head.trim_end())
        } else {
            head
        }
    }
}

/// Body of `POST /posts`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePostInput {
    pub titulo: String,
    pub conteudo: String,
}

/// Body of `PUT /posts/:id`; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdatePostInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conteudo: Option<String>,
}

impl From<CreatePostInput> for UpdatePostInput {
    fn from(input: CreatePostInput) -> Self {
        Self {
            titulo: Some(input.titulo),
            conteudo: Some(input.conteudo),
        }
    }
}
