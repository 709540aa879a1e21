//! One-shot notices ("toasts")
//!
//! A notice rides along in the query string of a redirect
//! (`?notice=..&variant=..`) and is shown once at the top of the next page.

use axum::response::Redirect;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    Success,
    Alert,
    Warning,
    Info,
}

impl NoticeVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeVariant::Success => "success",
            NoticeVariant::Alert => "alert",
            NoticeVariant::Warning => "warning",
            NoticeVariant::Info => "info",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(NoticeVariant::Success),
            "alert" => Some(NoticeVariant::Alert),
            "warning" => Some(NoticeVariant::Warning),
            "info" => Some(NoticeVariant::Info),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn new(variant: NoticeVariant, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            variant,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeVariant::Success, message)
    }

    pub fn alert(message: impl Into<String>) -> Self {
        Self::new(NoticeVariant::Alert, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeVariant::Warning, message)
    }

    /// `path` with this notice appended to its query string
    pub fn url(&self, path: &str) -> String {
        let separator = if path.contains('?') { '&' } else { '?' };
        format!(
            "{}{}notice={}&variant={}",
            path,
            separator,
            urlencoding::encode(&self.message),
            self.variant.as_str()
        )
    }

    /// Redirect to `path`, carrying this notice
    pub fn redirect(&self, path: &str) -> Redirect {
        Redirect::to(&self.url(path))
    }
}

/// Query parameters carrying a notice
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoticeQuery {
    #[serde(default)]
    pub notice: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
}

impl NoticeQuery {
    /// The notice, if the query carries a non-blank one; unknown variants read as info
    pub fn into_notice(self) -> Option<Notice> {
        let message = self.notice.filter(|m| !m.trim().is_empty())?;
        let variant = self
            .variant
            .as_deref()
            .and_then(NoticeVariant::parse)
            .unwrap_or(NoticeVariant::Info);
        Some(Notice::new(variant, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_encodes_message() {
        let notice = Notice::success("Post criado com sucesso!");
        assert_eq!(
            notice.url("/admin/dashboard"),
            "/admin/dashboard?notice=Post%20criado%20com%20sucesso%21&variant=success"
        );
        assert_eq!(
            Notice::warning("x").url("/admin/teachers?page=2"),
            "/admin/teachers?page=2&notice=x&variant=warning"
        );
    }

    #[test]
    fn test_query_into_notice() {
        let query = NoticeQuery {
            notice: Some("Olá".to_string()),
            variant: Some("alert".to_string()),
        };
        assert_eq!(query.into_notice(), Some(Notice::alert("Olá")));

        let query = NoticeQuery {
            notice: Some("Olá".to_string()),
            variant: Some("purple".to_string()),
        };
        assert_eq!(query.into_notice().map(|n| n.variant), Some(NoticeVariant::Info));

        assert_eq!(NoticeQuery::default().into_notice(), None);
        let blank = NoticeQuery {
            notice: Some("  ".to_string()),
            variant: None,
        };
        assert_eq!(blank.into_notice(), None);
    }
}
