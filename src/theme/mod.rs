//! Theme engine
//!
//! This module provides page rendering using Tera.
//! Features:
//! - Templates embedded into the binary at build time
//! - Standard template variables (site name, signed-in user, notice)
//! - Fallback to an error template, then to plain HTML

use anyhow::Result;
use chrono::Datelike;
use rust_embed::RustEmbed;
use serde::Serialize;
use std::error::Error as StdError;
use tera::{Context as TeraContext, Tera};

use crate::models::SessionUser;
use crate::web::notice::Notice;

mod error;

pub use error::ThemeError;

/// Site name shown in titles and the header
pub const SITE_NAME: &str = "EducaMais";

/// Embedded page templates
#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct TemplateAssets;

/// Theme engine for rendering templates
pub struct ThemeEngine {
    /// Tera template engine instance
    tera: Tera,
}

impl std::fmt::Debug for ThemeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeEngine")
            .field("templates", &self.tera.get_template_names().count())
            .finish()
    }
}

impl ThemeEngine {
    /// Create an engine over the templates embedded in the binary
    pub fn embedded() -> Result<Self> {
        let mut templates = Vec::new();
        for name in TemplateAssets::iter() {
            let file = TemplateAssets::get(&name).ok_or_else(|| ThemeError::NotFound(name.to_string()))?;
            let content = std::str::from_utf8(&file.data)
                .map_err(|e| ThemeError::InvalidEncoding(format!("{}: {}", name, e)))?
                .to_string();
            templates.push((name.to_string(), content));
        }
        tracing::debug!("Loaded {} embedded templates", templates.len());
        Self::from_templates(templates)
    }

    /// Create an engine from `(name, source)` pairs
    pub fn from_templates(templates: Vec<(String, String)>) -> Result<Self> {
        let mut tera = Tera::default();
        // Adds everything before resolving `extends`, so order does not matter.
        tera.add_raw_templates(templates)
            .map_err(|e| ThemeError::TemplateError(format!("Failed to add templates: {}", error_chain(&e))))?;
        Ok(Self { tera })
    }

    /// Render a template with the given context
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String> {
        self.tera.render(template, context).map_err(|e| {
            ThemeError::TemplateError(format!("Failed to render '{}': {}", template, error_chain(&e))).into()
        })
    }

    /// Render a template with standard variables automatically added
    pub fn render_with_standard_vars(
        &self,
        template: &str,
        context: &TeraContext,
        standard_vars: &StandardTemplateVars,
    ) -> Result<String> {
        let mut full_context = context.clone();
        full_context.insert("site_name", &standard_vars.site_name);
        full_context.insert("request_path", &standard_vars.request_path);
        full_context.insert("year", &standard_vars.year);
        full_context.insert("current_user", &standard_vars.current_user);
        full_context.insert("notice", &standard_vars.notice);

        self.render(template, &full_context)
    }

    /// Render a template, falling back to `error.html` and then to plain HTML
    pub fn render_with_fallback(&self, template: &str, context: &TeraContext) -> String {
        match self.render(template, context) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Failed to render template '{}': {}, trying error template", template, e);

                let mut error_context = context.clone();
                error_context.insert("error_message", &e.to_string());
                error_context.insert("status", &500);

                match self.render("error.html", &error_context) {
                    Ok(html) => html,
                    Err(error_template_err) => {
                        tracing::warn!(
                            "Failed to render error template: {}, returning simple HTML error page",
                            error_template_err
                        );
                        simple_error_page(&e.to_string())
                    }
                }
            }
        }
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|t| t == name)
    }
}

fn error_chain(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        message.push_str(&format!("\n  Caused by: {}", s));
        source = s.source();
    }
    message
}

/// Last-resort error page that needs no template
pub fn simple_error_page(error: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Erro - {site}</title>
    <style>
        body {{ font-family: system-ui, sans-serif; max-width: 600px; margin: 50px auto; padding: 20px; }}
        .error-box {{ border-left: 4px solid #e74c3c; padding: 20px; }}
    </style>
</head>
<body>
    <div class="error-box">
        <h1>Algo deu errado</h1>
        <p>{error}</p>
        <p><a href="/">Voltar ao início</a></p>
    </div>
</body>
</html>"#,
        site = SITE_NAME,
        error = tera::escape_html(error)
    )
}

/// Standard template variables
#[derive(Debug, Clone, Serialize)]
pub struct StandardTemplateVars {
    pub site_name: String,
    /// Signed-in user, if any
    pub current_user: Option<CurrentUser>,
    pub request_path: String,
    /// Current year (for copyright)
    pub year: i32,
    /// One-shot notice carried over from a redirect
    pub notice: Option<Notice>,
}

/// Signed-in user as the header sees it
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Role badge: "Administrador", "Professor" or "Aluno"
    pub role_label: Option<String>,
    pub is_staff: bool,
    pub is_admin: bool,
}

impl From<&SessionUser> for CurrentUser {
    fn from(user: &SessionUser) -> Self {
        Self {
            id: user.id.clone(),
            name: user.display_name().to_string(),
            email: user.email.clone(),
            role_label: user.app_role.map(|r| r.label().to_string()),
            is_staff: user.app_role.is_some_and(|r| r.is_staff()),
            is_admin: user.is_admin(),
        }
    }
}

impl StandardTemplateVars {
    pub fn new(request_path: impl Into<String>) -> Self {
        Self {
            site_name: SITE_NAME.to_string(),
            current_user: None,
            request_path: request_path.into(),
            year: chrono::Utc::now().year(),
            notice: None,
        }
    }

    pub fn with_user(mut self, user: Option<&SessionUser>) -> Self {
        self.current_user = user.map(CurrentUser::from);
        self
    }

    pub fn with_notice(mut self, notice: Option<Notice>) -> Self {
        self.notice = notice;
        self
    }
}
