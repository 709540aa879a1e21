//! Form validation
//!
//! Each form is checked rule by rule; the first failing rule's message is
//! returned as [`ServiceError::Validation`], otherwise the typed payload the
//! backend expects.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::models::{CreatePostInput, CreateUserInput, UpdateUserInput, UserRole, PROVIDER_USER_ROLE};
use crate::services::error::ServiceError;

/// Minimum password length for accounts
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|e| panic!("invalid email pattern: {e}"))
});

/// Post create/edit form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub titulo: String,
    #[serde(default)]
    pub conteudo: String,
}

/// Teacher/student create/edit form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    /// Target role on edit; create forms use the page's role
    #[serde(default)]
    pub app_role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

fn invalid(message: &str) -> ServiceError {
    ServiceError::Validation(message.to_string())
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Title and body are both required
pub fn validate_post(form: &PostForm) -> Result<CreatePostInput, ServiceError> {
    let titulo = form.titulo.trim();
    let conteudo = form.conteudo.trim();
    if titulo.is_empty() || conteudo.is_empty() {
        return Err(invalid("Preencha todos os campos"));
    }
    Ok(CreatePostInput {
        titulo: titulo.to_string(),
        conteudo: conteudo.to_string(),
    })
}

/// Password rules shared by user create and edit
fn check_password(form: &UserForm) -> Result<(), ServiceError> {
    if form.password != form.confirm_password {
        return Err(invalid("As senhas não coincidem."));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid("A senha deve ter no mínimo 8 caracteres."));
    }
    Ok(())
}

fn check_identity(form: &UserForm) -> Result<(), ServiceError> {
    if form.name.trim().is_empty() || form.email.trim().is_empty() {
        return Err(invalid("Preencha nome e email."));
    }
    Ok(())
}

/// New teacher or student; the password is mandatory
pub fn validate_new_user(form: &UserForm, role: UserRole) -> Result<CreateUserInput, ServiceError> {
    check_identity(form)?;
    if form.password.is_empty() {
        return Err(invalid("A senha é obrigatória."));
    }
    check_password(form)?;
    Ok(CreateUserInput {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        password: form.password.clone(),
        role: Some(PROVIDER_USER_ROLE.to_string()),
        app_role: role,
    })
}

/// Changes to an existing user; the password is only sent when filled in
pub fn validate_user_update(form: &UserForm, role: UserRole) -> Result<UpdateUserInput, ServiceError> {
    check_identity(form)?;
    let password = if form.password.is_empty() && form.confirm_password.is_empty() {
        None
    } else {
        check_password(form)?;
        Some(form.password.clone())
    };
    Ok(UpdateUserInput {
        name: Some(form.name.trim().to_string()),
        email: Some(form.email.trim().to_string()),
        password,
        role: Some(PROVIDER_USER_ROLE.to_string()),
        app_role: Some(role),
    })
}

pub fn validate_sign_in(form: &SignInForm) -> Result<(), ServiceError> {
    if !is_valid_email(&form.email) {
        return Err(invalid("E-mail inválido"));
    }
    if form.password.is_empty() {
        return Err(invalid("A senha é obrigatória"));
    }
    Ok(())
}

pub fn validate_sign_up(form: &SignUpForm) -> Result<(), ServiceError> {
    if form.name.trim().is_empty() {
        return Err(invalid("O nome é obrigatório"));
    }
    if !is_valid_email(&form.email) {
        return Err(invalid("E-mail inválido"));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid("A senha deve ter pelo menos 8 caracteres"));
    }
    if form.password != form.confirm_password {
        return Err(invalid("As senhas não coincidem"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<impl std::fmt::Debug, ServiceError>) -> String {
        result.unwrap_err().to_string()
    }

    fn user_form(password: &str, confirm: &str) -> UserForm {
        UserForm {
            name: "Ana".to_string(),
            email: "ana@escola.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            app_role: None,
        }
    }

    #[test]
    fn test_post_requires_both_fields() {
        for (titulo, conteudo) in [("", "corpo"), ("Título", "  "), ("", "")] {
            let form = PostForm {
                titulo: titulo.to_string(),
                conteudo: conteudo.to_string(),
            };
            assert_eq!(message(validate_post(&form)), "Preencha todos os campos");
        }
        let form = PostForm {
            titulo: " Título ".to_string(),
            conteudo: "corpo".to_string(),
        };
        assert_eq!(validate_post(&form).unwrap().titulo, "Título");
    }

    #[test]
    fn test_new_user_rules_in_order() {
        let mut form = user_form("", "");
        form.name.clear();
        assert_eq!(message(validate_new_user(&form, UserRole::Teacher)), "Preencha nome e email.");

        let form = user_form("", "");
        assert_eq!(message(validate_new_user(&form, UserRole::Teacher)), "A senha é obrigatória.");

        let form = user_form("segredo123", "segredo321");
        assert_eq!(message(validate_new_user(&form, UserRole::Teacher)), "As senhas não coincidem.");

        let form = user_form("curta", "curta");
        assert_eq!(
            message(validate_new_user(&form, UserRole::Teacher)),
            "A senha deve ter no mínimo 8 caracteres."
        );
    }

    #[test]
    fn test_new_user_payload() {
        let input = validate_new_user(&user_form("segredo123", "segredo123"), UserRole::Student).unwrap();

        assert_eq!(input.app_role, UserRole::Student);
        assert_eq!(input.role.as_deref(), Some("user"));
        assert_eq!(input.password, "segredo123");
    }

    #[test]
    fn test_update_without_password_omits_it() {
        let input = validate_user_update(&user_form("", ""), UserRole::Teacher).unwrap();

        assert_eq!(input.password, None);
        assert_eq!(input.app_role, Some(UserRole::Teacher));
        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_update_with_password_applies_rules() {
        let form = user_form("curta", "curta");
        assert_eq!(
            message(validate_user_update(&form, UserRole::Teacher)),
            "A senha deve ter no mínimo 8 caracteres."
        );
        let form = user_form("segredo123", "");
        assert_eq!(message(validate_user_update(&form, UserRole::Teacher)), "As senhas não coincidem.");

        let input = validate_user_update(&user_form("segredo123", "segredo123"), UserRole::Teacher).unwrap();
        assert_eq!(input.password.as_deref(), Some("segredo123"));
    }

    #[test]
    fn test_sign_in_rules() {
        let form = SignInForm {
            email: "nao-e-email".to_string(),
            password: "x".to_string(),
        };
        assert_eq!(message(validate_sign_in(&form)), "E-mail inválido");

        let form = SignInForm {
            email: "ana@escola.com".to_string(),
            password: String::new(),
        };
        assert_eq!(message(validate_sign_in(&form)), "A senha é obrigatória");
    }

    #[test]
    fn test_sign_up_rules() {
        let mut form = SignUpForm {
            name: " ".to_string(),
            email: "ana@escola.com".to_string(),
            password: "segredo123".to_string(),
            confirm_password: "segredo123".to_string(),
        };
        assert_eq!(message(validate_sign_up(&form)), "O nome é obrigatório");

        form.name = "Ana".to_string();
        form.email = "ana@".to_string();
        assert_eq!(message(validate_sign_up(&form)), "E-mail inválido");

        form.email = "ana@escola.com".to_string();
        form.password = "curta".to_string();
        assert_eq!(message(validate_sign_up(&form)), "A senha deve ter pelo menos 8 caracteres");

        form.password = "segredo123".to_string();
        form.confirm_password = "outra".to_string();
        assert_eq!(message(validate_sign_up(&form)), "As senhas não coincidem");

        form.confirm_password = "segredo123".to_string();
        assert!(validate_sign_up(&form).is_ok());
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email(" prof.ana@escola.edu.br "));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.d"));
        assert!(!is_valid_email(""));
    }
}
