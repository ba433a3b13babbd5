use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{info, warn};

use aerofacil_core::models::{validate_username, NewUser};
use aerofacil_core::{CoreError, FieldErrors, User};
use crate::error::AppError;
use crate::flash::{self, FlashLevel};
use crate::forms::{error_messages, safe_next, LoginForm, RegisterForm};
use crate::middleware::MaybeUser;
use crate::state::AppState;
use crate::views::{render, Chrome, LoginTemplate, RegisterTemplate};

pub mod password;
pub mod session;

use password::{hash_password, verify_password, MIN_PASSWORD_LENGTH};
use session::{cleared_session_cookie, issue_token, session_cookie};

pub const BAD_CREDENTIALS_MESSAGE: &str = "Please enter a correct username and password.";
pub const USERNAME_TAKEN_MESSAGE: &str = "A user with that username already exists.";
pub const LOGGED_OUT_MESSAGE: &str = "You have been signed out.";

const MAX_FULL_NAME_CHARS: usize = 150;
const MAX_PHONE_CHARS: usize = 20;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/logout", post(logout))
}

/// Puts a fresh session for `user` into the jar.
fn sign_in(state: &AppState, jar: CookieJar, user: &User) -> Result<CookieJar, AppError> {
    let token = issue_token(&state.auth, user)
        .map_err(|e| anyhow::anyhow!("Token encoding failed: {}", e))?;
    Ok(jar.add(session_cookie(&state.auth, token)))
}

// ============================================================================
// Registration
// ============================================================================

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn validate_registration(form: &RegisterForm) -> Result<(), FieldErrors> {
    let mut errors = match validate_username(form.username.trim()) {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors,
    };

    if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!("This password is too short. It must contain at least {} characters.", MIN_PASSWORD_LENGTH),
        );
    }
    if form.password != form.password_confirm {
        errors.add("password_confirm", "The two password fields didn't match.");
    }
    if form.full_name.trim().chars().count() > MAX_FULL_NAME_CHARS {
        errors.add("full_name", format!("Ensure this value has at most {} characters.", MAX_FULL_NAME_CHARS));
    }
    if form.phone_number.trim().chars().count() > MAX_PHONE_CHARS {
        errors.add("phone_number", format!("Ensure this value has at most {} characters.", MAX_PHONE_CHARS));
    }

    errors.into_result()
}

fn register_page(
    user: &MaybeUser,
    jar: CookieJar,
    form: &RegisterForm,
    errors: Option<&FieldErrors>,
) -> Result<Response, AppError> {
    let status = if errors.is_some() { StatusCode::UNPROCESSABLE_ENTITY } else { StatusCode::OK };
    let (jar, flashes) = flash::take(jar);
    let page = render(RegisterTemplate {
        chrome: Chrome::new(user.0.as_ref(), flashes),
        username: form.username.clone(),
        full_name: form.full_name.clone(),
        phone_number: form.phone_number.clone(),
        is_owner: form.wants_owner(),
        errors: errors.map(error_messages).unwrap_or_default(),
    })?;
    Ok((status, jar, page).into_response())
}

/// GET /register
async fn register_form(user: MaybeUser, jar: CookieJar) -> Result<Response, AppError> {
    register_page(&user, jar, &RegisterForm::default(), None)
}

/// POST /register
async fn register(
    State(state): State<AppState>,
    user: MaybeUser,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = validate_registration(&form) {
        return register_page(&user, jar, &form, Some(&errors));
    }

    let password_hash = hash_password(&form.password)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?;
    let new_user = NewUser {
        username: form.username.trim().to_string(),
        full_name: optional(&form.full_name),
        phone_number: optional(&form.phone_number),
        is_owner: form.wants_owner(),
        password_hash,
    };

    let created = match state.users.create(new_user).await {
        Ok(created) => created,
        Err(CoreError::Conflict(_)) => {
            let errors = FieldErrors::single("username", USERNAME_TAKEN_MESSAGE);
            return register_page(&user, jar, &form, Some(&errors));
        }
        Err(other) => return Err(other.into()),
    };
    info!("User {} registered", created.id);

    let jar = sign_in(&state, jar, &created)?;
    let jar = flash::push(jar, FlashLevel::Success, format!("Welcome, {}!", created.display_name()));
    Ok((jar, Redirect::to("/dashboard")).into_response())
}

// ============================================================================
// Login / logout
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct LoginQuery {
    #[serde(default)]
    next: String,
}

fn login_page(
    user: &MaybeUser,
    jar: CookieJar,
    status: StatusCode,
    username: String,
    next: String,
    errors: Vec<String>,
) -> Result<Response, AppError> {
    let (jar, flashes) = flash::take(jar);
    let page = render(LoginTemplate {
        chrome: Chrome::new(user.0.as_ref(), flashes),
        username,
        next,
        errors,
    })?;
    Ok((status, jar, page).into_response())
}

/// GET /login?next=
async fn login_form(
    user: MaybeUser,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
) -> Result<Response, AppError> {
    let next = safe_next(&query.next).to_string();
    login_page(&user, jar, StatusCode::OK, String::new(), next, Vec::new())
}

/// POST /login
async fn login(
    State(state): State<AppState>,
    user: MaybeUser,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let username = form.username.trim();
    let account = state.users.find_by_username(username).await?;

    let verified = match &account {
        Some(account) => verify_password(&form.password, &account.password_hash)
            .map_err(|e| anyhow::anyhow!("Password verification failed: {}", e))?,
        None => false,
    };

    let account = match account {
        Some(account) if verified => account,
        _ => {
            warn!("Failed login attempt for {:?}", username);
            let next = safe_next(&form.next).to_string();
            return login_page(
                &user,
                jar,
                StatusCode::UNAUTHORIZED,
                username.to_string(),
                next,
                vec![BAD_CREDENTIALS_MESSAGE.to_string()],
            );
        }
    };

    info!("User {} signed in", account.id);
    let jar = sign_in(&state, jar, &account)?;
    Ok((jar, Redirect::to(safe_next(&form.next))).into_response())
}

/// POST /logout
async fn logout(jar: CookieJar) -> Response {
    let jar = jar.remove(cleared_session_cookie());
    let jar = flash::push(jar, FlashLevel::Info, LOGGED_OUT_MESSAGE);
    (jar, Redirect::to("/")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            username: username.into(),
            password: password.into(),
            password_confirm: confirm.into(),
            ..RegisterForm::default()
        }
    }

    #[test]
    fn test_registration_accepts_valid_form() {
        assert!(validate_registration(&form("pilot.joao", "s3cret-pass", "s3cret-pass")).is_ok());
    }

    #[test]
    fn test_registration_reports_each_problem() {
        let mut bad = form("x", "short", "other");
        bad.phone_number = "9".repeat(21);
        let errors = validate_registration(&bad).unwrap_err();

        assert!(errors.contains("username"));
        assert!(errors.contains("password"));
        assert!(errors.contains("password_confirm"));
        assert!(errors.contains("phone_number"));
        assert!(!errors.contains("full_name"));
    }

    #[test]
    fn test_blank_optional_fields_are_none() {
        assert_eq!(optional("   "), None);
        assert_eq!(optional(" Maria "), Some("Maria".to_string()));
    }
}
