use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;

use aerofacil_core::CoreError;
use crate::error::AppError;
use crate::flash::{self, FlashLevel};
use crate::forms::{error_messages, AircraftForm};
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::views::{render, AircraftFormTemplate, AircraftListTemplate, AircraftRow, Chrome};

pub const AIRCRAFT_CREATED_MESSAGE: &str = "Aircraft registered successfully!";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/aircraft", get(list_aircraft))
        .route("/aircraft/new", get(new_aircraft_form).post(create_aircraft))
}

/// GET /aircraft
async fn list_aircraft(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let aircraft = state.marketplace.aircraft_choices(user.id).await?;

    let (jar, flashes) = flash::take(jar);
    let page = render(AircraftListTemplate {
        chrome: Chrome::new(Some(&user), flashes),
        aircraft: aircraft
            .into_iter()
            .map(|a| AircraftRow { model_name: a.model_name, capacity: a.capacity })
            .collect(),
    })?;
    Ok((jar, page).into_response())
}

/// GET /aircraft/new
async fn new_aircraft_form(user: CurrentUser, jar: CookieJar) -> Result<Response, AppError> {
    let (jar, flashes) = flash::take(jar);
    let page = render(AircraftFormTemplate {
        chrome: Chrome::new(Some(&user), flashes),
        model_name: String::new(),
        capacity: String::new(),
        errors: Vec::new(),
    })?;
    Ok((jar, page).into_response())
}

/// POST /aircraft/new
async fn create_aircraft(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    Form(form): Form<AircraftForm>,
) -> Result<Response, AppError> {
    let result = match form.to_draft() {
        Ok(draft) => state.marketplace.register_aircraft(user.id, draft).await,
        Err(errors) => Err(CoreError::Invalid(errors)),
    };

    match result {
        Ok(_) => {
            let jar = flash::push(jar, FlashLevel::Success, AIRCRAFT_CREATED_MESSAGE);
            Ok((jar, Redirect::to("/aircraft")).into_response())
        }
        Err(CoreError::Invalid(errors)) => {
            let (jar, flashes) = flash::take(jar);
            let page = render(AircraftFormTemplate {
                chrome: Chrome::new(Some(&user), flashes),
                model_name: form.model_name,
                capacity: form.capacity,
                errors: error_messages(&errors),
            })?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, jar, page).into_response())
        }
        Err(other) => Err(other.into()),
    }
}
