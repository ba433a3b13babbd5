use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use aerofacil_core::{CoreError, FieldErrors};
use crate::error::AppError;
use crate::flash::{self, FlashLevel};
use crate::forms::{error_messages, TripForm};
use crate::listings::parse_trip_id;
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::views::{
    aircraft_options, render, status_options, trip_cards, Chrome, DashboardTemplate,
    TripCard, TripDeleteTemplate, TripFormTemplate,
};

pub const TRIP_CREATED_MESSAGE: &str = "Your trip has been listed successfully!";
pub const TRIP_UPDATED_MESSAGE: &str = "Trip updated successfully!";
pub const TRIP_DELETED_MESSAGE: &str = "Trip removed successfully.";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/trips/new", get(new_trip_form).post(create_trip))
        .route("/trips/{id}/edit", get(edit_trip_form).post(update_trip))
        .route("/trips/{id}/delete", get(confirm_delete).post(delete_trip))
}

/// GET /dashboard
async fn dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let trips = state.marketplace.owner_trips(user.id).await?;
    let aircraft = state.marketplace.aircraft_choices(user.id).await?;

    let (jar, flashes) = flash::take(jar);
    let page = render(DashboardTemplate {
        chrome: Chrome::new(Some(&user), flashes),
        trips: trip_cards(&trips),
        has_aircraft: !aircraft.is_empty(),
    })?;
    Ok((jar, page).into_response())
}

/// Where a trip form was posted and what it edits.
enum FormTarget {
    Create,
    Edit(Uuid),
}

impl FormTarget {
    fn heading(&self) -> &'static str {
        match self {
            FormTarget::Create => "List a new trip",
            FormTarget::Edit(_) => "Edit trip",
        }
    }

    fn action(&self) -> String {
        match self {
            FormTarget::Create => "/trips/new".to_string(),
            FormTarget::Edit(id) => format!("/trips/{}/edit", id),
        }
    }
}

async fn trip_form_page(
    state: &AppState,
    user: &CurrentUser,
    jar: CookieJar,
    target: FormTarget,
    form: TripForm,
    errors: Option<FieldErrors>,
) -> Result<Response, AppError> {
    let aircraft = state.marketplace.aircraft_choices(user.id).await?;
    let status = if errors.is_some() { StatusCode::UNPROCESSABLE_ENTITY } else { StatusCode::OK };

    let (jar, flashes) = flash::take(jar);
    let page = render(TripFormTemplate {
        chrome: Chrome::new(Some(user), flashes),
        heading: target.heading().to_string(),
        action: target.action(),
        aircraft_options: aircraft_options(&aircraft, &form.aircraft),
        status_options: status_options(&form.status),
        show_status: matches!(target, FormTarget::Edit(_)),
        errors: errors.as_ref().map(error_messages).unwrap_or_default(),
        form,
    })?;
    Ok((status, jar, page).into_response())
}

/// GET /trips/new
async fn new_trip_form(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    trip_form_page(&state, &user, jar, FormTarget::Create, TripForm::default(), None).await
}

/// POST /trips/new
async fn create_trip(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    Form(form): Form<TripForm>,
) -> Result<Response, AppError> {
    let result = match form.to_draft() {
        Ok(draft) => state.marketplace.create_trip(user.id, draft).await,
        Err(errors) => Err(CoreError::Invalid(errors)),
    };

    match result {
        Ok(_) => {
            let jar = flash::push(jar, FlashLevel::Success, TRIP_CREATED_MESSAGE);
            Ok((jar, Redirect::to("/dashboard")).into_response())
        }
        Err(CoreError::Invalid(errors)) => {
            trip_form_page(&state, &user, jar, FormTarget::Create, form, Some(errors)).await
        }
        Err(other) => Err(other.into()),
    }
}

/// GET /trips/{id}/edit
async fn edit_trip_form(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let trip = state.marketplace.owned_trip(parse_trip_id(&id)?, user.id).await?;
    let form = TripForm::from_trip(&trip);
    trip_form_page(&state, &user, jar, FormTarget::Edit(trip.id), form, None).await
}

/// POST /trips/{id}/edit
async fn update_trip(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    Path(id): Path<String>,
    Form(form): Form<TripForm>,
) -> Result<Response, AppError> {
    // Ownership is settled before the submission is looked at.
    let trip = state.marketplace.owned_trip(parse_trip_id(&id)?, user.id).await?;

    let result = match form.to_changes() {
        Ok(changes) => state.marketplace.update_trip(trip.id, user.id, changes).await,
        Err(errors) => Err(CoreError::Invalid(errors)),
    };

    match result {
        Ok(_) => {
            let jar = flash::push(jar, FlashLevel::Success, TRIP_UPDATED_MESSAGE);
            Ok((jar, Redirect::to("/dashboard")).into_response())
        }
        Err(CoreError::Invalid(errors)) => {
            trip_form_page(&state, &user, jar, FormTarget::Edit(trip.id), form, Some(errors)).await
        }
        Err(other) => Err(other.into()),
    }
}

/// GET /trips/{id}/delete
async fn confirm_delete(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let trip = state.marketplace.owned_trip(parse_trip_id(&id)?, user.id).await?;

    let (jar, flashes) = flash::take(jar);
    let page = render(TripDeleteTemplate {
        chrome: Chrome::new(Some(&user), flashes),
        trip: TripCard::from(&trip),
    })?;
    Ok((jar, page).into_response())
}

/// POST /trips/{id}/delete
async fn delete_trip(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.marketplace.delete_trip(parse_trip_id(&id)?, user.id).await?;

    let jar = flash::push(jar, FlashLevel::Success, TRIP_DELETED_MESSAGE);
    Ok((jar, Redirect::to("/dashboard")).into_response())
}
