use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use aerofacil_core::CoreError;
use crate::error::AppError;
use crate::flash::{self, FlashLevel};
use crate::forms::{error_messages, BookingForm};
use crate::listings::parse_trip_id;
use crate::middleware::{login_redirect, CurrentUser, MaybeUser};
use crate::state::AppState;
use crate::views::{render, BookingFormTemplate, Chrome, TripCard};

pub const OWN_TRIP_MESSAGE: &str = "You cannot book a seat on your own trip.";
pub const ALREADY_REQUESTED_MESSAGE: &str = "You have already shown interest in this trip.";
pub const BOOKED_MESSAGE: &str = "Your interest has been registered! The owner will get in touch.";

pub fn routes() -> Router<AppState> {
    Router::new().route("/trips/{id}/book", get(booking_form).post(create_booking))
}

/// GET /trips/{id}/book
async fn booking_form(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let trip = state.marketplace.trip(parse_trip_id(&id)?).await?;

    let (jar, flashes) = flash::take(jar);
    let form = BookingForm::default();
    let page = render(BookingFormTemplate {
        chrome: Chrome::new(Some(&user), flashes),
        trip: TripCard::from(&trip),
        seats_requested: form.seats_requested,
        message_to_owner: form.message_to_owner,
        errors: Vec::new(),
    })?;
    Ok((jar, page).into_response())
}

/// POST /trips/{id}/book
///
/// Self-booking and repeat requests are not errors to the visitor: they are
/// reported as flash messages on the trip page.
async fn create_booking(
    State(state): State<AppState>,
    user: MaybeUser,
    jar: CookieJar,
    Path(id): Path<String>,
    Form(form): Form<BookingForm>,
) -> Result<Response, AppError> {
    let trip_id = parse_trip_id(&id)?;
    let detail_url = format!("/trips/{}", trip_id);

    let result = state
        .marketplace
        .request_booking(trip_id, user.id(), form.to_draft())
        .await;

    let (level, message) = match result {
        Ok(booking) => {
            info!("Booking {} created via web form", booking.id);
            (FlashLevel::Success, BOOKED_MESSAGE)
        }
        Err(CoreError::OwnTrip) => (FlashLevel::Error, OWN_TRIP_MESSAGE),
        Err(CoreError::AlreadyRequested) => (FlashLevel::Warning, ALREADY_REQUESTED_MESSAGE),
        Err(CoreError::Unauthenticated) => return Ok(login_redirect(&format!("{}/book", detail_url))),
        Err(CoreError::Invalid(errors)) => {
            let trip = state.marketplace.trip(trip_id).await?;
            let (jar, flashes) = flash::take(jar);
            let page = render(BookingFormTemplate {
                chrome: Chrome::new(user.0.as_ref(), flashes),
                trip: TripCard::from(&trip),
                seats_requested: form.seats_requested,
                message_to_owner: form.message_to_owner,
                errors: error_messages(&errors),
            })?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, jar, page).into_response());
        }
        Err(other) => return Err(other.into()),
    };

    let jar = flash::push(jar, level, message);
    Ok((jar, Redirect::to(&detail_url)).into_response())
}
