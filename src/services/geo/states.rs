use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GeoService;
use crate::models::addresses::requests::CreateStateRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{bad_request, internal_error, not_found, validation_failed};
use crate::utils::validate::ValidateRequest;

async fn country_missing(
    service: &GeoService,
    country_id: i64,
    request: &HttpRequest,
) -> ActixResult<Option<HttpResponse>> {
    let storage = service.get_storage(request)?;
    Ok(match storage.get_country_by_id(country_id).await {
        Ok(Some(_)) => None,
        Ok(None) => Some(not_found(
            request,
            ErrorCode::CountryNotFound,
            "Country not found",
        )),
        Err(e) => Some(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to get country: {e}"),
        )),
    })
}

pub async fn list_states(
    service: &GeoService,
    country_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Some(response) = country_missing(service, country_id, request).await? {
        return Ok(response);
    }

    let storage = service.get_storage(request)?;
    match storage.list_states(country_id).await {
        Ok(states) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(states, "State list retrieved successfully").at(request),
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to retrieve state list: {e}"),
        )),
    }
}

pub async fn create_state(
    service: &GeoService,
    country_id: i64,
    mut state: CreateStateRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    state.name = state.name.trim().to_string();
    if let Err(msg) = state.validate_request() {
        return Ok(validation_failed(request, msg));
    }
    if let Some(response) = country_missing(service, country_id, request).await? {
        return Ok(response);
    }

    let storage = service.get_storage(request)?;
    match storage.state_exists(country_id, &state.name).await {
        Ok(true) => {
            return Ok(bad_request(
                request,
                ErrorCode::GeoAlreadyExists,
                "State already exists in this country",
            ));
        }
        Ok(false) => {}
        Err(e) => {
            return Ok(internal_error(
                request,
                ErrorCode::InternalServerError,
                format!("State creation failed: {e}"),
            ));
        }
    }

    match storage.create_state(country_id, state).await {
        Ok(state) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(state, "State created successfully").at(request))),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("State creation failed: {e}"),
        )),
    }
}
