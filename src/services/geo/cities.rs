use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GeoService;
use crate::models::addresses::requests::CreateCityRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{bad_request, internal_error, not_found, validation_failed};
use crate::utils::validate::ValidateRequest;

async fn state_missing(
    service: &GeoService,
    state_id: i64,
    request: &HttpRequest,
) -> ActixResult<Option<HttpResponse>> {
    let storage = service.get_storage(request)?;
    Ok(match storage.get_state_by_id(state_id).await {
        Ok(Some(_)) => None,
        Ok(None) => Some(not_found(request, ErrorCode::StateNotFound, "State not found")),
        Err(e) => Some(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to get state: {e}"),
        )),
    })
}

pub async fn list_cities(
    service: &GeoService,
    state_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Some(response) = state_missing(service, state_id, request).await? {
        return Ok(response);
    }

    let storage = service.get_storage(request)?;
    match storage.list_cities(state_id).await {
        Ok(cities) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(cities, "City list retrieved successfully").at(request),
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to retrieve city list: {e}"),
        )),
    }
}

pub async fn create_city(
    service: &GeoService,
    state_id: i64,
    mut city: CreateCityRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    city.name = city.name.trim().to_string();
    if let Err(msg) = city.validate_request() {
        return Ok(validation_failed(request, msg));
    }
    if let Some(response) = state_missing(service, state_id, request).await? {
        return Ok(response);
    }

    let storage = service.get_storage(request)?;
    match storage.city_exists(state_id, &city.name).await {
        Ok(true) => {
            return Ok(bad_request(
                request,
                ErrorCode::GeoAlreadyExists,
                "City already exists in this state",
            ));
        }
        Ok(false) => {}
        Err(e) => {
            return Ok(internal_error(
                request,
                ErrorCode::InternalServerError,
                format!("City creation failed: {e}"),
            ));
        }
    }

    match storage.create_city(state_id, city).await {
        Ok(city) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(city, "City created successfully").at(request))),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("City creation failed: {e}"),
        )),
    }
}
