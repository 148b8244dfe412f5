use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GeoService;
use crate::models::addresses::requests::CreateCountryRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{bad_request, internal_error, validation_failed};
use crate::utils::validate::ValidateRequest;

pub async fn list_countries(
    service: &GeoService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.list_countries().await {
        Ok(countries) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(countries, "Country list retrieved successfully").at(request),
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to retrieve country list: {e}"),
        )),
    }
}

pub async fn create_country(
    service: &GeoService,
    mut country: CreateCountryRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    country.name = country.name.trim().to_string();
    country.iso_code = country.iso_code.trim().to_uppercase();
    if let Err(msg) = country.validate_request() {
        return Ok(validation_failed(request, msg));
    }

    let storage = service.get_storage(request)?;

    match storage.country_exists(&country.name, &country.iso_code).await {
        Ok(true) => {
            return Ok(bad_request(
                request,
                ErrorCode::GeoAlreadyExists,
                "Country already exists",
            ));
        }
        Ok(false) => {}
        Err(e) => {
            return Ok(internal_error(
                request,
                ErrorCode::InternalServerError,
                format!("Country creation failed: {e}"),
            ));
        }
    }

    match storage.create_country(country).await {
        Ok(country) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(country, "Country created successfully").at(request))),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Country creation failed: {e}"),
        )),
    }
}
