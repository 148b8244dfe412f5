use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AddressService, ensure_city};
use crate::middlewares::RequireJWT;
use crate::models::addresses::requests::CreateAddressRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{internal_error, unauthorized, validation_failed};
use crate::utils::validate::ValidateRequest;

pub async fn create_address(
    service: &AddressService,
    mut address: CreateAddressRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(request) else {
        return Ok(unauthorized(request));
    };

    address.line1 = address.line1.trim().to_string();
    if let Err(msg) = address.validate_request() {
        return Ok(validation_failed(request, msg));
    }

    let storage = service.get_storage(request)?;
    if let Err(response) = ensure_city(&storage, address.city_id, request).await {
        return Ok(response);
    }

    match storage.create_address(user_id, address).await {
        Ok(address) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(address, "Address created successfully").at(request))),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Address creation failed: {e}"),
        )),
    }
}
