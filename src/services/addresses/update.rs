use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AddressService, ensure_city, load_owned_address};
use crate::models::addresses::requests::UpdateAddressRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{internal_error, not_found, validation_failed};
use crate::utils::validate::ValidateRequest;

pub async fn update_address(
    service: &AddressService,
    address_id: i64,
    mut update: UpdateAddressRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    update.line1 = update.line1.map(|line| line.trim().to_string());
    if let Err(msg) = update.validate_request() {
        return Ok(validation_failed(request, msg));
    }

    let storage = service.get_storage(request)?;
    if let Err(response) = load_owned_address(&storage, address_id, request).await {
        return Ok(response);
    }
    if let Some(city_id) = update.city_id
        && let Err(response) = ensure_city(&storage, city_id, request).await
    {
        return Ok(response);
    }

    match storage.update_address(address_id, update).await {
        Ok(Some(detail)) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(detail, "Address updated successfully").at(request))),
        Ok(None) => Ok(not_found(
            request,
            ErrorCode::AddressNotFound,
            "Address not found",
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Address update failed: {e}"),
        )),
    }
}
