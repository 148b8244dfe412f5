use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AddressService, load_owned_address};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{internal_error, not_found};

pub async fn delete_address(
    service: &AddressService,
    address_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    if let Err(response) = load_owned_address(&storage, address_id, request).await {
        return Ok(response);
    }

    match storage.delete_address(address_id).await {
        Ok(true) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success_empty("Address deleted successfully").at(request))),
        Ok(false) => Ok(not_found(
            request,
            ErrorCode::AddressNotFound,
            "Address not found",
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Address deletion failed: {e}"),
        )),
    }
}
