use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AddressService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{internal_error, unauthorized};

pub async fn list_addresses(
    service: &AddressService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(request) else {
        return Ok(unauthorized(request));
    };
    let storage = service.get_storage(request)?;

    match storage.list_user_addresses(user_id).await {
        Ok(addresses) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(addresses, "Address list retrieved successfully").at(request),
        )),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to retrieve address list: {e}"),
        )),
    }
}
