use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AddressService, load_owned_address};
use crate::models::ApiResponse;

pub async fn get_address(
    service: &AddressService,
    address_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match load_owned_address(&storage, address_id, request).await {
        Ok(detail) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(detail, "Address retrieved successfully").at(request))),
        Err(response) => Ok(response),
    }
}
