use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AdminService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::internal_error;

pub async fn get_dashboard(
    service: &AdminService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.get_dashboard_stats().await {
        Ok(stats) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(stats, "Dashboard retrieved successfully").at(request))),
        Err(e) => Ok(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to load dashboard: {e}"),
        )),
    }
}
