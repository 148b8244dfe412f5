pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::middlewares::RequireJWT;
use crate::models::ErrorCode;
use crate::models::addresses::entities::AddressDetail;
use crate::models::addresses::requests::{CreateAddressRequest, UpdateAddressRequest};
use crate::services::common::{forbidden, internal_error, not_found, unauthorized};
use crate::storage::Storage;

pub struct AddressService {
    storage: Option<Arc<dyn Storage>>,
}

impl AddressService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::common::storage_from(request),
        }
    }

    pub async fn list_addresses(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_addresses(self, request).await
    }

    pub async fn create_address(
        &self,
        address: CreateAddressRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_address(self, address, request).await
    }

    pub async fn get_address(
        &self,
        address_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_address(self, address_id, request).await
    }

    pub async fn update_address(
        &self,
        address_id: i64,
        update: UpdateAddressRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_address(self, address_id, update, request).await
    }

    pub async fn delete_address(
        &self,
        address_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_address(self, address_id, request).await
    }
}

/// 加载地址，只有地址所有者和管理员可以访问
pub(crate) async fn load_owned_address(
    storage: &Arc<dyn Storage>,
    address_id: i64,
    request: &HttpRequest,
) -> Result<AddressDetail, HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Err(unauthorized(request));
    };

    match storage.get_address_by_id(address_id).await {
        Ok(Some(detail)) if detail.address.user_id == user.id || user.is_admin() => Ok(detail),
        Ok(Some(_)) => Err(forbidden(request)),
        Ok(None) => Err(not_found(
            request,
            ErrorCode::AddressNotFound,
            "Address not found",
        )),
        Err(e) => Err(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to get address: {e}"),
        )),
    }
}

/// 检查城市是否存在
pub(crate) async fn ensure_city(
    storage: &Arc<dyn Storage>,
    city_id: i64,
    request: &HttpRequest,
) -> Result<(), HttpResponse> {
    match storage.get_city_by_id(city_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(not_found(request, ErrorCode::CityNotFound, "City not found")),
        Err(e) => Err(internal_error(
            request,
            ErrorCode::InternalServerError,
            format!("Failed to get city: {e}"),
        )),
    }
}
