pub mod create;
pub mod delete;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::roles::requests::{CreatePermissionRequest, PermissionListParams};
use crate::storage::Storage;

pub struct PermissionService {
    storage: Option<Arc<dyn Storage>>,
}

impl PermissionService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::common::storage_from(request),
        }
    }

    pub async fn list_permissions(
        &self,
        query: PermissionListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_permissions(self, query, request).await
    }

    pub async fn create_permission(
        &self,
        permission: CreatePermissionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_permission(self, permission, request).await
    }

    pub async fn delete_permission(
        &self,
        permission_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_permission(self, permission_id, request).await
    }
}
