pub mod create;
pub mod delete;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::courses::requests::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::storage::Storage;

pub struct CategoryService {
    storage: Option<Arc<dyn Storage>>,
}

impl CategoryService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::common::storage_from(request),
        }
    }

    pub async fn list_categories(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_categories(self, request).await
    }

    pub async fn create_category(
        &self,
        category: CreateCategoryRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_category(self, category, request).await
    }

    pub async fn update_category(
        &self,
        category_id: i64,
        update: UpdateCategoryRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_category(self, category_id, update, request).await
    }

    pub async fn delete_category(
        &self,
        category_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_category(self, category_id, request).await
    }
}

/// 分类名是否已被其他分类占用
pub(crate) async fn name_taken(
    storage: &Arc<dyn Storage>,
    name: &str,
    exclude_id: Option<i64>,
) -> crate::errors::Result<bool> {
    Ok(storage
        .get_category_by_name(name)
        .await?
        .is_some_and(|category| Some(category.id) != exclude_id))
}
