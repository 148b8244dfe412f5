pub mod dashboard;
pub mod email;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::admin::requests::TestEmailRequest;
use crate::storage::Storage;

pub struct AdminService {
    storage: Option<Arc<dyn Storage>>,
}

impl AdminService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::common::storage_from(request),
        }
    }

    pub async fn get_dashboard(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        dashboard::get_dashboard(self, request).await
    }

    pub async fn send_test_email(
        &self,
        body: TestEmailRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        email::send_test_email(body, request).await
    }
}
