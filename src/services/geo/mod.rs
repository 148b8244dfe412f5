pub mod countries;
pub mod states;
pub mod cities;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::addresses::requests::{
    CreateCityRequest, CreateCountryRequest, CreateStateRequest,
};
use crate::storage::Storage;

pub struct GeoService {
    storage: Option<Arc<dyn Storage>>,
}

impl GeoService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::common::storage_from(request),
        }
    }

    pub async fn list_countries(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        countries::list_countries(self, request).await
    }

    pub async fn create_country(
        &self,
        country: CreateCountryRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        countries::create_country(self, country, request).await
    }

    pub async fn list_states(
        &self,
        country_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        states::list_states(self, country_id, request).await
    }

    pub async fn create_state(
        &self,
        country_id: i64,
        state: CreateStateRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        states::create_state(self, country_id, state, request).await
    }

    pub async fn list_cities(
        &self,
        state_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        cities::list_cities(self, state_id, request).await
    }

    pub async fn create_city(
        &self,
        state_id: i64,
        city: CreateCityRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        cities::create_city(self, state_id, city, request).await
    }
}
