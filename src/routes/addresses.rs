use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::addresses::requests::{
    CreateAddressRequest, CreateCityRequest, CreateCountryRequest, CreateStateRequest,
    UpdateAddressRequest,
};
use crate::models::roles::entities::ADMIN_ROLES;
use crate::services::{AddressService, GeoService};
use crate::utils::SafeIDI64;

static ADDRESS_SERVICE: Lazy<AddressService> = Lazy::new(AddressService::new_lazy);
static GEO_SERVICE: Lazy<GeoService> = Lazy::new(GeoService::new_lazy);

// 地理层级
pub async fn list_countries(req: HttpRequest) -> ActixResult<HttpResponse> {
    GEO_SERVICE.list_countries(&req).await
}

pub async fn create_country(
    req: HttpRequest,
    body: web::Json<CreateCountryRequest>,
) -> ActixResult<HttpResponse> {
    GEO_SERVICE.create_country(body.into_inner(), &req).await
}

pub async fn list_states(req: HttpRequest, country_id: SafeIDI64) -> ActixResult<HttpResponse> {
    GEO_SERVICE.list_states(country_id.0, &req).await
}

pub async fn create_state(
    req: HttpRequest,
    country_id: SafeIDI64,
    body: web::Json<CreateStateRequest>,
) -> ActixResult<HttpResponse> {
    GEO_SERVICE
        .create_state(country_id.0, body.into_inner(), &req)
        .await
}

pub async fn list_cities(req: HttpRequest, state_id: SafeIDI64) -> ActixResult<HttpResponse> {
    GEO_SERVICE.list_cities(state_id.0, &req).await
}

pub async fn create_city(
    req: HttpRequest,
    state_id: SafeIDI64,
    body: web::Json<CreateCityRequest>,
) -> ActixResult<HttpResponse> {
    GEO_SERVICE
        .create_city(state_id.0, body.into_inner(), &req)
        .await
}

// 当前用户的地址
pub async fn list_addresses(req: HttpRequest) -> ActixResult<HttpResponse> {
    ADDRESS_SERVICE.list_addresses(&req).await
}

pub async fn create_address(
    req: HttpRequest,
    body: web::Json<CreateAddressRequest>,
) -> ActixResult<HttpResponse> {
    ADDRESS_SERVICE.create_address(body.into_inner(), &req).await
}

pub async fn get_address(req: HttpRequest, address_id: SafeIDI64) -> ActixResult<HttpResponse> {
    ADDRESS_SERVICE.get_address(address_id.0, &req).await
}

pub async fn update_address(
    req: HttpRequest,
    address_id: SafeIDI64,
    body: web::Json<UpdateAddressRequest>,
) -> ActixResult<HttpResponse> {
    ADDRESS_SERVICE
        .update_address(address_id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_address(
    req: HttpRequest,
    address_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    ADDRESS_SERVICE.delete_address(address_id.0, &req).await
}

// 配置路由
pub fn configure_address_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/geo")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/countries")
                    .route(web::get().to(list_countries))
                    .route(
                        web::post()
                            .to(create_country)
                            .wrap(middlewares::RequireRole::new_any(ADMIN_ROLES)),
                    ),
            )
            .service(
                web::resource("/countries/{id}/states")
                    .route(web::get().to(list_states))
                    .route(
                        web::post()
                            .to(create_state)
                            .wrap(middlewares::RequireRole::new_any(ADMIN_ROLES)),
                    ),
            )
            .service(
                web::resource("/states/{id}/cities")
                    .route(web::get().to(list_cities))
                    .route(
                        web::post()
                            .to(create_city)
                            .wrap(middlewares::RequireRole::new_any(ADMIN_ROLES)),
                    ),
            ),
    )
    .service(
        web::scope("/api/v1/addresses")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_addresses))
                    .route(web::post().to(create_address)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_address))
                    .route(web::put().to(update_address))
                    .route(web::patch().to(update_address))
                    .route(web::delete().to(delete_address)),
            ),
    );
}
