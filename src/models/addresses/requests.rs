use serde::Deserialize;
use validator::Validate;

use crate::utils::validate::{ValidateRequest, validate_iso_country_code};

// 创建国家请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCountryRequest {
    #[validate(length(min = 1, max = 100, message = "Country name must be 1-100 characters"))]
    pub name: String,
    #[validate(custom(function = "validate_iso_country_code"))]
    pub iso_code: String,
}

impl ValidateRequest for CreateCountryRequest {
    const FIELD_ORDER: &'static [&'static str] = &["name", "iso_code"];
}

// 创建州/省请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStateRequest {
    #[validate(length(min = 1, max = 100, message = "State name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 10, message = "State code must be at most 10 characters"))]
    pub code: Option<String>,
}

impl ValidateRequest for CreateStateRequest {
    const FIELD_ORDER: &'static [&'static str] = &["name", "code"];
}

// 创建城市请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCityRequest {
    #[validate(length(min = 1, max = 100, message = "City name must be 1-100 characters"))]
    pub name: String,
}

impl ValidateRequest for CreateCityRequest {
    const FIELD_ORDER: &'static [&'static str] = &["name"];
}

// 创建地址请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAddressRequest {
    pub city_id: i64,
    #[validate(length(min = 1, max = 200, message = "Address line 1 must be 1-200 characters"))]
    pub line1: String,
    #[validate(length(max = 200, message = "Address line 2 must be at most 200 characters"))]
    pub line2: Option<String>,
    #[validate(length(max = 20, message = "Postal code must be at most 20 characters"))]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl ValidateRequest for CreateAddressRequest {
    const FIELD_ORDER: &'static [&'static str] = &["line1", "line2", "postal_code"];
}

// 更新地址请求
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAddressRequest {
    pub city_id: Option<i64>,
    #[validate(length(min = 1, max = 200, message = "Address line 1 must be 1-200 characters"))]
    pub line1: Option<String>,
    #[validate(length(max = 200, message = "Address line 2 must be at most 200 characters"))]
    pub line2: Option<String>,
    #[validate(length(max = 20, message = "Postal code must be at most 20 characters"))]
    pub postal_code: Option<String>,
    pub is_default: Option<bool>,
}

impl ValidateRequest for UpdateAddressRequest {
    const FIELD_ORDER: &'static [&'static str] = &["line1", "line2", "postal_code"];
}
