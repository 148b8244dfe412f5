use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    pub id: i64,
    pub name: String,
    /// ISO 3166-1 alpha-2
    pub iso_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    pub id: i64,
    pub country_id: i64,
    pub name: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub state_id: i64,
    pub name: String,
}

// 用户地址
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub id: i64,
    pub user_id: i64,
    pub city_id: i64,
    pub line1: String,
    pub line2: Option<String>,
    pub postal_code: Option<String>,
    pub is_default: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 带完整地理层级的地址
#[derive(Debug, Clone, Serialize)]
pub struct AddressDetail {
    #[serde(flatten)]
    pub address: Address,
    pub city: City,
    pub state: State,
    pub country: Country,
}
