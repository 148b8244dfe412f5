//! 地理层级与地址存储操作

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{addresses, cities, countries, states};
use crate::errors::{Result, TutorHubError};
use crate::models::addresses::{
    entities::{Address, AddressDetail, City, Country, State},
    requests::{
        CreateAddressRequest, CreateCityRequest, CreateCountryRequest, CreateStateRequest,
        UpdateAddressRequest,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    // ==================== 国家 ====================

    pub async fn create_country_impl(&self, req: CreateCountryRequest) -> Result<Country> {
        let model = CountryActiveModel {
            name: Set(req.name),
            iso_code: Set(req.iso_code),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("创建国家失败: {e}")))?;

        Ok(result.into_country())
    }

    pub async fn get_country_by_id_impl(&self, id: i64) -> Result<Option<Country>> {
        let result = Countries::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询国家失败: {e}")))?;

        Ok(result.map(|m| m.into_country()))
    }

    pub async fn country_exists_impl(&self, name: &str, iso_code: &str) -> Result<bool> {
        let count = Countries::find()
            .filter(
                Condition::any()
                    .add(countries::Column::Name.eq(name))
                    .add(countries::Column::IsoCode.eq(iso_code)),
            )
            .count(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询国家失败: {e}")))?;

        Ok(count > 0)
    }

    pub async fn list_countries_impl(&self) -> Result<Vec<Country>> {
        let result = Countries::find()
            .order_by_asc(countries::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询国家列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_country()).collect())
    }

    // ==================== 省/州 ====================

    pub async fn create_state_impl(&self, country_id: i64, req: CreateStateRequest) -> Result<State> {
        let model = StateActiveModel {
            country_id: Set(country_id),
            name: Set(req.name),
            code: Set(req.code),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("创建省/州失败: {e}")))?;

        Ok(result.into_state())
    }

    pub async fn get_state_by_id_impl(&self, id: i64) -> Result<Option<State>> {
        let result = States::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询省/州失败: {e}")))?;

        Ok(result.map(|m| m.into_state()))
    }

    pub async fn state_exists_impl(&self, country_id: i64, name: &str) -> Result<bool> {
        let count = States::find()
            .filter(states::Column::CountryId.eq(country_id))
            .filter(states::Column::Name.eq(name))
            .count(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询省/州失败: {e}")))?;

        Ok(count > 0)
    }

    pub async fn list_states_impl(&self, country_id: i64) -> Result<Vec<State>> {
        let result = States::find()
            .filter(states::Column::CountryId.eq(country_id))
            .order_by_asc(states::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询省/州列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_state()).collect())
    }

    // ==================== 城市 ====================

    pub async fn create_city_impl(&self, state_id: i64, req: CreateCityRequest) -> Result<City> {
        let model = CityActiveModel {
            state_id: Set(state_id),
            name: Set(req.name),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("创建城市失败: {e}")))?;

        Ok(result.into_city())
    }

    pub async fn get_city_by_id_impl(&self, id: i64) -> Result<Option<City>> {
        let result = Cities::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询城市失败: {e}")))?;

        Ok(result.map(|m| m.into_city()))
    }

    pub async fn city_exists_impl(&self, state_id: i64, name: &str) -> Result<bool> {
        let count = Cities::find()
            .filter(cities::Column::StateId.eq(state_id))
            .filter(cities::Column::Name.eq(name))
            .count(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询城市失败: {e}")))?;

        Ok(count > 0)
    }

    pub async fn list_cities_impl(&self, state_id: i64) -> Result<Vec<City>> {
        let result = Cities::find()
            .filter(cities::Column::StateId.eq(state_id))
            .order_by_asc(cities::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询城市列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_city()).collect())
    }

    // ==================== 地址 ====================

    /// 地址附带完整的城市、省/州、国家信息
    async fn address_details(&self, rows: Vec<AddressModel>) -> Result<Vec<AddressDetail>> {
        let mut details = Vec::with_capacity(rows.len());

        for row in rows {
            let city = Cities::find_by_id(row.city_id)
                .one(&self.db)
                .await
                .map_err(|e| TutorHubError::database_operation(format!("查询城市失败: {e}")))?
                .ok_or_else(|| TutorHubError::not_found(format!("City {} not found", row.city_id)))?;
            let state = States::find_by_id(city.state_id)
                .one(&self.db)
                .await
                .map_err(|e| TutorHubError::database_operation(format!("查询省/州失败: {e}")))?
                .ok_or_else(|| {
                    TutorHubError::not_found(format!("State {} not found", city.state_id))
                })?;
            let country = Countries::find_by_id(state.country_id)
                .one(&self.db)
                .await
                .map_err(|e| TutorHubError::database_operation(format!("查询国家失败: {e}")))?
                .ok_or_else(|| {
                    TutorHubError::not_found(format!("Country {} not found", state.country_id))
                })?;

            details.push(AddressDetail {
                address: row.into_address(),
                city: city.into_city(),
                state: state.into_state(),
                country: country.into_country(),
            });
        }

        Ok(details)
    }

    /// 创建地址；设为默认时清除该用户之前的默认地址
    pub async fn create_address_impl(
        &self,
        user_id: i64,
        req: CreateAddressRequest,
    ) -> Result<Address> {
        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("开启事务失败: {e}")))?;

        if req.is_default {
            clear_default_address(&txn, user_id, None).await?;
        }

        let result = AddressActiveModel {
            user_id: Set(user_id),
            city_id: Set(req.city_id),
            line1: Set(req.line1),
            line2: Set(req.line2),
            postal_code: Set(req.postal_code),
            is_default: Set(req.is_default),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| TutorHubError::database_operation(format!("创建地址失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.into_address())
    }

    pub async fn get_address_by_id_impl(&self, id: i64) -> Result<Option<AddressDetail>> {
        let row = Addresses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询地址失败: {e}")))?;

        match row {
            Some(row) => Ok(self.address_details(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    pub async fn list_user_addresses_impl(&self, user_id: i64) -> Result<Vec<AddressDetail>> {
        let rows = Addresses::find()
            .filter(addresses::Column::UserId.eq(user_id))
            .order_by_desc(addresses::Column::IsDefault)
            .order_by_asc(addresses::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询地址列表失败: {e}")))?;

        self.address_details(rows).await
    }

    pub async fn update_address_impl(
        &self,
        id: i64,
        update: UpdateAddressRequest,
    ) -> Result<Option<AddressDetail>> {
        let Some(existing) = Addresses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询地址失败: {e}")))?
        else {
            return Ok(None);
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("开启事务失败: {e}")))?;

        let mut model = AddressActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(city_id) = update.city_id {
            model.city_id = Set(city_id);
        }

        if let Some(line1) = update.line1 {
            model.line1 = Set(line1);
        }

        if let Some(line2) = update.line2 {
            model.line2 = Set(Some(line2));
        }

        if let Some(postal_code) = update.postal_code {
            model.postal_code = Set(Some(postal_code));
        }

        if let Some(is_default) = update.is_default {
            if is_default {
                clear_default_address(&txn, existing.user_id, Some(id)).await?;
            }
            model.is_default = Set(is_default);
        }

        model
            .update(&txn)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("更新地址失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("提交事务失败: {e}")))?;

        self.get_address_by_id_impl(id).await
    }

    pub async fn delete_address_impl(&self, id: i64) -> Result<bool> {
        let result = Addresses::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("删除地址失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

async fn clear_default_address<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    except_id: Option<i64>,
) -> Result<()> {
    let mut update = Addresses::update_many()
        .col_expr(
            addresses::Column::IsDefault,
            sea_orm::sea_query::Expr::value(false),
        )
        .filter(addresses::Column::UserId.eq(user_id))
        .filter(addresses::Column::IsDefault.eq(true));

    if let Some(id) = except_id {
        update = update.filter(addresses::Column::Id.ne(id));
    }

    update
        .exec(conn)
        .await
        .map_err(|e| TutorHubError::database_operation(format!("清除默认地址失败: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::users::new_user_request;

    async fn seed_city(storage: &SeaOrmStorage) -> City {
        let country = storage
            .create_country(CreateCountryRequest {
                name: "Germany".into(),
                iso_code: "DE".into(),
            })
            .await
            .unwrap();
        let state = storage
            .create_state(
                country.id,
                CreateStateRequest {
                    name: "Berlin".into(),
                    code: Some("BE".into()),
                },
            )
            .await
            .unwrap();
        storage
            .create_city(state.id, CreateCityRequest { name: "Berlin".into() })
            .await
            .unwrap()
    }

    fn address_request(city_id: i64, line1: &str, is_default: bool) -> CreateAddressRequest {
        CreateAddressRequest {
            city_id,
            line1: line1.to_string(),
            line2: None,
            postal_code: Some("10115".into()),
            is_default,
        }
    }

    #[tokio::test]
    async fn test_geo_uniqueness_checks() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let city = seed_city(&storage).await;

        assert!(storage.country_exists("Germany", "XX").await.unwrap());
        assert!(storage.country_exists("Nowhere", "DE").await.unwrap());
        assert!(!storage.country_exists("France", "FR").await.unwrap());
        assert!(storage.city_exists(city.state_id, "Berlin").await.unwrap());
        assert!(!storage.city_exists(city.state_id, "Potsdam").await.unwrap());
    }

    #[tokio::test]
    async fn test_new_default_address_clears_previous() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let user = storage.create_user(new_user_request("frank")).await.unwrap();
        let city = seed_city(&storage).await;

        let first = storage
            .create_address(user.id, address_request(city.id, "Street 1", true))
            .await
            .unwrap();
        let second = storage
            .create_address(user.id, address_request(city.id, "Street 2", true))
            .await
            .unwrap();

        let addresses = storage.list_user_addresses(user.id).await.unwrap();
        assert_eq!(addresses.len(), 2);
        assert_eq!(addresses[0].address.id, second.id);
        assert!(addresses[0].address.is_default);
        assert!(!addresses[1].address.is_default);
        assert_eq!(addresses[0].country.iso_code, "DE");

        let updated = storage
            .update_address(
                first.id,
                UpdateAddressRequest {
                    city_id: None,
                    line1: None,
                    line2: None,
                    postal_code: None,
                    is_default: Some(true),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(updated.address.is_default);
        let second = storage.get_address_by_id(second.id).await.unwrap().unwrap();
        assert!(!second.address.is_default);
    }
}
