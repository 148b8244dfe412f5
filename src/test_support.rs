//! 接口测试共用的应用上下文

use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::cache::object_cache::MokaCacheWrapper;
use crate::models::users::entities::User;
use crate::notifications::Mailer;
use crate::notifications::mailer::fakes::{Behavior, FakeTransport, mailer_with};
use crate::storage::Storage;
use crate::storage::sea_orm_storage::SeaOrmStorage;
use crate::storage::sea_orm_storage::users::new_user_request;
use crate::utils::jwt::JwtUtils;

pub(crate) struct TestContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub mailer: Arc<Mailer>,
}

impl TestContext {
    /// 内存数据库 + 内存缓存 + 总是成功的邮件通道
    pub async fn new() -> Self {
        let (transport, _) = FakeTransport::new("fake", Behavior::Succeed);
        Self::with_mailer(mailer_with(vec![transport])).await
    }

    pub async fn with_mailer(mailer: Mailer) -> Self {
        let storage = SeaOrmStorage::new_in_memory()
            .await
            .expect("in-memory storage should start");
        Self {
            storage: Arc::new(storage),
            cache: Arc::new(MokaCacheWrapper::with_capacity(100, 60)),
            mailer: Arc::new(mailer),
        }
    }

    /// 创建持有指定角色的用户，返回用户和访问令牌
    pub async fn user(&self, username: &str, roles: &[&str]) -> (User, String) {
        let mut role_ids = Vec::new();
        for role in roles {
            let role = self
                .storage
                .get_role_by_name(role)
                .await
                .unwrap()
                .expect("system role should be seeded");
            role_ids.push(role.id);
        }

        let mut request = new_user_request(username);
        request.role_ids = Some(role_ids);
        let user = self.storage.create_user(request).await.unwrap();
        let token = JwtUtils::generate_access_token(user.id, &user.roles).unwrap();
        (user, token)
    }
}

pub(crate) fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// 构造挂载全部路由的测试应用
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(
                    actix_web::web::JsonConfig::default()
                        .error_handler($crate::utils::json_error_handler),
                )
                .app_data(
                    actix_web::web::QueryConfig::default()
                        .error_handler($crate::utils::query_error_handler),
                )
                .app_data(actix_web::web::Data::new($ctx.storage.clone()))
                .app_data(actix_web::web::Data::new($ctx.cache.clone()))
                .app_data(actix_web::web::Data::new($ctx.mailer.clone()))
                .configure($crate::routes::configure_api_routes),
        )
        .await
    };
}

pub(crate) use test_app;
