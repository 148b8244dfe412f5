use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::errors::{Result, TutorHubError};
use crate::models::users::requests::CreateUserRequest;
use crate::notifications::Mailer;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::random_code::generate_random_password;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 默认管理员账号
const ADMIN_USERNAME: &str = "admin";
const ADMIN_EMAIL: &str = "admin@tutorhub.local";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub mailer: Arc<Mailer>,
}

/// 按名称构造缓存后端
async fn build_cache(name: &str) -> Result<Arc<dyn ObjectCache>> {
    let constructor = get_object_cache_plugin(name).ok_or_else(|| {
        TutorHubError::cache_plugin_not_found(format!("Cache backend '{name}' not found in registry"))
    })?;
    let cache = constructor().await?;
    Ok(Arc::from(cache))
}

/// 创建缓存实例，配置的后端不可用时回退到内存缓存
pub async fn create_cache() -> Result<Arc<dyn ObjectCache>> {
    let cache_type = &AppConfig::get().cache.cache_type;
    warn!("Attempting to create {} cache backend", cache_type);

    match build_cache(cache_type).await {
        Ok(cache) => {
            warn!("Successfully created {} cache backend", cache_type);
            Ok(cache)
        }
        Err(e) if cache_type != "moka" => {
            warn!("Failed to create {} cache: {}", cache_type, e);
            warn!("Falling back to memory cache");
            let cache = build_cache("moka").await?;
            warn!("Successfully created fallback Moka (in-memory) cache backend");
            Ok(cache)
        }
        Err(e) => Err(e),
    }
}

/// 初始化默认管理员账号
/// 如果数据库中没有任何用户，则创建一个默认的 admin 账号
pub async fn seed_admin(storage: &Arc<dyn Storage>) {
    match storage.count_users().await {
        Ok(count) if count > 0 => {
            debug!(
                "Database already has {} user(s), skipping admin seed",
                count
            );
            return;
        }
        Ok(_) => {
            info!("No users found in database, creating default admin account...");
        }
        Err(e) => {
            warn!("Failed to count users: {}, skipping admin seed", e);
            return;
        }
    }

    let admin_role = match storage.get_role_by_name("admin").await {
        Ok(Some(role)) => role,
        Ok(None) => {
            warn!("Role 'admin' is missing, skipping admin seed");
            return;
        }
        Err(e) => {
            warn!("Failed to load admin role: {}, skipping admin seed", e);
            return;
        }
    };

    // 获取密码：优先从环境变量，否则生成随机密码
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        let pwd = generate_random_password(16);
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated admin password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash admin password: {}, skipping admin seed", e);
            return;
        }
    };

    let admin_request = CreateUserRequest {
        username: ADMIN_USERNAME.to_string(),
        email: ADMIN_EMAIL.to_string(),
        password: password_hash,
        first_name: Some("Administrator".to_string()),
        last_name: None,
        phone: None,
        role_ids: Some(vec![admin_role.id]),
    };

    match storage.create_user(admin_request).await {
        Ok(user) => {
            info!(
                "Default admin account created successfully (ID: {}, username: {})",
                user.id, user.username
            );
        }
        Err(e) => {
            warn!("Failed to create admin account: {}", e);
        }
    }
}

/// 准备服务器启动的上下文
/// 包括存储、缓存和邮件发送器
pub async fn prepare_server_startup() -> Result<StartupContext> {
    // 重复安装时返回 Err，说明已有可用的 provider
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
        debug!("Debug mode: Cache registry is enabled");
    }

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    seed_admin(&storage).await;

    let cache = create_cache().await?;
    warn!("Cache backend initialized");

    let mailer = Mailer::from_config(&AppConfig::get().mail)?;
    warn!(
        "Mailer initialized with transports: [{}]",
        mailer.transport_names().join(", ")
    );

    Ok(StartupContext {
        storage,
        cache,
        mailer: Arc::new(mailer),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    #[tokio::test]
    async fn test_seed_admin_only_when_empty() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());

        seed_admin(&storage).await;
        let admin = storage
            .get_user_by_username(ADMIN_USERNAME)
            .await
            .unwrap()
            .expect("admin should be seeded");
        assert!(admin.is_admin());

        // 已有用户时不再创建
        seed_admin(&storage).await;
        assert_eq!(storage.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_cache_uses_memory_backend() {
        let cache = create_cache().await.expect("moka backend is registered");
        cache
            .insert_raw("startup:k".to_string(), "v".to_string(), 0)
            .await;
        assert_eq!(
            cache.get_raw("startup:k").await.into_option().as_deref(),
            Some("v")
        );
    }
}
