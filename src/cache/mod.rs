//! 对象缓存
//!
//! 后端通过 `declare_object_cache_plugin!` 在程序加载时注册到插件表，
//! 启动阶段按 `cache.type` 配置取出构造器。

pub mod object_cache;
pub mod register;
pub mod traits;

pub use traits::{CacheResult, ObjectCache};

/// 声明缓存插件
///
/// 生成一个在程序加载时运行的注册函数，构造器调用类型的 `new()`。
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:literal, $ty:ty) => {
        #[ctor::ctor]
        unsafe fn __register_object_cache_plugin() {
            $crate::cache::register::register_object_cache_plugin(
                $name,
                std::sync::Arc::new(|| {
                    Box::pin(async {
                        <$ty>::new()
                            .map(|cache| {
                                Box::new(cache) as Box<dyn $crate::cache::ObjectCache>
                            })
                            .map_err($crate::errors::TutorHubError::cache_connection)
                    })
                }),
            );
        }
    };
}
