use std::time::{Duration, Instant};

use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::middleware::{Compress, DefaultHeaders};
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use human_panic::setup_panic;
use tracing::{debug, error, warn};
use tracing_appender::non_blocking::WorkerGuard;

use tutorhub::config::AppConfig;
use tutorhub::routes;
use tutorhub::runtime::lifetime;
use tutorhub::runtime::lifetime::startup::StartupContext;
use tutorhub::utils::{json_error_handler, path_error_handler, query_error_handler};

/// 初始化日志，返回的 guard 需要保持到进程结束
fn init_tracing(config: &AppConfig) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.app.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_level(true);

    // 开发环境输出可读格式，其他环境输出 JSON
    if config.is_development() {
        builder
            .with_ansi(true)
            .with_file(true)
            .with_line_number(true)
            .init();
    } else {
        builder.with_ansi(false).json().init();
    }

    guard
}

fn build_server(config: &'static AppConfig, startup: StartupContext) -> std::io::Result<Server> {
    let StartupContext {
        storage,
        cache,
        mailer,
    } = startup;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(config.cors.max_age),
            )
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add((
                        "Keep-Alive",
                        format!("timeout={}", config.server.timeouts.keep_alive),
                    ))
                    .add(("Cache-Control", "no-store")),
            )
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .app_data(web::PayloadConfig::new(config.server.limits.max_payload_size))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(cache.clone()))
            .app_data(web::Data::new(mailer.clone()))
            .configure(routes::configure_api_routes)
    })
    .keep_alive(Duration::from_secs(config.server.timeouts.keep_alive))
    .client_request_timeout(Duration::from_millis(config.server.timeouts.client_request))
    .client_disconnect_timeout(Duration::from_millis(
        config.server.timeouts.client_disconnect,
    ))
    .workers(config.server.workers);

    #[cfg(unix)]
    if let Some(socket_path) = config.unix_socket_path() {
        warn!("Listening on unix socket {}", socket_path);
        // 上次异常退出可能遗留套接字文件
        if std::path::Path::new(socket_path).exists() {
            std::fs::remove_file(socket_path)?;
        }
        return Ok(server.bind_uds(socket_path)?.run());
    }

    let bind_address = config.server_bind_address();
    warn!("Listening on http://{}", bind_address);
    Ok(server.bind(bind_address)?.run())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    setup_panic!();
    let started = Instant::now();

    if let Err(e) = AppConfig::init() {
        eprintln!("Failed to initialize configuration: {e}");
        std::process::exit(1);
    }
    let config = AppConfig::get();
    let _guard = init_tracing(config);

    warn!(
        "{} v{} starting ({} workers)",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.server.workers
    );

    let startup = match lifetime::startup::prepare_server_startup().await {
        Ok(startup) => startup,
        Err(e) => {
            error!("{}", e.format_simple());
            return Err(std::io::Error::other(e.to_string()));
        }
    };
    debug!("Startup finished in {} ms", started.elapsed().as_millis());

    let server = build_server(config, startup)?;

    tokio::select! {
        res = server => res?,
        _ = lifetime::shutdown::listen_for_shutdown() => {
            warn!("Shutdown signal received, stopping server");
        }
    }

    Ok(())
}
