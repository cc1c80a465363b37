use crate::{
    api,
    setting::{Gateway as GatewaySetting, Setting},
    Error, Result, Service,
};
use actix_cors::Cors;
use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest},
    middleware, web, App as WebApp, HttpServer,
};
use payment_gateway::{Gateway, Local, Razorpay};
use sea_orm::{ConnectOptions, Database};
use std::{path::Path, time::Duration};
use tracing::info;

pub struct AppState {
    pub service: Service,
    pub setting: Setting,
}

impl AppState {
    pub async fn create<P: AsRef<Path>>(
        setting_path: Option<P>,
        setting_env_prefix: Option<String>,
    ) -> Result<Self> {
        let env_notice = setting_env_prefix
            .as_ref()
            .map(|s| {
                format!(
                    ", config will be overrided by ENV seting with prefix `{}_`",
                    s
                )
            })
            .unwrap_or_default();

        let setting = if let Some(path) = setting_path {
            info!("Load config {:?}{}", path.as_ref(), env_notice);
            Setting::read(path.as_ref(), setting_env_prefix)?
        } else if let Some(prefix) = setting_env_prefix {
            info!("Load default config{}", env_notice);
            Setting::from_env(prefix)?
        } else {
            info!("Load default config");
            Setting::default()
        };

        info!(
            db_url = setting.db_url.as_str(),
            gateway = ?setting.gateway,
            host = setting.network.host.as_str(),
            port = setting.network.port,
            "config loaded"
        );

        Self::from_setting(setting).await
    }

    pub async fn from_setting(setting: Setting) -> Result<Self> {
        let gateway: Box<dyn Gateway + Sync + Send> = match setting.gateway {
            GatewaySetting::Razorpay => {
                let s = setting
                    .razorpay
                    .clone()
                    .ok_or_else(|| Error::Message("Need config razorpay".to_string()))?;
                let timeout = (s.timeout > 0).then(|| Duration::from_secs(s.timeout));
                Box::new(Razorpay::new(s.url, s.key_id, s.key_secret, timeout)?)
            }
            GatewaySetting::Local => Box::new(Local::new(&setting.local.secret)),
        };

        let mut options = ConnectOptions::from(&setting.db_url);
        options.sqlx_logging_level(tracing::log::LevelFilter::Trace);
        if setting.db_url.starts_with("sqlite::memory:") {
            // every connection would open its own empty database
            options.max_connections(1);
        }
        let conn = Database::connect(options).await?;
        let service = Service::new(gateway, conn);

        Ok(Self { service, setting })
    }
}

pub fn create_web_app(
    data: web::Data<AppState>,
) -> WebApp<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let json = web::JsonConfig::default()
        .error_handler(|err, _req| Error::Validation(err.to_string()).into());
    let query = web::QueryConfig::default()
        .error_handler(|err, _req| Error::Validation(err.to_string()).into());
    WebApp::new()
        .app_data(data)
        .app_data(json)
        .app_data(query)
        .wrap(middleware::Logger::default()) // enable logger
        .service(api::index)
        .service(
            api::scope().wrap(
                Cors::default()
                    .allow_any_header()
                    .allow_any_origin()
                    .allow_any_method()
                    .max_age(86_400),
            ),
        )
        .default_service(web::to(not_found))
}

async fn not_found() -> Result<actix_web::HttpResponse> {
    Err(Error::NotFound("Not Found"))
}

/// start the http server
pub async fn start(state: AppState) -> Result<()> {
    let state = web::Data::new(state);

    let c_data = state.clone();
    let server = HttpServer::new(move || create_web_app(c_data.clone()));
    let num = if state.setting.thread.http == 0 {
        num_cpus::get()
    } else {
        state.setting.thread.http
    };
    let host = state.setting.network.host.clone();
    let port = state.setting.network.port;
    info!("Start http server {}:{}", host, port);
    server.workers(num).bind((host, port))?.run().await?;
    Ok(())
}
