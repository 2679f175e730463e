use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;
use pushkind_common::db::establish_connection_pool;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::logout;

use purchase_tracker::amazon::{KnownProducts, VariantDetector};
use purchase_tracker::config::ServerConfig;
use purchase_tracker::repository::DieselRepository;
use purchase_tracker::routes::{
    auth, checkin, extension, purchase_tracker as tracker, retailer_orders, retailers,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    let secret_key = match &config.secret {
        Some(key) => Key::from(key.as_bytes()),
        None => Key::generate(),
    };

    let common_config = CommonServerConfig {
        secret: config.secret.clone().unwrap_or_default(),
        auth_service_url: config.auth_service_url.clone(),
    };

    let catalog = match &config.known_products_path {
        Some(path) => match KnownProducts::load(path) {
            Ok(catalog) => {
                log::info!("Loaded {} known products from {}", catalog.len(), path.display());
                catalog
            }
            Err(e) => {
                log::error!("Failed to load known products from {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => KnownProducts::default(),
    };
    let detector = VariantDetector::new(catalog);

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let domain = config.domain.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{domain}")))
                    .build(),
            )
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(
                web::scope("/api")
                    // Fixed segments before `{id}` captures.
                    .service(retailers::retailer_summary)
                    .service(retailers::get_retailer_by_name)
                    .service(retailers::upload_retailers)
                    .service(retailers::list_retailers)
                    .service(retailers::get_retailer)
                    .service(retailers::create_retailer)
                    .service(retailers::update_retailer)
                    .service(retailers::delete_retailer)
                    .service(tracker::purchase_statistics)
                    .service(tracker::lead_stats_by_retailer)
                    .service(tracker::list_leads)
                    .service(tracker::lead_purchases)
                    .service(tracker::get_lead)
                    .service(tracker::submit_lead)
                    .service(tracker::update_lead)
                    .service(tracker::list_asin_bank)
                    .service(tracker::list_purchases)
                    .service(tracker::get_purchase)
                    .service(tracker::update_purchase)
                    .service(tracker::delete_purchase)
                    .service(checkin::checkin_summary)
                    .service(checkin::order_checkins)
                    .service(checkin::list_checkins)
                    .service(checkin::get_checkin)
                    .service(checkin::create_checkin)
                    .service(checkin::update_checkin)
                    .service(checkin::delete_checkin)
                    .service(retailer_orders::process_order)
                    .service(retailer_orders::process_retailer_order)
                    .service(retailer_orders::process_inbound)
                    .service(extension::extension_message)
                    .service(extension::scrape_variants),
            )
            .service(
                web::scope("/auth")
                    .service(auth::list_users)
                    .service(auth::get_user)
                    .service(auth::set_user_role)
                    .service(auth::deactivate_user)
                    .service(auth::google_sign_in)
                    .service(auth::forgot_password)
                    .service(auth::reset_password),
            )
            .service(logout)
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(detector.clone()))
            .app_data(web::Data::new(common_config.clone()))
    })
    .bind((config.address.clone(), config.port))?
    .run()
    .await
}
