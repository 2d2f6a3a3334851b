use std::net::TcpListener;

use actix_web::{
    dev::Server as ActixServer,
    web::{delete, get, post, put, Data},
    App, HttpServer,
};
use anyhow::Context;
use tracing::debug;
use tracing_actix_web::TracingLogger;

use crate::{
    cache::CachePool, database, routes::*, verification::CodeStore, Config, DbPool, EmailClient,
};

pub struct Server {
    port: u16,
    server: ActixServer,
}

impl Server {
    /// Connects both pools (probing each once, so a dead dependency aborts
    /// startup), then binds the listener and wires up the routes.
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let db_pool = database::connect(&config.database)
            .await
            .context("Failed to connect to Postgres")?;
        let cache_pool = CachePool::connect(&config.redis)
            .await
            .context("Failed to connect to Redis")?;
        let email_client = EmailClient::new(config.email_client);
        let code_store = CodeStore::new();
        Self::spawn_challenge_sweeper(code_store.clone());
        let listener = TcpListener::bind(config.application.addr())
            .context("Failed to bind the application address")?;
        let port = listener.local_addr()?.port();
        let server = Self::http_server(listener, db_pool, cache_pool, email_client, code_store)?;
        Ok(Self { port, server })
    }

    pub async fn run(self) -> std::io::Result<()> {
        self.server.await
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn http_server(
        listener: TcpListener,
        db_pool: DbPool,
        cache_pool: CachePool,
        email_client: EmailClient,
        code_store: CodeStore,
    ) -> std::io::Result<ActixServer> {
        let db_pool = Data::new(db_pool);
        let cache_pool = Data::new(cache_pool);
        let email_client = Data::new(email_client);
        let code_store = Data::new(code_store);
        HttpServer::new(move || {
            App::new()
                .wrap(TracingLogger::default())
                .route("/health", get().to(report_health))
                .route("/auth/send-verification-code", post().to(send_verification_code))
                .route("/auth/login-with-code", post().to(login_with_code))
                .route("/auth/register-with-code", post().to(register_with_code))
                .route("/users", get().to(list_users))
                .route("/users", post().to(create_user))
                .route("/users/{id}", get().to(get_user))
                .route("/users/{id}", put().to(update_user))
                .route("/users/{id}", delete().to(delete_user))
                .app_data(db_pool.clone())
                .app_data(cache_pool.clone())
                .app_data(email_client.clone())
                .app_data(code_store.clone())
        })
        .listen(listener)
        .map(|s| s.run())
    }

    fn spawn_challenge_sweeper(code_store: CodeStore) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                let purged = code_store.purge_expired();
                if purged > 0 {
                    debug!("Purged {} expired verification challenges", purged);
                }
            }
        });
    }
}
