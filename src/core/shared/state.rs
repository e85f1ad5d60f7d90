use crate::core::config::AppConfig;
use crate::core::rate_limit::KeyedRateLimiter;
use crate::core::shared::utils::DbPool;
use crate::email::Mailer;

pub struct AppState {
    pub conn: DbPool,
    pub config: AppConfig,
    pub mailer: Mailer,
    pub auth_limiter: KeyedRateLimiter,
}

impl AppState {
    pub fn new(conn: DbPool, config: AppConfig) -> Self {
        let mailer = Mailer::from_config(&config.email, &config.frontend_url);
        // Auth endpoints are deliberately strict: 5 requests burst, 1/s refill.
        let auth_limiter = KeyedRateLimiter::new(1, 5);
        Self {
            conn,
            config,
            mailer,
            auth_limiter,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("conn", &"DbPool")
            .field("server", &self.config.server)
            .finish()
    }
}
