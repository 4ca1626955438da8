//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use accounts_backend::inbound::http::ErrorPolicy;
use accounts_backend::inbound::http::session_config::SessionSettings;
use accounts_backend::outbound::persistence::DbPool;

/// Everything `create_server` needs, resolved from settings at startup.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) error_policy: ErrorPolicy,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, error_policy: ErrorPolicy) -> Self {
        Self {
            session,
            bind_addr,
            error_policy,
            db_pool: None,
        }
    }

    /// Store users in PostgreSQL instead of memory.
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
