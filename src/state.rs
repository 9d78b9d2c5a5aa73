use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::relay::sheets::SheetsClient;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub sheets: Option<Arc<SheetsClient>>,
}
