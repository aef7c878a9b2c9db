use crate::state::SheetsState;
use axum::Router;

pub mod checks;
pub mod handlers;

pub fn router() -> Router<SheetsState> {
    handlers::linkcheck_routes()
}
