use crate::state::SheetsState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod scanner;

pub fn router() -> Router<SheetsState> {
    handlers::scan_routes()
}
