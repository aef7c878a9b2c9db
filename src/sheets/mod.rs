use crate::state::SheetsState;
use axum::Router;

pub mod api_key;
pub mod dto;
pub mod handlers;
pub mod store;

pub fn router() -> Router<SheetsState> {
    handlers::sheet_routes()
}
