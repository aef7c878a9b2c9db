use crate::state::AccountsState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod pages;
pub mod repo;
pub mod repo_types;
pub mod reset_token;
pub mod services;

pub fn router() -> Router<AccountsState> {
    handlers::account_routes()
}
