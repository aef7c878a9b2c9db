use gatehouse::{app, state::AccountsState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing("gatehouse=debug,accounts=debug,axum=info,tower_http=info");

    let state = AccountsState::init().await?;
    let (host, port) = (state.config.host.clone(), state.config.port);
    let app = app::build_accounts_app(state);

    app::serve(app, &host, port).await
}
