use gatehouse::{app, state::SheetsState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing("gatehouse=debug,sheets=debug,axum=info,tower_http=info");

    let state = SheetsState::init()?;
    let (host, port) = (state.config.host.clone(), state.config.port);
    let app = app::build_sheets_app(state);

    app::serve(app, &host, port).await
}
