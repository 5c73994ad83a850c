// Entrypoint for the CLI application.
// - Keeps `main` small: load configuration, build the API client and hand
//   a session to the UI loop.

use gistify_cli::{
    api::ApiClient,
    config::Config,
    logging::init_tracing,
    ui::{main_menu, Session},
};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    // `GISTIFY_API_URL` selects the service, default http://localhost:5000.
    let config = Config::from_env()?;
    tracing::info!(base_url = %config.base_url, "starting");
    let api = ApiClient::new(&config)?;

    // Blocks until the user exits.
    main_menu(Session::new(api, &config))?;
    Ok(())
}
