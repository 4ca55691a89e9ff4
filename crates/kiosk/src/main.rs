use std::path::PathBuf;

use anyhow::Result;
use signage_core::Dashboard;
use signage_kiosk::{
    DataSource, HtmlSurface, HttpTransport, JsonpTransport, RefreshScheduler, Schedule, Settings,
    Transport, TransportKind, logging,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: signage [signage.toml]");
        std::process::exit(1);
    }

    let filter = logging::init();
    let settings = Settings::load(args.get(1).map(PathBuf::from).as_deref())?;
    logging::apply_level(&filter, &settings.logging.level);
    tracing::info!(
        proxy = %settings.proxy_url,
        transport = ?settings.transport,
        output = %settings.output.display(),
        "configuration loaded"
    );

    match settings.transport {
        TransportKind::Http => {
            let transport = HttpTransport::new(settings.request_timeout())?;
            serve(&settings, transport).await
        }
        TransportKind::Jsonp => {
            let transport = JsonpTransport::new(settings.request_timeout())?;
            serve(&settings, transport).await
        }
    }
}

async fn serve<T: Transport + 'static>(settings: &Settings, transport: T) -> Result<()> {
    let source = DataSource::new(&settings.proxy_url, transport)?;
    let surface = HtmlSurface::new(settings.layout.clone()).with_output(&settings.output);
    let dashboard = Dashboard::new(surface, settings.dashboard_options());
    let scheduler = RefreshScheduler::new(
        dashboard,
        source,
        Schedule::from(&settings.refresh),
        settings.display_zone()?,
    );

    scheduler
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await;
    Ok(())
}
