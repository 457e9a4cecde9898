use std::{future::IntoFuture, path::PathBuf, process, sync::Arc, time::Duration};

use sheetview::{
    application::{
        error::AppError,
        negotiation::Negotiation,
        reports::{REPORT_VAR, TITLE_VAR, report_templates},
        view::{FILENAME_VAR, SpreadsheetView, ViewOptions, ViewRequest, ViewVars},
    },
    config,
    domain::reports::sales_report,
    infra::{
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli().map_err(|err| {
        AppError::from(InfraError::configuration(format!(
            "failed to load configuration: {err}"
        )))
    })?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Export(args) => run_export(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let state = HttpState::new(
        Negotiation::with_spreadsheet_support(),
        report_templates(),
        settings.views.default_layout.as_str(),
    );
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(addr = %settings.server.addr, "listening");

    let shutdown = Arc::new(Notify::new());
    let trigger = Arc::clone(&shutdown);
    let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown(
        async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
            trigger.notify_one();
        },
    );

    tokio::select! {
        result = server.into_future() => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = drain_deadline(shutdown, settings.server.graceful_shutdown) => {
            warn!(
                timeout_secs = settings.server.graceful_shutdown.as_secs(),
                "graceful shutdown timed out"
            );
        }
    }

    Ok(())
}

async fn drain_deadline(shutdown: Arc<Notify>, grace: Duration) {
    shutdown.notified().await;
    tokio::time::sleep(grace).await;
}

async fn run_export(
    settings: config::Settings,
    args: config::ExportArgs,
) -> Result<(), AppError> {
    let quarter = args.quarter.trim().to_ascii_lowercase();
    let report = sales_report(&quarter).ok_or(AppError::NotFound)?;

    let mut vars = ViewVars::new();
    vars.set_serialized(REPORT_VAR, &report)
        .map_err(|err| AppError::unexpected(format!("failed to encode report: {err}")))?;
    vars.set(TITLE_VAR, report.title.clone());
    if let Some(filename) = args.filename {
        vars.set(FILENAME_VAR, filename);
    }

    let request = ViewRequest::new(format!("/sales/{quarter}.xlsx"));
    let options = ViewOptions::new("Sales")
        .with_layout(settings.views.default_layout)
        .with_vars(vars);

    let mut view = SpreadsheetView::new(request, options);
    let rendered = view.render(&report_templates(), None, None)?;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(view.filename()));
    let bytes = rendered.body.into_bytes();
    tokio::fs::write(&output, &bytes)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        path = %output.display(),
        bytes = bytes.len(),
        quarter = %quarter,
        "exported spreadsheet"
    );
    Ok(())
}
