use std::process::ExitCode;

use configs::AppConfig;
use server::errors::StartupError;
use tokio::runtime::Runtime;
use tracing::{error, info};
use uuid::Uuid;

const SERVICE: &str = "car-server";

/// Process identity attached to lifecycle events.
#[derive(Clone, Copy)]
struct Instance {
    id: Uuid,
    pid: u32,
}

fn init_logging() {
    // .env first so RUST_LOG / LOG_FORMAT take effect
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_from_env();
}

fn install_panic_hook(instance: Instance) {
    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = SERVICE,
            event = "panic",
            service_id = %instance.id,
            pid = instance.pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));
}

fn build_runtime(cfg: &AppConfig) -> std::io::Result<Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads {
        builder.worker_threads(w);
    }
    builder.build()
}

/// Name the failure so an unreachable store is distinguishable from a bind error in logs.
fn startup_event(e: &anyhow::Error) -> &'static str {
    match e.downcast_ref::<StartupError>() {
        Some(StartupError::Store(_)) => "store_unreachable",
        Some(StartupError::Bind(_)) => "bind_failed",
        None => "run_failed",
    }
}

/// Serve until the server stops on its own or Ctrl+C arrives. No connection drain.
async fn serve(cfg: AppConfig, instance: Instance) -> ExitCode {
    let server_task = tokio::spawn(server::run(cfg));

    tokio::select! {
        res = server_task => match res {
            Ok(Ok(())) => {
                info!(service = SERVICE, event = "stop", service_id = %instance.id, "car server stopped");
                ExitCode::SUCCESS
            }
            Ok(Err(e)) => {
                error!(service = SERVICE, event = startup_event(&e), error = %e, "car server failed");
                ExitCode::FAILURE
            }
            Err(e) => {
                error!(service = SERVICE, event = "task_join_error", error = %e, "server task join error");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            info!(service = SERVICE, event = "shutdown_signal", service_id = %instance.id, "received Ctrl+C, exiting");
            ExitCode::SUCCESS
        }
    }
}

fn main() -> ExitCode {
    init_logging();

    let instance = Instance { id: Uuid::new_v4(), pid: std::process::id() };
    install_panic_hook(instance);

    let cfg = match AppConfig::load_or_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = SERVICE, event = "config_invalid", error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let rt = match build_runtime(&cfg) {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = SERVICE, event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = SERVICE,
        event = "start",
        service_id = %instance.id,
        pid = instance.pid,
        version = env!("CARGO_PKG_VERSION"),
        bind = %cfg.server.bind_addr(),
        database = %cfg.database.database,
        collection = %cfg.database.collection,
        "car server starting"
    );

    rt.block_on(serve(cfg, instance))
}
