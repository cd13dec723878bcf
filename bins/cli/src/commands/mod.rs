//! Subcommand implementations and the shared composition root.

pub mod info;
pub mod status;
pub mod sync;

use crate::error::CliError;
use notesync_adapters::cache::{CachedRemote, MetadataCache};
use notesync_adapters::logger::JsonLogger;
use notesync_adapters::remote::HttpRemote;
use notesync_config::SyncAppConfig;
use notesync_ports::{LogLevel, LoggerPort, RemotePort};
use notesync_shared::RequestContext;
use std::path::PathBuf;
use std::sync::Arc;

/// Build the remote adapter, wrapped in the metadata cache when configured.
pub(crate) fn build_remote(config: &SyncAppConfig) -> Result<Arc<dyn RemotePort>, CliError> {
    let http = HttpRemote::new(&config.remote)?;
    Ok(match config.cache.path.as_deref() {
        Some(path) => Arc::new(CachedRemote::new(
            Arc::new(http),
            MetadataCache::new(PathBuf::from(path), config.cache.ttl_secs),
        )),
        None => Arc::new(http),
    })
}

/// Build the per-request logger, carrying the correlation id on every event.
pub(crate) fn request_logger(ctx: &RequestContext, verbose: bool) -> Arc<dyn LoggerPort> {
    let min_level = if verbose { LogLevel::Debug } else { LogLevel::Info };
    Arc::from(JsonLogger::stderr().with_min_level(min_level).for_request(ctx))
}

/// Cancel the request context on Ctrl-C so in-flight phases stop at the
/// next checkpoint instead of being killed mid-write.
pub(crate) fn cancel_on_ctrl_c(ctx: &RequestContext) {
    let ctx = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctx.cancel();
        }
    });
}
