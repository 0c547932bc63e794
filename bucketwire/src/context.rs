use bucketwire_core::{Context, OsEnv, Result};
use bucketwire_file_tokio::TokioFileSystem;
use bucketwire_http_send_reqwest::ReqwestHttpSend;
use bucketwire_s3::{Client, Config};
use log::debug;

/// A context backed by reqwest, tokio file access and the process environment.
pub fn default_context() -> Context {
    Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_file_open(TokioFileSystem)
        .with_env(OsEnv)
}

/// Build a client on the default context.
///
/// Missing config fields are filled from the environment first. The
/// transport honours the resolved timeout and TLS verification setting.
pub fn default_client(config: Config) -> Result<Client> {
    let ctx = Context::new().with_env(OsEnv);
    let config = config.from_env(&ctx);
    let (endpoint, _) = config.clone().build()?;
    debug!(
        "building default transport for {} with timeout {:?}",
        endpoint.endpoint(),
        endpoint.timeout()
    );

    let http = ReqwestHttpSend::with_options(endpoint.timeout(), endpoint.verify_tls())?;
    let ctx = ctx.with_http_send(http).with_file_open(TokioFileSystem);
    Client::new(ctx, config)
}
