mod utils;
mod config;
mod scope;
mod intercept;
mod holdup_proxy;
mod siv_ui;

use hudsucker::ProxyBuilder;
use log::{error, info};
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc
};
use tokio::sync::{mpsc::channel, oneshot};
use cursive::Cursive;

use holdup_proxy::{HoldupHandler, engine::{HeldExchanges, ProxyEngine}};
use intercept::InterceptSession;
use utils::HoldupError;

#[tokio::main]
async fn main() -> Result<(), HoldupError> {
    let config = config::handle_user_input()?;
    let scope = Arc::new(scope::Scope::new(&config.include, &config.exclude)?);
    let ca = utils::make_ephemeral_authority()?;
    let socket_addr = SocketAddr::from((
        config
            .address
            .parse::<IpAddr>()?,
        config.port
    ));

    let (tx, rx) = channel(config.event_buffer);
    let held = HeldExchanges::default();
    let siv = Cursive::new();
    let cb_sink = siv.cb_sink().clone();

    let handler = HoldupHandler::new(tx, cb_sink.clone(), held.clone(), scope);
    let proxy = ProxyBuilder::new()
        .with_addr(socket_addr)
        .with_rustls_client()
        .with_ca(ca)
        .with_http_handler(handler)
        .build();

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        info!("Proxy is listening on {}", socket_addr);
        let shutdown = async { let _ = stop_rx.await; };
        if let Err(e) = proxy.start(shutdown).await {
            let err = HoldupError::from(e);
            error!("{}", &err);
            let _ = cb_sink.send(Box::new(move |s: &mut Cursive| {
                siv_ui::error_view::report_proxy_failure(s, err);
            }));
        }
    });

    let session = InterceptSession::new(ProxyEngine::new(held));
    tokio::task::block_in_place(|| siv_ui::bootstrap_ui(siv, &config, rx, session));

    let _ = stop_tx.send(());
    info!("Holdup stopped");
    Ok(())
}
