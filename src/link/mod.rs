//! Uplink connection.
//!
//! One TCP link to a TS6 hub. Inbound lines are decoded into engine events
//! and handled in arrival order; effects from the enforcement task arrive
//! over a channel and share the same writer.

pub mod ts6;

pub use ts6::{Decoded, Ts6Codec};

use crate::config::Config;
use crate::error::LinkError;
use crate::services::{NickGuard, ServiceEffect, spawn_enforcement_task};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, info};

/// Longest inbound line accepted before the link is dropped.
const MAX_LINE_LENGTH: usize = 8192;

/// Effects buffered between the enforcement task and the writer.
const EFFECT_QUEUE_SIZE: usize = 1024;

type Transport = Framed<TcpStream, LinesCodec>;

/// Connect, register and run the link until it drops.
///
/// The engine is started once registration is sent and stopped again on
/// the way out, whatever the reason.
pub async fn run(config: &Config, guard: Arc<NickGuard>) -> Result<(), LinkError> {
    info!(address = %config.link.address, "Connecting to uplink");
    let stream = TcpStream::connect(&config.link.address).await?;
    let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));

    let mut codec = Ts6Codec::new(config, guard.service_uid());
    for line in codec.handshake(config, chrono::Utc::now().timestamp()) {
        framed.send(line).await?;
    }
    info!(server = %config.server.name, sid = %config.server.sid, "Registration sent");

    guard.start();
    let (effect_tx, mut effect_rx) = mpsc::channel(EFFECT_QUEUE_SIZE);
    let enforcement = spawn_enforcement_task(guard.clone(), effect_tx);

    let result = pump(&mut framed, &mut codec, &guard, &mut effect_rx).await;

    enforcement.abort();
    guard.stop();
    result
}

async fn pump(
    framed: &mut Transport,
    codec: &mut Ts6Codec,
    guard: &NickGuard,
    effects: &mut mpsc::Receiver<ServiceEffect>,
) -> Result<(), LinkError> {
    loop {
        tokio::select! {
            line = framed.next() => {
                let line = match line {
                    Some(line) => line?,
                    None => return Err(LinkError::Closed),
                };
                let decoded = codec.decode(&line)?;
                if let Some(reply) = decoded.reply {
                    framed.send(reply).await?;
                }
                let Some(event) = decoded.event else {
                    continue;
                };
                match guard.handle_event(event).await {
                    Ok(out) => {
                        for effect in &out {
                            framed.send(codec.encode(effect)).await?;
                        }
                    }
                    Err(e) => debug!(error = %e, code = e.error_code(), "Event skipped"),
                }
            }
            Some(effect) = effects.recv() => {
                framed.send(codec.encode(&effect)).await?;
            }
        }
    }
}
