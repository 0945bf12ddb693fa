//! A fake TS6 hub the real uplink can connect to.

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_util::codec::{Framed, LinesCodec};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

pub struct FakeHub {
    listener: TcpListener,
    pub addr: SocketAddr,
}

impl FakeHub {
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        Ok(Self { listener, addr })
    }

    pub async fn accept(&self) -> anyhow::Result<HubConn> {
        let (stream, _) = timeout(RECV_TIMEOUT, self.listener.accept()).await??;
        Ok(HubConn {
            framed: Framed::new(stream, LinesCodec::new()),
        })
    }
}

/// The hub's side of one services link.
pub struct HubConn {
    framed: Framed<TcpStream, LinesCodec>,
}

impl HubConn {
    pub async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        self.framed.send(line).await?;
        Ok(())
    }

    pub async fn recv(&mut self) -> anyhow::Result<String> {
        match timeout(RECV_TIMEOUT, self.framed.next()).await? {
            Some(line) => Ok(line?),
            None => anyhow::bail!("services closed the link"),
        }
    }

    /// Read lines until one matches, returning everything read.
    pub async fn recv_until(
        &mut self,
        pred: impl Fn(&str) -> bool,
    ) -> anyhow::Result<Vec<String>> {
        let mut seen = Vec::new();
        loop {
            let line = self.recv().await?;
            let done = pred(&line);
            seen.push(line);
            if done {
                return Ok(seen);
            }
        }
    }
}
