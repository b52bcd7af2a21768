use std::sync::{Arc, Mutex};

use flume::Receiver;
use strata_proto::Packet;
use strata_world::{ChunkProvider, EntityId, World};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tracing::{debug, trace};

use crate::clientbound;
use crate::dispatch::{Dispatch, SessionContext};
use crate::error::SessionError;
use crate::framing::{read_packet_async, write_packet_async};

const READ_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Drives one connected client's receive and send halves until either
/// side ends the session; whichever task exits first wins.
pub async fn run<P: ChunkProvider + 'static>(
    stream: TcpStream,
    conn_id: i32,
    world: Arc<Mutex<World<P>>>,
    dispatch: Arc<Dispatch<P>>,
    entity_id: EntityId,
    outbound: Receiver<Packet>,
) {
    let (read_half, write_half) = stream.into_split();
    let ctx = SessionContext { world, entity_id };

    trace!(conn_id, entity_id, connected_at = strata_util::unix_millis(), "session starting");

    let mut join_set = JoinSet::new();

    join_set.spawn(receive_loop(conn_id, read_half, dispatch, ctx));
    join_set.spawn(send_loop(conn_id, write_half, outbound));

    join_set.join_next().await;
}

async fn receive_loop<P: ChunkProvider>(conn_id: i32, mut reader: OwnedReadHalf, dispatch: Arc<Dispatch<P>>, ctx: SessionContext<P>) {
    loop {
        let packet = match tokio::time::timeout(READ_TIMEOUT, read_packet_async(&mut reader)).await {
            Ok(Ok(packet)) => packet,
            Ok(Err(SessionError::Eof)) => {
                debug!(conn_id, "client closed the connection");
                return;
            }
            Ok(Err(err)) => {
                debug!(conn_id, %err, "read error, ending session");
                return;
            }
            Err(_) => {
                debug!(conn_id, "read timed out, ending session");
                return;
            }
        };

        trace!(conn_id, id = packet.id, "received packet");

        if let Err(err) = dispatch.dispatch(&packet, &ctx) {
            debug!(conn_id, %err, "handler error, ending session");
            return;
        }
    }
}

async fn send_loop(conn_id: i32, mut writer: OwnedWriteHalf, outbound: Receiver<Packet>) {
    loop {
        let packet = match outbound.recv_async().await {
            Ok(packet) => packet,
            Err(_) => {
                debug!(conn_id, "outbound queue closed, ending session");
                return;
            }
        };

        let is_disconnect = packet.id == clientbound::DISCONNECT;

        if let Err(err) = write_packet_async(&mut writer, &packet).await {
            debug!(conn_id, %err, "write error, ending session");
            return;
        }

        if is_disconnect {
            debug!(conn_id, "sent disconnect, ending session");
            return;
        }
    }
}
