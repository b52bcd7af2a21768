use std::io::Cursor;

use strata_proto::Packet;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::SessionError;

/// Async counterpart of `strata_proto::codec`'s synchronous framing,
/// since the core's transport is a `tokio` socket. Frame layout is
/// identical: `var_int(length) var_int(id) payload`.
pub async fn read_packet_async<R: AsyncRead + Unpin>(r: &mut R) -> Result<Packet, SessionError> {
    let length = read_var_int_async(r).await? as usize;

    let mut frame = vec![0u8; length];
    r.read_exact(&mut frame).await.map_err(|_| SessionError::Eof)?;

    let mut cursor = Cursor::new(frame.as_slice());
    let id = strata_proto::io::read_var_int(&mut cursor)?;
    let data = frame[cursor.position() as usize..].to_vec();

    Ok(Packet::new(id, data))
}

pub async fn write_packet_async<W: AsyncWrite + Unpin>(w: &mut W, packet: &Packet) -> Result<(), SessionError> {
    let mut frame = Vec::new();
    strata_proto::io::write_var_int(&mut frame, packet.id)?;
    frame.extend_from_slice(&packet.data);

    let mut header = Vec::new();
    strata_proto::io::write_var_int(&mut header, frame.len() as i32)?;

    w.write_all(&header).await?;
    w.write_all(&frame).await?;

    Ok(())
}

async fn read_var_int_async<R: AsyncRead + Unpin>(r: &mut R) -> Result<i32, SessionError> {
    let mut value: i32 = 0;
    let mut shift = 0;

    loop {
        let byte = r.read_u8().await.map_err(|_| SessionError::Eof)?;
        value |= ((byte & 0x7F) as i32) << shift;

        if byte & 0x80 == 0 {
            break;
        }

        shift += 7;
        if shift >= 35 {
            return Err(SessionError::VarIntTooLong);
        }
    }

    Ok(value)
}
