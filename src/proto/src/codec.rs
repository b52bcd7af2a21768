use std::io::{Read, Write};

use crate::io::{self, Error};
use crate::packet::Packet;

/// Reads one length-prefixed frame and splits it into packet id and payload.
///
/// Frame layout: `var_int(length) var_int(id) payload`, where `length`
/// counts the id and payload together.
pub fn read_packet(r: &mut impl Read) -> Result<Packet, Error> {
    let length = io::read_var_int(r)? as usize;
    let mut frame = vec![0u8; length];
    r.read_exact(&mut frame).map_err(|_| Error::Eof)?;

    let mut cursor = std::io::Cursor::new(frame.as_slice());
    let id = io::read_var_int(&mut cursor)?;
    let data = frame[cursor.position() as usize..].to_vec();

    Ok(Packet::new(id, data))
}

/// Writes one length-prefixed frame, the `WritePacket` half of the
/// contract.
pub fn write_packet(w: &mut impl Write, packet: &Packet) -> Result<(), Error> {
    let mut frame = Vec::new();
    io::write_var_int(&mut frame, packet.id)?;
    frame.extend_from_slice(&packet.data);

    io::write_var_int(w, frame.len() as i32)?;
    w.write_all(&frame)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Build;

    #[test]
    fn packet_round_trip() {
        let packet = Build::new().var_int(42).string("ping").into_packet(5);

        let mut buf = Vec::new();
        write_packet(&mut buf, &packet).unwrap();

        let mut cursor = std::io::Cursor::new(buf.as_slice());
        let decoded = read_packet(&mut cursor).unwrap();

        assert_eq!(decoded.id, 5);
        assert_eq!(decoded.data, packet.data);
    }

    #[test]
    fn truncated_frame_is_eof() {
        let mut buf = Vec::new();
        io::write_var_int(&mut buf, 10).unwrap();
        buf.extend_from_slice(&[1, 2, 3]);

        let mut cursor = std::io::Cursor::new(buf.as_slice());
        assert!(matches!(read_packet(&mut cursor), Err(Error::Eof)));
    }
}
