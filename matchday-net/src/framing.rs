//! NUL-terminated framing for STOMP over TCP.
//!
//! Wire format: frame bytes followed by a single `\0` sentinel. The sentinel
//! is out-of-band; it is never part of the frame body.

use std::io::{self, BufRead, Write};

/// End-of-frame sentinel byte.
pub const FRAME_TERMINATOR: u8 = 0;

/// Write one frame followed by the terminator byte.
pub fn write_frame<W: Write>(writer: &mut W, frame: &[u8]) -> io::Result<()> {
    writer.write_all(frame)?;
    writer.write_all(&[FRAME_TERMINATOR])?;
    writer.flush()?;

    Ok(())
}

/// Read bytes up to (not including) the next terminator.
///
/// Returns `Ok(None)` when the stream closes cleanly between frames.
pub fn read_frame<R: BufRead>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    let n = reader.read_until(FRAME_TERMINATOR, &mut buf)?;
    if n == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&FRAME_TERMINATOR) {
        buf.pop();
    } else {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed mid-frame",
        ));
    }

    Ok(Some(buf))
}
