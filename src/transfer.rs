//! Raw file streaming with no framing.
//!
//! The sender writes file bytes and stops; the receiver reads until the
//! stream reports end of data. Whoever drives the connection must close (or
//! half-close) the sending side afterwards, since that is the only end marker.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

use crate::error::TransferError;
use crate::protocol::CHUNK_SIZE;

/// Copy `src` into `dst` in `CHUNK_SIZE` pieces until `src` returns 0.
pub fn copy_until_close<R: Read + ?Sized, W: Write + ?Sized>(
    src: &mut R,
    dst: &mut W,
) -> io::Result<u64> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = match src.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        dst.write_all(&buf[..n])?;
        total += n as u64;
    }
    Ok(total)
}

/// Stream the file at `path` to `conn`. Nothing is written if the open fails.
pub fn send_file<W: Write + ?Sized>(conn: &mut W, path: &Path) -> Result<u64, TransferError> {
    let mut file = File::open(path).map_err(|source| TransferError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let sent = copy_until_close(&mut file, conn)?;
    conn.flush()?;
    Ok(sent)
}

/// Write `prefix` and then everything left on `conn` into `path` (truncating).
///
/// A failure part-way leaves whatever was already written on disk.
pub fn receive_file<R: Read + ?Sized>(
    conn: &mut R,
    prefix: &[u8],
    path: &Path,
) -> Result<u64, TransferError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|source| TransferError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
    file.write_all(prefix)?;
    let rest = copy_until_close(conn, &mut file)?;
    file.flush()?;
    Ok(prefix.len() as u64 + rest)
}
