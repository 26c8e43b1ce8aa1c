//! A single-byte readiness pipe used to synchronize the parent with the
//! container init process across the clone boundary (spec.md §4.5, §5).
//!
//! The only thing the parent needs to know before it can record `running`
//! is whether the child's setup succeeded. A length-prefixed message would
//! work too, but richer diagnostics are cheaper to just write to stderr
//! directly from the child, so one byte is enough.

use std::os::unix::io::RawFd;

use nix::fcntl::OFlag;
use nix::unistd::{close, pipe2, read, write};

pub const READY: u8 = b'1';
pub const FAILED: u8 = b'0';

#[derive(Debug, thiserror::Error)]
pub enum PipeError {
    #[error("failed to create pipe")]
    Create(#[source] nix::Error),
    #[error("failed to read readiness byte")]
    Read(#[source] nix::Error),
    #[error("failed to write readiness byte")]
    Write(#[source] nix::Error),
}

pub struct ReadyPipe {
    pub read_end: RawFd,
    pub write_end: RawFd,
}

impl ReadyPipe {
    pub fn new() -> Result<Self, PipeError> {
        let (read_end, write_end) = pipe2(OFlag::empty()).map_err(PipeError::Create)?;
        Ok(Self {
            read_end,
            write_end,
        })
    }

    pub fn close_read(&self) {
        let _ = close(self.read_end);
    }

    pub fn close_write(&self) {
        let _ = close(self.write_end);
    }

    /// Called in the child: send the single status byte and close our end.
    pub fn send(&self, byte: u8) -> Result<(), PipeError> {
        write(self.write_end, &[byte]).map_err(PipeError::Write)?;
        Ok(())
    }

    /// Called in the parent: block for the one status byte. Any error, or a
    /// read that returns zero bytes (child exited without writing), is
    /// treated as a startup failure per spec.md §4.5 step 4b.
    pub fn recv(&self) -> Result<u8, PipeError> {
        let mut buf = [0u8; 1];
        let n = read(self.read_end, &mut buf).map_err(PipeError::Read)?;
        if n == 0 {
            return Err(PipeError::Read(nix::Error::UnknownErrno));
        }
        Ok(buf[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_ready_byte() {
        let pipe = ReadyPipe::new().unwrap();
        pipe.send(READY).unwrap();
        assert_eq!(pipe.recv().unwrap(), READY);
    }
}
