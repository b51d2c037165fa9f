//! The SHA-256d (double SHA-256) hash, used for identities throughout the
//! chain format.

use std::io;

use sha2::{Digest, Sha256};

/// A write-through adapter that accumulates data into a SHA-256d hash.
#[derive(Default)]
pub struct Writer {
    hash: Sha256,
}

impl Writer {
    /// Consume the writer and produce the hash.
    pub fn finish(self) -> [u8; 32] {
        let result1 = self.hash.finalize();
        let result2 = Sha256::digest(&result1);
        let mut buffer = [0u8; 32];
        buffer[0..32].copy_from_slice(&result2[0..32]);
        buffer
    }
}

impl io::Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.hash.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Hash a byte slice with SHA-256d in one call.
pub fn digest(data: &[u8]) -> [u8; 32] {
    use io::Write;

    let mut writer = Writer::default();
    writer
        .write_all(data)
        .expect("sha256d::Writer is infallible");
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256d_of_empty_input() {
        // sha256(sha256("")), a fixed vector.
        let expected =
            hex::decode("5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456")
                .unwrap();
        assert_eq!(digest(b"")[..], expected[..]);
    }

    #[test]
    fn writer_matches_one_shot_digest() {
        use io::Write;

        let mut writer = Writer::default();
        writer.write_all(b"hello ").unwrap();
        writer.write_all(b"world").unwrap();
        assert_eq!(writer.finish(), digest(b"hello world"));
    }
}
