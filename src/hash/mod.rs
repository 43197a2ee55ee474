//! Content digests for hash-based comparison

use crate::types::SyncError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Compute the Blake3 digest of a file.
///
/// The file is streamed in 64KB chunks for memory efficiency.
pub fn compute_hash(file_path: &Path) -> Result<[u8; 32], SyncError> {
    let mut file = File::open(file_path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; 64 * 1024];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        hasher.update(&buffer[0..bytes_read]);
    }

    Ok(*hasher.finalize().as_bytes())
}
