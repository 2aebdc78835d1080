use data_encoding::HEXLOWER;
use ring::digest::{Context, SHA256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::Result;

const READ_BUFFER_SIZE: usize = 8192;

/// Compute the content fingerprint of a file: a streaming SHA-256 over its
/// bytes, rendered as lowercase hex. Identical content always produces the
/// same fingerprint.
pub fn hash_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut file = File::open(path)?;
    let mut context = Context::new(&SHA256);
    let mut buffer = [0u8; READ_BUFFER_SIZE];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        context.update(&buffer[..read]);
    }

    Ok(HEXLOWER.encode(context.finish().as_ref()))
}
