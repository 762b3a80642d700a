//! Binary container format for serialized IR programs.
//!
//! Container layout (12-byte header + one length-prefixed section):
//!
//! ```text
//! [4B magic "FPIR"] [4B schema version u32 LE] [4B payload length u32 LE]
//! [payload: bincode bytes]
//! ```

use crate::ir::Program;

/// Magic bytes identifying a binary IR file.
const MAGIC: &[u8; 4] = b"FPIR";

/// Current schema version.
const SCHEMA_VERSION: u32 = 1;

/// Header size in bytes: magic (4) + version (4) + payload length (4).
const HEADER_SIZE: usize = 12;

/// Errors that can occur during binary serialization/deserialization.
#[derive(Debug, thiserror::Error)]
pub enum BinaryError {
    #[error("invalid magic number: expected FPIR")]
    InvalidMagic,
    #[error("unsupported schema version {0} (expected {SCHEMA_VERSION})")]
    UnsupportedVersion(u32),
    #[error("truncated file: expected at least {expected} bytes, got {got}")]
    Truncated { expected: usize, got: usize },
    #[error("bincode encode error: {0}")]
    Encode(String),
    #[error("bincode decode error: {0}")]
    Decode(String),
}

/// Serialize a program into the binary container format.
pub fn serialize_program(program: &Program) -> Result<Vec<u8>, BinaryError> {
    let config = bincode::config::standard();
    let payload = bincode::serde::encode_to_vec(program, config)
        .map_err(|e| BinaryError::Encode(e.to_string()))?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&SCHEMA_VERSION.to_le_bytes());
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Deserialize a binary container back into a program.
pub fn deserialize_program(data: &[u8]) -> Result<Program, BinaryError> {
    validate_header(data)?;

    let payload_len = read_u32(data, 8) as usize;
    let end = HEADER_SIZE + payload_len;
    if data.len() < end {
        return Err(BinaryError::Truncated { expected: end, got: data.len() });
    }

    let config = bincode::config::standard();
    let (program, _bytes_read): (Program, usize) =
        bincode::serde::decode_from_slice(&data[HEADER_SIZE..end], config)
            .map_err(|e| BinaryError::Decode(e.to_string()))?;
    Ok(program)
}

/// Check whether a byte slice starts with the binary IR magic number.
pub fn is_binary_format(data: &[u8]) -> bool {
    data.len() >= 4 && &data[..4] == MAGIC
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&data[at..at + 4]);
    u32::from_le_bytes(word)
}

fn validate_header(data: &[u8]) -> Result<(), BinaryError> {
    if data.len() < HEADER_SIZE {
        return Err(BinaryError::Truncated { expected: HEADER_SIZE, got: data.len() });
    }
    if &data[..4] != MAGIC {
        return Err(BinaryError::InvalidMagic);
    }
    let version = read_u32(data, 4);
    if version != SCHEMA_VERSION {
        return Err(BinaryError::UnsupportedVersion(version));
    }
    Ok(())
}
