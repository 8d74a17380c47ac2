/// Errors produced while encoding, decoding, or interpreting DUML frames.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The buffer is shorter than the frame it claims to contain.
    #[error("frame truncated: need {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },

    /// The first byte is not the DUML magic 0x55.
    #[error("invalid magic byte 0x{found:02X}")]
    InvalidMagic { found: u8 },

    /// The declared total length is smaller than the fixed frame overhead.
    #[error("invalid total length {length}, minimum is 13")]
    InvalidLength { length: usize },

    /// The version bits in the header do not match the supported version.
    #[error("unsupported protocol version 0x{found:02X}, expected 0x01")]
    UnsupportedVersion { found: u8 },

    /// The CRC8 over the first three header bytes does not match.
    #[error("header CRC mismatch: received 0x{found:02X}, expected 0x{expected:02X}")]
    HeaderCrcMismatch { found: u8, expected: u8 },

    /// The trailing CRC16 over the whole frame does not match.
    #[error("frame CRC mismatch: received 0x{found:04X}, expected 0x{expected:04X}")]
    BodyCrcMismatch { found: u16, expected: u16 },

    /// A typed payload is shorter than its fixed minimum.
    #[error("payload too short: need {needed} bytes, got {got}")]
    PayloadTooShort { needed: usize, got: usize },

    /// A length-prefixed string extends past the end of the payload.
    #[error("length-prefixed string out of bounds: need {needed} bytes, got {got}")]
    StringOutOfBounds { needed: usize, got: usize },

    /// The WiFi wrapper signature bytes are wrong.
    #[error("invalid wrapper signature 0x{found:04X}")]
    InvalidWrapperSignature { found: u16 },

    /// A WiFi wrapper packet is shorter than its fixed header.
    #[error("wrapper packet too short: need {needed} bytes, got {got}")]
    WrapperTooShort { needed: usize, got: usize },

    /// A status report's capability area is not a whole number of blocks.
    #[error("invalid stream capability area length {length}, must be a multiple of 11")]
    InvalidStatusReport { length: usize },
}

pub type Result<T> = std::result::Result<T, WireError>;
