/// One decoded instruction as shown in the view. Never mutated after decode.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Instruction {
    pub address: u64,
    pub raw_hex: String,  // e.g. "00000013", most significant byte first
    pub mnemonic: String, // e.g. "addi"
    pub operands: String, // e.g. "sp, sp, -16"
}

impl Instruction {
    pub fn new(address: u64, raw_hex: String, mnemonic: String, operands: String) -> Self {
        Self {
            address,
            raw_hex,
            mnemonic,
            operands,
        }
    }

    /// Byte-dump record for encodings the backend could not resolve.
    pub fn unknown(address: u64, raw_hex: String) -> Self {
        let mnemonic = format!("unknown.bytes {}", raw_hex);
        Self::new(address, raw_hex, mnemonic, String::new())
    }
}

/// Hex of `bytes` in reverse order, so little-endian encodings read naturally.
pub fn reversed_hex(bytes: &[u8]) -> String {
    bytes.iter().rev().map(|b| format!("{:02x}", b)).collect()
}
