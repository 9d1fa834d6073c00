//! Record type and payload codec.
//!
//! Each serialized payload consists of:
//! - Code length (4 bytes): Length of the code string
//! - Code (variable): UTF-8 bytes of the code
//! - Cycle (4 bytes): Signed cycle number
//! - Fee (8 bytes): Monthly fee as an IEEE-754 double
//! - Note length (4 bytes): Length of the note string
//! - Note (variable): UTF-8 bytes of the note
//!
//! All integers and the float are little-endian. The total payload length
//! is recorded in the index file, so no terminator or escaping is needed:
//! string boundaries are fully determined by the length prefixes.

use crate::error::{Error, Result};
use bytes::{Buf, BufMut, BytesMut};

/// Fixed overhead of a payload: two length prefixes, the cycle and the fee.
pub const FIXED_OVERHEAD: usize = 4 + 4 + 8 + 4;

/// An enrollment record.
///
/// Records are variable-length: `code` and `note` may be empty or
/// arbitrarily long. The store enforces no uniqueness on `code`;
/// duplicates are permitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Matricula {
    /// Enrollment code.
    pub code: String,
    /// Academic cycle.
    pub cycle: i32,
    /// Monthly fee.
    pub fee: f64,
    /// Free-text note.
    pub note: String,
}

impl Matricula {
    /// Create a new record.
    pub fn new(code: impl Into<String>, cycle: i32, fee: f64, note: impl Into<String>) -> Self {
        Self { code: code.into(), cycle, fee, note: note.into() }
    }

    /// Encode the record into a payload
    ///
    /// Format: `[code_len: i32][code][cycle: i32][fee: f64][note_len: i32][note]`
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(self.encoded_size());

        buf.put_i32_le(self.code.len() as i32);
        buf.put_slice(self.code.as_bytes());

        buf.put_i32_le(self.cycle);
        buf.put_f64_le(self.fee);

        buf.put_i32_le(self.note.len() as i32);
        buf.put_slice(self.note.as_bytes());

        buf.to_vec()
    }

    /// Decode a record from a complete payload slice.
    ///
    /// The slice must span exactly one payload; its length comes from the
    /// `size` field of the corresponding index entry.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        let code = read_string(&mut data, "code")?;

        if data.remaining() < 4 + 8 {
            return Err(Error::corruption(format!(
                "Payload truncated: {} bytes left for cycle and fee",
                data.remaining()
            )));
        }
        let cycle = data.get_i32_le();
        let fee = data.get_f64_le();

        let note = read_string(&mut data, "note")?;

        if data.has_remaining() {
            return Err(Error::corruption(format!(
                "Payload has {} trailing bytes past the note",
                data.remaining()
            )));
        }

        Ok(Matricula { code, cycle, fee, note })
    }

    /// Get the total size of the encoded payload
    pub fn encoded_size(&self) -> usize {
        FIXED_OVERHEAD + self.code.len() + self.note.len()
    }
}

/// Read one `[i32 len][len bytes]` string field from the front of `data`.
fn read_string(data: &mut &[u8], field: &str) -> Result<String> {
    if data.remaining() < 4 {
        return Err(Error::corruption(format!(
            "Payload truncated: no length prefix for {}",
            field
        )));
    }
    let len = data.get_i32_le();
    if len < 0 {
        return Err(Error::corruption(format!("Negative length {} for {}", len, field)));
    }
    let len = len as usize;
    if data.remaining() < len {
        return Err(Error::corruption(format!(
            "Payload truncated: {} declares {} bytes, {} remain",
            field,
            len,
            data.remaining()
        )));
    }
    let bytes = data[..len].to_vec();
    data.advance(len);
    String::from_utf8(bytes)
        .map_err(|e| Error::corruption(format!("Invalid UTF-8 in {}: {}", field, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let record = Matricula::new("C001", 1, 1000.50, "first enrollment");
        let encoded = record.encode();
        assert_eq!(encoded.len(), record.encoded_size());

        let decoded = Matricula::decode(&encoded).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_empty_strings() {
        let record = Matricula::new("", 0, 0.0, "");
        let encoded = record.encode();
        assert_eq!(encoded.len(), FIXED_OVERHEAD);

        let decoded = Matricula::decode(&encoded).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_boundary_numeric_values() {
        let record = Matricula::new("X", i32::MIN, -0.0, "y");
        let decoded = Matricula::decode(&record.encode()).unwrap();
        assert_eq!(decoded.cycle, i32::MIN);
        assert_eq!(decoded.fee.to_bits(), (-0.0f64).to_bits());

        let record = Matricula::new("X", i32::MAX, f64::INFINITY, "y");
        let decoded = Matricula::decode(&record.encode()).unwrap();
        assert_eq!(decoded.cycle, i32::MAX);
        assert_eq!(decoded.fee, f64::INFINITY);
    }

    #[test]
    fn test_nan_fee_preserved_bit_for_bit() {
        let record = Matricula::new("C001", 1, f64::NAN, "nan fee");
        let decoded = Matricula::decode(&record.encode()).unwrap();
        assert_eq!(decoded.fee.to_bits(), record.fee.to_bits());
    }

    #[test]
    fn test_unicode_strings() {
        let record = Matricula::new("MATRÍCULA-É", -3, 1234.56, "año académico 2025 🎓");
        let decoded = Matricula::decode(&record.encode()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_decode_truncated_payload() {
        let record = Matricula::new("C001", 1, 1000.50, "note");
        let encoded = record.encode();

        for cut in [0, 3, 4, 6, encoded.len() - 1] {
            let result = Matricula::decode(&encoded[..cut]);
            assert!(matches!(result, Err(Error::Corruption(_))), "cut at {}", cut);
        }
    }

    #[test]
    fn test_decode_trailing_bytes() {
        let mut encoded = Matricula::new("C001", 1, 1000.50, "note").encode();
        encoded.push(0xFF);
        assert!(matches!(Matricula::decode(&encoded), Err(Error::Corruption(_))));
    }

    #[test]
    fn test_decode_negative_length_prefix() {
        let mut encoded = Matricula::new("C001", 1, 1000.50, "note").encode();
        encoded[0..4].copy_from_slice(&(-1i32).to_le_bytes());
        assert!(matches!(Matricula::decode(&encoded), Err(Error::Corruption(_))));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        // [len=1]["\xFF"][cycle][fee][len=0]
        let mut buf = Vec::new();
        buf.extend_from_slice(&1i32.to_le_bytes());
        buf.push(0xFF);
        buf.extend_from_slice(&0i32.to_le_bytes());
        buf.extend_from_slice(&0f64.to_le_bytes());
        buf.extend_from_slice(&0i32.to_le_bytes());

        assert!(matches!(Matricula::decode(&buf), Err(Error::Corruption(_))));
    }

    proptest! {
        #[test]
        fn prop_round_trip(code in ".{0,64}", cycle in any::<i32>(),
                           fee in any::<f64>(), note in ".{0,256}") {
            let record = Matricula::new(code, cycle, fee, note);
            let encoded = record.encode();
            prop_assert_eq!(encoded.len(), record.encoded_size());

            let decoded = Matricula::decode(&encoded).unwrap();
            prop_assert_eq!(decoded.code, record.code);
            prop_assert_eq!(decoded.cycle, record.cycle);
            prop_assert_eq!(decoded.fee.to_bits(), record.fee.to_bits());
            prop_assert_eq!(decoded.note, record.note);
        }
    }
}
