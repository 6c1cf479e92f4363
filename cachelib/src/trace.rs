use crate::cache::AccessType;
use crate::error::TraceError;
use crate::hex::{HEX_DIGITS, NOT_HEX};

/// Longest address accepted, in hex digits
const MAX_ADDRESS_DIGITS: usize = 16;

/// One reference from a trace
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TraceRecord {
    pub kind: AccessType,
    pub address: u64,
}

impl AccessType {
    /// Maps a dinero trace label to an access type: `0` data load, `1` data store,
    /// `2` instruction load
    pub fn from_label(label: &[u8]) -> Option<Self> {
        match label {
            b"0" => Some(AccessType::DataLoad),
            b"1" => Some(AccessType::DataStore),
            b"2" => Some(AccessType::InstructionLoad),
            _ => None,
        }
    }
}

/// Reads `<label> <hex address>` records from a trace held in memory
///
/// Blank lines are skipped and anything after the address is ignored, so traces with an extra
/// value column can be replayed unchanged. Both `\n` and `\r\n` line endings are accepted
///
/// # Examples
///
/// ```
/// use cachelib::cache::AccessType;
/// use cachelib::trace::TraceReader;
/// let records = TraceReader::new(b"2 400\n1 0x7ffc\n")
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
/// assert_eq!(records[0].kind, AccessType::InstructionLoad);
/// assert_eq!(records[1].address, 0x7ffc);
/// ```
pub struct TraceReader<'a> {
    bytes: &'a [u8],
    position: usize,
    line: usize,
}

impl<'a> TraceReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0, line: 0 }
    }
}

impl<'a> Iterator for TraceReader<'a> {
    type Item = Result<TraceRecord, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.position < self.bytes.len() {
            let rest = &self.bytes[self.position..];
            let end = rest.iter().position(|b| *b == b'\n').unwrap_or(rest.len());
            let text = &rest[..end];
            self.position += end + 1;
            self.line += 1;
            let mut fields = text.split(|b| b.is_ascii_whitespace()).filter(|field| !field.is_empty());
            let Some(label) = fields.next() else {
                continue;
            };
            return Some(parse_record(label, fields.next(), self.line));
        }
        None
    }
}

fn parse_record(label: &[u8], address: Option<&[u8]>, line: usize) -> Result<TraceRecord, TraceError> {
    let kind = AccessType::from_label(label).ok_or_else(|| TraceError::BadLabel {
        line,
        label: String::from_utf8_lossy(label).into_owned(),
    })?;
    let address = address.ok_or(TraceError::MissingField { line, field: "address" })?;
    let address = parse_address(address).ok_or_else(|| TraceError::BadAddress {
        line,
        address: String::from_utf8_lossy(address).into_owned(),
    })?;
    Ok(TraceRecord { kind, address })
}

/// Parses a hexadecimal address of at most 16 digits, with or without a `0x` prefix
///
/// Digits are decoded with a lookup table generated by the build script, which also marks every
/// byte that is not a hex digit so validation costs nothing extra
///
/// # Examples
///
/// ```
/// use cachelib::trace::parse_address;
/// assert_eq!(parse_address(b"1F40"), Some(0x1f40));
/// assert_eq!(parse_address(b"0x10"), Some(16));
/// assert_eq!(parse_address(b"12g4"), None);
/// ```
pub fn parse_address(digits: &[u8]) -> Option<u64> {
    let digits = digits
        .strip_prefix(b"0x")
        .or_else(|| digits.strip_prefix(b"0X"))
        .unwrap_or(digits);
    if digits.is_empty() || digits.len() > MAX_ADDRESS_DIGITS {
        return None;
    }
    let mut res: u64 = 0;
    for digit in digits {
        let value = HEX_DIGITS[*digit as usize];
        if value == NOT_HEX {
            return None;
        }
        res = (res << 4) | value as u64;
    }
    Some(res)
}
