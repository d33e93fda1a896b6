//! The immutable per-call record and its bounded function-name buffer.

/// Size of the function-name buffer, terminator included. Names longer than
/// `NAME_CAPACITY - 1` bytes are truncated; see [`FuncName`].
pub const NAME_CAPACITY: usize = 255;

const NAME_MAX: usize = NAME_CAPACITY - 1;

/// Fixed-size, inline function name.
///
/// Keeps the capture path allocation-free: a record is a flat value that can
/// be written into its preallocated slot without touching the heap. Input
/// longer than 254 bytes is truncated at a UTF-8 character boundary. The
/// truncation is silent and deterministic, not an error.
#[derive(Clone, Copy)]
pub struct FuncName {
    bytes: [u8; NAME_MAX],
    len: u8,
}

impl FuncName {
    pub fn new(name: &str) -> Self {
        let end = floor_char_boundary(name, NAME_MAX);
        let mut bytes = [0u8; NAME_MAX];
        bytes[..end].copy_from_slice(&name.as_bytes()[..end]);
        Self {
            bytes,
            len: end as u8,
        }
    }

    pub fn as_str(&self) -> &str {
        // Constructed only from &str prefixes cut at character boundaries,
        // so the stored bytes are always valid UTF-8.
        std::str::from_utf8(&self.bytes[..usize::from(self.len)]).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for FuncName {
    fn default() -> Self {
        Self {
            bytes: [0u8; NAME_MAX],
            len: 0,
        }
    }
}

impl From<&str> for FuncName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl std::fmt::Display for FuncName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Debug for FuncName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl PartialEq for FuncName {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for FuncName {}

/// Largest index <= `max` that lies on a character boundary of `s`.
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    let mut i = max;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// One captured function invocation.
///
/// Created exactly once, at instrumentation-exit time, and stored by value at
/// its assigned slot. Never mutated afterwards; the record store is the sole
/// owner of every record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallRecord {
    pub pid: u64,
    pub tid: u64,
    /// Logical processor id at function entry.
    pub core_start: u64,
    /// Logical processor id at function exit.
    pub core_end: u64,
    /// Elapsed cycle count between entry and exit.
    pub cycles: u64,
    pub name: FuncName,
}

impl CallRecord {
    /// True when the OS scheduler migrated the thread mid-call.
    pub fn core_switched(&self) -> bool {
        self.core_start != self.core_end
    }
}
