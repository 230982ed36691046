//! The nine POSIX permission bits

/// Permission bits `rwxrwxrwx`.
///
/// setuid, setgid and sticky are masked off on construction; the daemon
/// neither reads nor writes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mode(u32);

impl Mode {
    pub const MASK: u32 = 0o777;

    /// Keep only the low nine bits of a raw `st_mode`.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits & Self::MASK)
    }

    /// Parse base-8 digits. Leading zeros are accepted; the value must not
    /// exceed `0o777`.
    pub fn parse_octal(text: &str) -> Option<Self> {
        if text.is_empty() || !text.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return None;
        }
        let significant = text.trim_start_matches('0');
        if significant.len() > 3 {
            return None;
        }
        let value = u32::from_str_radix(text, 8).ok()?;
        (value <= Self::MASK).then_some(Self(value))
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    /// A zero mode never overrides an inherited one and never triggers a chmod.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}
