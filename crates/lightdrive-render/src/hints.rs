//! Antialiasing modes and the render hints they map to

/// Antialiasing bitmask accepted by `enable_antialiasing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Antialiasing(u8);

impl Antialiasing {
    pub const NONE: Self = Self(0x0);
    pub const SHAPES: Self = Self(0x1);
    pub const TEXT: Self = Self(0x2);
    pub const BOTH: Self = Self(0x3);

    /// Unknown bits are dropped
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::BOTH.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parse `none`, `shapes`, `text` or `both` (case-insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::NONE),
            "shapes" => Some(Self::SHAPES),
            "text" => Some(Self::TEXT),
            "both" => Some(Self::BOTH),
            _ => None,
        }
    }
}

impl std::ops::BitOr for Antialiasing {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Renderer hint flags handed to the state layer with every canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderHints {
    pub shape_smoothing: bool,
    pub text_smoothing: bool,
}

impl RenderHints {
    /// Replace both smoothing hints from an antialiasing mode
    pub fn apply(&mut self, mode: Antialiasing) {
        self.shape_smoothing = mode.contains(Antialiasing::SHAPES);
        self.text_smoothing = mode.contains(Antialiasing::TEXT);
    }

    pub fn from_mode(mode: Antialiasing) -> Self {
        let mut hints = Self::default();
        hints.apply(mode);
        hints
    }
}
