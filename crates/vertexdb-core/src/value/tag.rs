///
/// ValueTag
///
/// Stable value-variant tag used by diagnostics and group-key hashing.
///

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValueTag {
    Bool = 1,
    Float64 = 2,
    Int = 3,
    Null = 4,
    Text = 5,
}

impl ValueTag {
    /// Stable hash byte tag for this variant.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Stable human-readable value kind label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Float64 => "Float64",
            Self::Int => "Int",
            Self::Null => "Null",
            Self::Text => "Text",
        }
    }
}
