//! Variable descriptors consumed by [`crate::Cache::chunk_from_variable`].

/// Address metadata for a named device variable.
pub trait VariableDescriptor {
    /// Start offset of the variable in addressable units.
    fn address(&self) -> u64;
    /// Width of the variable's type in addressable units.
    fn byte_width(&self) -> usize;
}

/// Plain variable record, typically produced by a symbol-table parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Variable {
    /// Symbol name.
    pub name: String,
    /// Start offset in addressable units.
    pub address: u64,
    /// Type width in addressable units.
    pub byte_width: usize,
}

impl Variable {
    /// Creates a variable record.
    #[must_use]
    pub fn new(name: impl Into<String>, address: u64, byte_width: usize) -> Self {
        Self {
            name: name.into(),
            address,
            byte_width,
        }
    }
}

impl VariableDescriptor for Variable {
    fn address(&self) -> u64 {
        self.address
    }

    fn byte_width(&self) -> usize {
        self.byte_width
    }
}

impl<T: VariableDescriptor + ?Sized> VariableDescriptor for &T {
    fn address(&self) -> u64 {
        (**self).address()
    }

    fn byte_width(&self) -> usize {
        (**self).byte_width()
    }
}
