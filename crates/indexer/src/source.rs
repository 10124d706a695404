//! Stub unit supply.
//!
//! How stub text reaches the indexer stays external to this crate: editor
//! hosts walk bundled stub directories, language servers push buffers, and
//! tests hand units over directly. The [`UnitSource`] trait keeps the build
//! pipeline agnostic to the mechanism.

use crate::config::BuildConfig;

/// One stub source unit: a name used for diagnostics and merge ordering,
/// and the raw declaration text.
#[derive(Debug, Clone)]
pub struct StubUnit {
    pub name: String,
    pub text: String,
}

impl StubUnit {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.text.len() as u64
    }
}

pub trait UnitSource {
    type Error: std::fmt::Display + Send + Sync + 'static;

    fn units(&self, config: &BuildConfig) -> Result<Vec<StubUnit>, Self::Error>;
}

/// In-memory source used by embedders that already hold the stub text.
pub struct MemoryUnitSource {
    pub units: Vec<StubUnit>,
}

impl MemoryUnitSource {
    pub fn new(units: Vec<StubUnit>) -> Self {
        Self { units }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            units: pairs
                .iter()
                .map(|(name, text)| StubUnit::new(*name, *text))
                .collect(),
        }
    }
}

impl UnitSource for MemoryUnitSource {
    type Error = &'static str;

    fn units(&self, _config: &BuildConfig) -> Result<Vec<StubUnit>, Self::Error> {
        Ok(self.units.clone())
    }
}
