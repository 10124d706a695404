//! Line-oriented parser for Ruby stub declaration units.
//!
//! A unit is one stub source text (class/module/constant/method declarations
//! with documentation comments and empty bodies). Parsing turns it into an
//! ordered stream of [`events::Declaration`] values; nothing here resolves
//! names across units, that is the indexer's job.

pub mod error;
pub mod events;
pub mod line;
pub mod params;
pub mod unit;

pub use error::{ParseError, Result};
pub use events::{
    ConstantValue, Declaration, NamespaceKind, Param, ParamKind, ParamList, ReceiverKind,
    Visibility,
};
pub use unit::{FailedUnit, ParseOutcome, ParsedUnit, UnitParser, UnitStats};
