//! Declaration events produced by parsing one stub unit.
//!
//! Events preserve source order exactly; visibility markers and
//! `module_function` are events of their own because they are parse-time
//! modes that apply to later declarations only.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Kind of a namespace declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceKind {
    Module,
    Class,
}

impl NamespaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NamespaceKind::Module => "module",
            NamespaceKind::Class => "class",
        }
    }
}

/// Receiver a method is defined on.
///
/// The parser only ever emits `Instance` (`def name`) and `Singleton`
/// (`def self.name`); `ModuleFunction` is assigned by the builder when a
/// `module_function` marker is in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiverKind {
    Instance,
    Singleton,
    ModuleFunction,
}

impl ReceiverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiverKind::Instance => "instance",
            ReceiverKind::Singleton => "singleton",
            ReceiverKind::ModuleFunction => "module_function",
        }
    }
}

/// Member visibility; `Public` unless a `private` marker applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

/// Shape of a single method parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Required,
    Optional,
    Rest,
    Keyword,
    KeywordRest,
    Block,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::Required => "required",
            ParamKind::Optional => "optional",
            ParamKind::Rest => "rest",
            ParamKind::Keyword => "keyword",
            ParamKind::KeywordRest => "keyword_rest",
            ParamKind::Block => "block",
        }
    }
}

/// One parameter descriptor. Default values are kept as raw source text;
/// the stubs use placeholder defaults whose real values are unspecified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    pub default_text: Option<String>,
}

/// Parameter lists are short in practice; keep them inline.
pub type ParamList = SmallVec<[Param; 4]>;

/// Value of a declared constant. The stub corpus writes `NAME = _` for
/// values it does not know; that placeholder is preserved as [`Opaque`]
/// rather than guessed at.
///
/// [`Opaque`]: ConstantValue::Opaque
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstantValue {
    Opaque,
    Literal(String),
}

impl ConstantValue {
    pub fn is_opaque(&self) -> bool {
        matches!(self, ConstantValue::Opaque)
    }
}

/// A single declaration event. `line` is the 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Declaration {
    OpenNamespace {
        /// Declared name, possibly a compound path (`Date::Infinity`).
        name: String,
        kind: NamespaceKind,
        superclass: Option<String>,
        doc: Option<String>,
        line: u32,
    },
    CloseNamespace {
        line: u32,
    },
    DefineConstant {
        name: String,
        value: ConstantValue,
        doc: Option<String>,
        line: u32,
    },
    DefineMethod {
        name: String,
        receiver: ReceiverKind,
        params: ParamList,
        doc: Option<String>,
        line: u32,
    },
    DefineAlias {
        new_name: String,
        target: String,
        doc: Option<String>,
        line: u32,
    },
    SetVisibility {
        visibility: Visibility,
        line: u32,
    },
    IncludeModule {
        name: String,
        line: u32,
    },
    ExtendModule {
        name: String,
        line: u32,
    },
    DefineAttribute {
        names: Vec<String>,
        reader: bool,
        writer: bool,
        doc: Option<String>,
        line: u32,
    },
    SetModuleFunctionMode {
        line: u32,
    },
}

impl Declaration {
    /// Source line of the event.
    pub fn line(&self) -> u32 {
        match self {
            Declaration::OpenNamespace { line, .. }
            | Declaration::CloseNamespace { line }
            | Declaration::DefineConstant { line, .. }
            | Declaration::DefineMethod { line, .. }
            | Declaration::DefineAlias { line, .. }
            | Declaration::SetVisibility { line, .. }
            | Declaration::IncludeModule { line, .. }
            | Declaration::ExtendModule { line, .. }
            | Declaration::DefineAttribute { line, .. }
            | Declaration::SetModuleFunctionMode { line } => *line,
        }
    }
}
