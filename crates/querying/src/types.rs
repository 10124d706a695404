//! Owned, serializable result records, decoupled from index internals.
//!
//! The editor-facing wire format beyond "serializable records" is left to
//! the consumer; these types only fix the shapes of the query results.

use serde::Serialize;
use stub_parser::{ConstantValue, NamespaceKind, ParamKind, ReceiverKind, Visibility};

use indexer::{AliasState, Constant, Member, Namespace};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRecord {
    pub unit: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamRecord {
    pub name: String,
    pub kind: ParamKind,
    /// Raw default text; stub placeholders stay as written.
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstantRecord {
    pub name: String,
    /// [`ConstantValue::Opaque`] marks the `= _` placeholder; its real value
    /// is unspecified by the stubs.
    pub value: ConstantValue,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberRecord {
    pub name: String,
    pub receiver: ReceiverKind,
    pub visibility: Visibility,
    pub params: Vec<ParamRecord>,
    pub doc: Option<String>,
    /// Canonical member name when this member was declared via `alias`.
    pub alias_of: Option<String>,
    pub source: SourceRecord,
}

impl MemberRecord {
    pub(crate) fn from_member(member: &Member) -> Self {
        Self {
            name: member.name.clone(),
            receiver: member.receiver,
            visibility: member.visibility,
            params: member
                .params
                .iter()
                .map(|p| ParamRecord {
                    name: p.name.clone(),
                    kind: p.kind,
                    default: p.default_text.clone(),
                })
                .collect(),
            doc: member.doc.clone(),
            alias_of: member.alias.as_ref().and_then(|link| match &link.state {
                AliasState::Resolved { canonical } => Some(canonical.clone()),
                _ => None,
            }),
            source: SourceRecord {
                unit: member.location.unit.clone(),
                line: member.location.line,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceRecord {
    pub fqn: String,
    pub kind: NamespaceKind,
    pub superclass: Option<String>,
    pub doc: Option<String>,
    pub includes: Vec<String>,
    pub extends: Vec<String>,
    pub constants: Vec<ConstantRecord>,
    pub member_count: usize,
    /// Every unit/line that opened this namespace.
    pub declared_in: Vec<SourceRecord>,
}

impl NamespaceRecord {
    pub(crate) fn from_namespace(ns: &Namespace) -> Self {
        Self {
            fqn: ns.fqn.clone(),
            kind: ns.kind,
            superclass: ns.superclass.clone(),
            doc: ns.doc.clone(),
            includes: ns.includes.clone(),
            extends: ns.extends.clone(),
            constants: ns.constants.iter().map(ConstantRecord::from_constant).collect(),
            member_count: ns.members.len(),
            declared_in: ns
                .declaration_sites
                .iter()
                .map(|site| SourceRecord {
                    unit: site.unit.clone(),
                    line: site.line,
                })
                .collect(),
        }
    }
}

impl ConstantRecord {
    fn from_constant(constant: &Constant) -> Self {
        Self {
            name: constant.name.clone(),
            value: constant.value.clone(),
            doc: constant.doc.clone(),
        }
    }
}

/// One prefix-search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub namespace: String,
    pub member: MemberRecord,
}

/// Outcome of [`QueryService::resolve_alias`].
///
/// [`QueryService::resolve_alias`]: crate::service::QueryService::resolve_alias
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AliasResolution {
    Canonical(MemberRecord),
    NotFound,
    UnresolvedCycle,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListMembersOptions {
    pub include_inherited: bool,
}

impl ListMembersOptions {
    pub fn inherited() -> Self {
        Self {
            include_inherited: true,
        }
    }
}
