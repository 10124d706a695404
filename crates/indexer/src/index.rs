//! The built symbol table: an arena of namespaces keyed by fully-qualified
//! name, immutable once the pipeline finishes it.

use rustc_hash::FxHashMap;
use serde::Serialize;
use stub_parser::{ConstantValue, NamespaceKind, ParamList, ReceiverKind, Visibility};

/// Arena handle for a [`Namespace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NamespaceId(pub(crate) u32);

impl NamespaceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Unit name and 1-based line a declaration came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub unit: String,
    pub line: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Constant {
    pub name: String,
    pub value: ConstantValue,
    pub doc: Option<String>,
    pub location: SourceLocation,
}

/// Resolution state of an alias member, filled in by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasState {
    /// The resolver has not run yet.
    Pending,
    /// The chain ends at the named canonical member.
    Resolved { canonical: String },
    /// The target is never defined in the owning namespace.
    Dangling,
    /// The chain revisits a name or exceeds the hop cap.
    Cyclic,
}

#[derive(Debug, Clone, Serialize)]
pub struct AliasLink {
    pub target: String,
    pub state: AliasState,
}

/// A method or accessor owned by exactly one namespace.
#[derive(Debug, Clone, Serialize)]
pub struct Member {
    pub name: String,
    pub receiver: ReceiverKind,
    pub visibility: Visibility,
    pub params: ParamList,
    pub doc: Option<String>,
    /// `Some` when the member was declared via `alias`.
    pub alias: Option<AliasLink>,
    pub location: SourceLocation,
}

impl Member {
    /// Plain members and resolved aliases show up in listings and search;
    /// dangling and cyclic aliases do not.
    pub fn is_queryable(&self) -> bool {
        match &self.alias {
            None => true,
            Some(link) => matches!(link.state, AliasState::Resolved { .. }),
        }
    }
}

/// A module or class node. Identity is the fully-qualified name; re-opening
/// the same name anywhere merges into the same node.
#[derive(Debug, Clone, Serialize)]
pub struct Namespace {
    pub id: NamespaceId,
    /// Joined display form, e.g. `OpenSSL::PKey::RSA`.
    pub fqn: String,
    /// Path segments of `fqn`.
    pub path: Vec<String>,
    pub kind: NamespaceKind,
    pub parent: Option<NamespaceId>,
    /// Unresolved textual reference; classes only.
    pub superclass: Option<String>,
    pub doc: Option<String>,
    /// Declaration order is preserved; re-declarations keep their first slot.
    pub members: Vec<Member>,
    pub constants: Vec<Constant>,
    /// Included module names, declaration order, deduplicated.
    pub includes: Vec<String>,
    /// Extended module names; recorded, not used for ancestry.
    pub extends: Vec<String>,
    /// Every open of this namespace, in merge order.
    pub declaration_sites: Vec<SourceLocation>,
    /// Resolved ancestry, closest first, excluding self. Filled by the
    /// resolver.
    pub ancestors: Vec<NamespaceId>,
    /// Superclass/include names that did not resolve.
    pub unresolved_bases: Vec<String>,
}

impl Namespace {
    /// Last path segment.
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or(&self.fqn)
    }

    /// Member by name and receiver kind.
    pub fn member(&self, name: &str, receiver: ReceiverKind) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| m.name == name && m.receiver == receiver)
    }

    /// Member by name among non-singleton members. Aliases resolve in this
    /// set; the stub corpus never aliases singleton methods.
    pub fn callable(&self, name: &str) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| m.name == name && m.receiver != ReceiverKind::Singleton)
    }
}

/// One entry of the sorted member-name table backing prefix search.
#[derive(Debug, Clone)]
pub struct MemberKey {
    pub name: String,
    pub namespace: NamespaceId,
    pub slot: usize,
}

/// The finished, immutable symbol index.
#[derive(Debug, Default)]
pub struct StubIndex {
    pub(crate) namespaces: Vec<Namespace>,
    pub(crate) by_fqn: FxHashMap<String, NamespaceId>,
    /// Queryable members sorted by (member name, namespace fqn).
    pub(crate) member_table: Vec<MemberKey>,
}

impl StubIndex {
    /// Namespace by fully-qualified name.
    pub fn find(&self, fqn: &str) -> Option<&Namespace> {
        self.by_fqn.get(fqn).map(|id| &self.namespaces[id.index()])
    }

    pub fn namespace(&self, id: NamespaceId) -> &Namespace {
        &self.namespaces[id.index()]
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.iter()
    }

    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }

    pub fn member_count(&self) -> usize {
        self.namespaces.iter().map(|ns| ns.members.len()).sum()
    }

    pub fn constant_count(&self) -> usize {
        self.namespaces.iter().map(|ns| ns.constants.len()).sum()
    }

    pub fn alias_count(&self) -> usize {
        self.namespaces
            .iter()
            .flat_map(|ns| ns.members.iter())
            .filter(|m| m.alias.is_some())
            .count()
    }

    /// The contiguous slice of the member table whose names start with
    /// `prefix`. Entries with equal names are ordered by namespace fqn.
    pub fn members_with_prefix(&self, prefix: &str) -> &[MemberKey] {
        let start = self
            .member_table
            .partition_point(|key| key.name.as_str() < prefix);
        let len = self.member_table[start..].partition_point(|key| key.name.starts_with(prefix));
        &self.member_table[start..start + len]
    }

    /// Rebuilds the sorted member table; called once after resolution.
    pub(crate) fn rebuild_member_table(&mut self) {
        let mut table = Vec::new();
        for ns in &self.namespaces {
            for (slot, member) in ns.members.iter().enumerate() {
                if member.is_queryable() {
                    table.push(MemberKey {
                        name: member.name.clone(),
                        namespace: ns.id,
                        slot,
                    });
                }
            }
        }
        table.sort_by(|a, b| {
            a.name.cmp(&b.name).then_with(|| {
                self.namespaces[a.namespace.index()]
                    .fqn
                    .cmp(&self.namespaces[b.namespace.index()].fqn)
            })
        });
        self.member_table = table;
    }
}
