//! Alias chains and ancestry over the built tree.
//!
//! Runs after all units have merged. Alias chains are followed with a
//! visited set and a hop cap so cycles fail fast; ancestry linearizes the
//! included modules (reverse inclusion order, matching Ruby) followed by the
//! superclass chain, and stops at any unresolved base name.

use log::debug;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use stub_parser::ParamList;
use stub_parser::ReceiverKind;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::index::{AliasState, Namespace, NamespaceId, StubIndex};

/// Longest alias chain followed before declaring a cycle.
pub const MAX_ALIAS_HOPS: usize = 64;

/// Resolve aliases, then ancestry. Both passes only record diagnostics;
/// nothing here fails the build.
pub fn resolve(index: &mut StubIndex, diagnostics: &mut Diagnostics) {
    resolve_aliases(index, diagnostics);
    resolve_ancestry(index, diagnostics);
}

enum ChainEnd {
    Canonical {
        canonical: String,
        receiver: ReceiverKind,
        params: ParamList,
        doc: Option<String>,
    },
    Dangling { missing: String },
    Cyclic,
}

fn resolve_aliases(index: &mut StubIndex, diagnostics: &mut Diagnostics) {
    for ns in index.namespaces.iter_mut() {
        let mut updates: Vec<(usize, ChainEnd)> = Vec::new();
        for (slot, member) in ns.members.iter().enumerate() {
            let Some(link) = &member.alias else { continue };
            updates.push((slot, follow_chain(ns, &member.name, &link.target)));
        }
        for (slot, end) in updates {
            let fqn = ns.fqn.clone();
            let member = &mut ns.members[slot];
            let location = member.location.clone();
            match end {
                ChainEnd::Canonical {
                    canonical,
                    receiver,
                    params,
                    doc,
                } => {
                    member.receiver = receiver;
                    member.params = params;
                    if member.doc.is_none() {
                        member.doc = doc;
                    }
                    if let Some(link) = member.alias.as_mut() {
                        link.state = AliasState::Resolved { canonical };
                    }
                }
                ChainEnd::Dangling { missing } => {
                    let message = format!(
                        "alias `{}` in `{fqn}` points at `{missing}`, which is never defined",
                        member.name,
                    );
                    if let Some(link) = member.alias.as_mut() {
                        link.state = AliasState::Dangling;
                    }
                    diagnostics.push(Diagnostic::namespace_warning(
                        DiagnosticKind::UnresolvedAlias,
                        &fqn,
                        Some(&location.unit),
                        Some(location.line),
                        message,
                    ));
                }
                ChainEnd::Cyclic => {
                    let message =
                        format!("alias `{}` in `{fqn}` is part of an alias cycle", member.name);
                    if let Some(link) = member.alias.as_mut() {
                        link.state = AliasState::Cyclic;
                    }
                    diagnostics.push(Diagnostic::namespace_warning(
                        DiagnosticKind::AliasCycle,
                        &fqn,
                        Some(&location.unit),
                        Some(location.line),
                        message,
                    ));
                }
            }
        }
    }
}

/// Follow textual alias targets until a non-alias member is found. Singleton
/// members are not alias targets.
fn follow_chain(ns: &Namespace, alias_name: &str, first_target: &str) -> ChainEnd {
    let mut visited: FxHashSet<&str> = FxHashSet::default();
    visited.insert(alias_name);
    let mut current = first_target;
    let mut hops = 0;
    loop {
        if hops >= MAX_ALIAS_HOPS || visited.contains(current) {
            return ChainEnd::Cyclic;
        }
        let Some(target) = ns.callable(current) else {
            return ChainEnd::Dangling {
                missing: current.to_string(),
            };
        };
        match &target.alias {
            None => {
                return ChainEnd::Canonical {
                    canonical: target.name.clone(),
                    receiver: target.receiver,
                    params: target.params.clone(),
                    doc: target.doc.clone(),
                };
            }
            Some(link) => {
                visited.insert(current);
                current = link.target.as_str();
                hops += 1;
            }
        }
    }
}

fn resolve_ancestry(index: &mut StubIndex, diagnostics: &mut Diagnostics) {
    // resolve each namespace's direct bases once, so an unresolved base is
    // diagnosed where it is declared, not at every descendant
    let mut direct_bases: Vec<SmallVec<[NamespaceId; 4]>> =
        Vec::with_capacity(index.namespaces.len());
    let mut all_unresolved: Vec<Vec<String>> = Vec::with_capacity(index.namespaces.len());
    for ns in &index.namespaces {
        let mut bases = SmallVec::new();
        let mut unresolved: Vec<String> = Vec::new();
        let references = ns
            .includes
            .iter()
            .rev()
            .map(String::as_str)
            .chain(ns.superclass.as_deref());
        for reference in references {
            match resolve_reference(index, ns, reference) {
                Some(id) if id != ns.id => bases.push(id),
                Some(_) => {}
                None => {
                    if !unresolved.iter().any(|name| name == reference) {
                        unresolved.push(reference.to_string());
                    }
                }
            }
        }
        for name in &unresolved {
            debug!("unresolved base `{name}` for `{}`", ns.fqn);
            diagnostics.push(Diagnostic::namespace_warning(
                DiagnosticKind::UnresolvedBase,
                &ns.fqn,
                None,
                None,
                format!("base `{name}` of `{}` is not in the index", ns.fqn),
            ));
        }
        direct_bases.push(bases);
        all_unresolved.push(unresolved);
    }

    let mut ancestries: Vec<Vec<NamespaceId>> = Vec::with_capacity(index.namespaces.len());
    for position in 0..index.namespaces.len() {
        let id = index.namespaces[position].id;
        let mut visited: FxHashSet<NamespaceId> = FxHashSet::default();
        visited.insert(id);
        let mut ancestors = Vec::new();
        collect_ancestors(&direct_bases, id, &mut visited, &mut ancestors);
        ancestries.push(ancestors);
    }
    for (position, ns) in index.namespaces.iter_mut().enumerate() {
        ns.ancestors = std::mem::take(&mut ancestries[position]);
        ns.unresolved_bases = std::mem::take(&mut all_unresolved[position]);
    }
}

/// Depth-first over precomputed base lists; the visited set tolerates
/// inheritance loops and keeps the closest occurrence.
fn collect_ancestors(
    direct_bases: &[SmallVec<[NamespaceId; 4]>],
    id: NamespaceId,
    visited: &mut FxHashSet<NamespaceId>,
    out: &mut Vec<NamespaceId>,
) {
    for &base in &direct_bases[id.index()] {
        if visited.insert(base) {
            out.push(base);
            collect_ancestors(direct_bases, base, visited, out);
        }
    }
}

/// Lexical base-name resolution: `X` referenced inside `A::B` tries
/// `A::B::X`, `A::X`, then `X`; a `::X` reference is absolute.
fn resolve_reference(index: &StubIndex, from: &Namespace, name: &str) -> Option<NamespaceId> {
    if let Some(absolute) = name.strip_prefix("::") {
        return index.by_fqn.get(absolute).copied();
    }
    for depth in (0..=from.path.len()).rev() {
        let candidate = if depth == 0 {
            name.to_string()
        } else {
            format!("{}::{name}", from.path[..depth].join("::"))
        };
        if let Some(&id) = index.by_fqn.get(&candidate) {
            return Some(id);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SymbolTableBuilder;
    use stub_parser::{ParseOutcome, UnitParser};

    fn build_resolved(units: &[(&str, &str)]) -> (StubIndex, Diagnostics) {
        let mut builder = SymbolTableBuilder::new();
        let mut diagnostics = Diagnostics::new();
        for (name, text) in units {
            let ParseOutcome::Parsed(parsed) = UnitParser::new(*name, text).parse() else {
                panic!("fixture unit `{name}` must parse");
            };
            builder.apply_unit(&parsed, &mut diagnostics);
        }
        let mut index = builder.finish();
        resolve(&mut index, &mut diagnostics);
        index.rebuild_member_table();
        (index, diagnostics)
    }

    fn alias_state<'a>(index: &'a StubIndex, fqn: &str, name: &str) -> &'a AliasState {
        let member = index.find(fqn).unwrap().callable(name).unwrap();
        &member.alias.as_ref().unwrap().state
    }

    #[test]
    fn test_alias_adopts_canonical_shape() {
        let (index, diagnostics) = build_resolved(&[(
            "sym.rb",
            "class Symbol\n\
             \x20 # Case comparison.\n\
             \x20 def casecmp(other) end\n\
             \x20 alias compare casecmp\nend\n",
        )]);

        assert_eq!(
            *alias_state(&index, "Symbol", "compare"),
            AliasState::Resolved {
                canonical: "casecmp".to_string()
            }
        );
        let compare = index.find("Symbol").unwrap().callable("compare").unwrap();
        assert_eq!(compare.params.len(), 1);
        assert_eq!(compare.doc.as_deref(), Some("Case comparison."));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_transitive_chain_resolves_to_final_member() {
        let (index, _) = build_resolved(&[(
            "a.rb",
            "class Foo\n  def base() end\n  alias mid base\n  alias top mid\nend\n",
        )]);

        assert_eq!(
            *alias_state(&index, "Foo", "top"),
            AliasState::Resolved {
                canonical: "base".to_string()
            }
        );
    }

    #[test]
    fn test_cross_unit_alias_resolves() {
        let (index, _) = build_resolved(&[
            ("a.rb", "class Foo\n  def bar() end\nend\n"),
            ("b.rb", "class Foo\n  alias baz bar\nend\n"),
        ]);

        assert_eq!(
            *alias_state(&index, "Foo", "baz"),
            AliasState::Resolved {
                canonical: "bar".to_string()
            }
        );
    }

    #[test]
    fn test_dangling_alias_is_diagnosed_and_excluded() {
        let (index, diagnostics) = build_resolved(&[(
            "ns.rb",
            "class Ns\n  alias c b\nend\n",
        )]);

        assert_eq!(*alias_state(&index, "Ns", "c"), AliasState::Dangling);
        assert_eq!(diagnostics.count_of(DiagnosticKind::UnresolvedAlias), 1);
        assert!(index.members_with_prefix("c").is_empty());
    }

    #[test]
    fn test_dangling_chain_names_the_missing_member() {
        let (index, diagnostics) = build_resolved(&[(
            "ns.rb",
            "class Ns\n  alias a b\n  alias b missing\nend\n",
        )]);

        assert_eq!(*alias_state(&index, "Ns", "a"), AliasState::Dangling);
        assert_eq!(*alias_state(&index, "Ns", "b"), AliasState::Dangling);
        let messages: Vec<_> = diagnostics
            .of_kind(DiagnosticKind::UnresolvedAlias)
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(messages.len(), 2);
        // both report the name the chain actually failed on, not `b`
        for message in messages {
            assert!(message.contains("`missing`"), "got: {message}");
        }
    }

    #[test]
    fn test_alias_cycle_fails_fast() {
        let (index, diagnostics) = build_resolved(&[(
            "c.rb",
            "class C\n  alias a b\n  alias b a\nend\n",
        )]);

        assert_eq!(*alias_state(&index, "C", "a"), AliasState::Cyclic);
        assert_eq!(*alias_state(&index, "C", "b"), AliasState::Cyclic);
        assert_eq!(diagnostics.count_of(DiagnosticKind::AliasCycle), 2);
    }

    #[test]
    fn test_self_alias_is_a_cycle() {
        let (_, diagnostics) =
            build_resolved(&[("c.rb", "class C\n  alias x x\nend\n")]);

        assert_eq!(diagnostics.count_of(DiagnosticKind::AliasCycle), 1);
    }

    #[test]
    fn test_superclass_chain_order() {
        let (index, _) = build_resolved(&[
            ("a.rb", "class A\nend\n"),
            ("b.rb", "class B < A\nend\n"),
            ("c.rb", "class C < B\nend\n"),
        ]);

        let c = index.find("C").unwrap();
        let chain: Vec<_> = c
            .ancestors
            .iter()
            .map(|&id| index.namespace(id).fqn.as_str())
            .collect();
        assert_eq!(chain, vec!["B", "A"]);
    }

    #[test]
    fn test_includes_searched_in_reverse_inclusion_order() {
        let (index, _) = build_resolved(&[(
            "m.rb",
            "module M1\nend\nmodule M2\nend\nclass A\nend\n\
             class B < A\n  include M1\n  include M2\nend\n",
        )]);

        let b = index.find("B").unwrap();
        let chain: Vec<_> = b
            .ancestors
            .iter()
            .map(|&id| index.namespace(id).fqn.as_str())
            .collect();
        assert_eq!(chain, vec!["M2", "M1", "A"]);
    }

    #[test]
    fn test_unresolved_base_stops_chain_without_failing() {
        let (index, diagnostics) = build_resolved(&[(
            "io.rb",
            "class IO < External\n  def close() end\nend\n",
        )]);

        let io = index.find("IO").unwrap();
        assert!(io.ancestors.is_empty());
        assert_eq!(io.unresolved_bases, vec!["External"]);
        assert_eq!(diagnostics.count_of(DiagnosticKind::UnresolvedBase), 1);
        // own members remain queryable
        assert!(io.callable("close").is_some());
    }

    #[test]
    fn test_lexical_resolution_prefers_inner_scope() {
        let (index, _) = build_resolved(&[(
            "ossl.rb",
            "module OpenSSL\n\
             \x20 class Error\n  end\n\
             \x20 module PKey\n\
             \x20   class PKeyError < Error\n    end\n\
             \x20 end\nend\n\
             class Error\nend\n",
        )]);

        let pkey_error = index.find("OpenSSL::PKey::PKeyError").unwrap();
        let chain: Vec<_> = pkey_error
            .ancestors
            .iter()
            .map(|&id| index.namespace(id).fqn.as_str())
            .collect();
        assert_eq!(chain, vec!["OpenSSL::Error"]);
    }

    #[test]
    fn test_inheritance_loop_tolerated() {
        let (index, _) = build_resolved(&[
            ("a.rb", "class A < B\nend\n"),
            ("b.rb", "class B < A\nend\n"),
        ]);

        let a = index.find("A").unwrap();
        let chain: Vec<_> = a
            .ancestors
            .iter()
            .map(|&id| index.namespace(id).fqn.as_str())
            .collect();
        assert_eq!(chain, vec!["B"]);
    }
}
