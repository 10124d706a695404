//! The query service: synchronous, side-effect-free lookups.

use std::collections::HashSet;
use std::sync::Arc;

use indexer::{AliasState, MemberKey, StubIndex};
use stub_parser::ReceiverKind;

use crate::types::{
    AliasResolution, ListMembersOptions, MemberRecord, NamespaceRecord, SearchHit,
};

/// Read-only queries over one immutable index snapshot. Clone-cheap; any
/// number of services can share the same snapshot concurrently.
#[derive(Clone)]
pub struct QueryService {
    index: Arc<StubIndex>,
}

impl QueryService {
    pub fn new(index: Arc<StubIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &StubIndex {
        &self.index
    }

    /// Namespace by fully-qualified name; `None` for unknown names.
    pub fn find_namespace(&self, fqn: &str) -> Option<NamespaceRecord> {
        self.index.find(fqn).map(NamespaceRecord::from_namespace)
    }

    /// Members of a namespace in declaration order. With
    /// `include_inherited`, ancestors' members follow the namespace's own,
    /// closest ancestor first; a name already seen for the same receiver
    /// kind is never repeated from further up the chain.
    pub fn list_members(&self, fqn: &str, options: ListMembersOptions) -> Vec<MemberRecord> {
        let Some(ns) = self.index.find(fqn) else {
            return Vec::new();
        };
        let mut records: Vec<MemberRecord> = ns
            .members
            .iter()
            .filter(|m| m.is_queryable())
            .map(MemberRecord::from_member)
            .collect();
        if options.include_inherited {
            let mut seen: HashSet<(String, ReceiverKind)> = records
                .iter()
                .map(|record| (record.name.clone(), record.receiver))
                .collect();
            for &ancestor_id in &ns.ancestors {
                let ancestor = self.index.namespace(ancestor_id);
                for member in ancestor.members.iter().filter(|m| m.is_queryable()) {
                    if seen.insert((member.name.clone(), member.receiver)) {
                        records.push(MemberRecord::from_member(member));
                    }
                }
            }
        }
        records
    }

    /// Resolve a member name to its canonical member. A plain member
    /// resolves to itself; a dangling alias or an unknown name is
    /// `NotFound`; an alias on a cycle is `UnresolvedCycle`.
    pub fn resolve_alias(&self, fqn: &str, name: &str) -> AliasResolution {
        let Some(ns) = self.index.find(fqn) else {
            return AliasResolution::NotFound;
        };
        let Some(member) = ns.callable(name) else {
            return AliasResolution::NotFound;
        };
        match &member.alias {
            None => AliasResolution::Canonical(MemberRecord::from_member(member)),
            Some(link) => match &link.state {
                AliasState::Resolved { canonical } => ns
                    .callable(canonical)
                    .map(|target| AliasResolution::Canonical(MemberRecord::from_member(target)))
                    .unwrap_or(AliasResolution::NotFound),
                AliasState::Cyclic => AliasResolution::UnresolvedCycle,
                AliasState::Dangling | AliasState::Pending => AliasResolution::NotFound,
            },
        }
    }

    /// Lazy scan of all queryable members whose name starts with `prefix`,
    /// ordered by member name then namespace fqn. Restartable: the same
    /// prefix against the same snapshot yields the same sequence.
    pub fn search_by_prefix(&self, prefix: &str) -> PrefixSearch<'_> {
        PrefixSearch {
            index: self.index.as_ref(),
            keys: self.index.members_with_prefix(prefix).iter(),
        }
    }

    /// Point lookup for hover/signature help.
    pub fn find_member(
        &self,
        fqn: &str,
        name: &str,
        receiver: ReceiverKind,
    ) -> Option<MemberRecord> {
        self.index
            .find(fqn)?
            .member(name, receiver)
            .filter(|m| m.is_queryable())
            .map(MemberRecord::from_member)
    }
}

/// Iterator over a contiguous slice of the sorted member table.
pub struct PrefixSearch<'a> {
    index: &'a StubIndex,
    keys: std::slice::Iter<'a, MemberKey>,
}

impl Iterator for PrefixSearch<'_> {
    type Item = SearchHit;

    fn next(&mut self) -> Option<SearchHit> {
        let key = self.keys.next()?;
        let ns = self.index.namespace(key.namespace);
        Some(SearchHit {
            namespace: ns.fqn.clone(),
            member: MemberRecord::from_member(&ns.members[key.slot]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::service_from_pairs;

    fn names(records: &[MemberRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_find_namespace_known_and_unknown() {
        let (service, _) = service_from_pairs(&[(
            "date.rb",
            "# A calendar date.\nclass Date\n  ITALY = _\n  def year() end\nend\n",
        )]);

        let date = service.find_namespace("Date").unwrap();
        assert_eq!(date.doc.as_deref(), Some("A calendar date."));
        assert_eq!(date.member_count, 1);
        assert!(date.constants[0].value.is_opaque());
        assert!(service.find_namespace("Time").is_none());
    }

    #[test]
    fn test_list_members_alias_scenario() {
        let (service, _) = service_from_pairs(&[
            ("a.rb", "class Foo\n  def bar() end\nend\n"),
            ("b.rb", "class Foo\n  alias baz bar\nend\n"),
        ]);

        let members = service.list_members("Foo", ListMembersOptions::default());
        assert_eq!(names(&members), vec!["bar", "baz"]);
        let AliasResolution::Canonical(canonical) = service.resolve_alias("Foo", "baz") else {
            panic!("expected a canonical resolution");
        };
        assert_eq!(canonical.name, "bar");
    }

    #[test]
    fn test_list_members_inherited_order() {
        let (service, _) = service_from_pairs(&[(
            "ab.rb",
            "class A\n  def x() end\nend\nclass B < A\n  def y() end\nend\n",
        )]);

        let members = service.list_members("B", ListMembersOptions::inherited());
        assert_eq!(names(&members), vec!["y", "x"]);
    }

    #[test]
    fn test_inherited_shadowing_never_duplicates() {
        let (service, _) = service_from_pairs(&[(
            "ab.rb",
            "class A\n  def x(a, b) end\n  def z() end\nend\n\
             class B < A\n  def x() end\nend\n",
        )]);

        let members = service.list_members("B", ListMembersOptions::inherited());
        assert_eq!(names(&members), vec!["x", "z"]);
        // the class's own declaration wins
        assert!(members[0].params.is_empty());
    }

    #[test]
    fn test_inherited_closest_ancestor_first() {
        let (service, _) = service_from_pairs(&[(
            "chain.rb",
            "class A\n  def a() end\nend\n\
             class B < A\n  def b() end\nend\n\
             class C < B\n  def c() end\nend\n",
        )]);

        let members = service.list_members("C", ListMembersOptions::inherited());
        assert_eq!(names(&members), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_resolve_alias_on_plain_member_returns_itself() {
        let (service, _) =
            service_from_pairs(&[("a.rb", "class Foo\n  def bar() end\nend\n")]);

        let AliasResolution::Canonical(member) = service.resolve_alias("Foo", "bar") else {
            panic!("expected a canonical resolution");
        };
        assert_eq!(member.name, "bar");
        assert!(member.alias_of.is_none());
    }

    #[test]
    fn test_resolve_alias_dangling_and_cycle() {
        let (service, diagnostics) = service_from_pairs(&[(
            "ns.rb",
            "class Ns\n  alias c b\n  alias p q\n  alias q p\nend\n",
        )]);

        assert_eq!(service.resolve_alias("Ns", "c"), AliasResolution::NotFound);
        assert_eq!(
            service.resolve_alias("Ns", "p"),
            AliasResolution::UnresolvedCycle
        );
        assert_eq!(service.resolve_alias("Ns", "missing"), AliasResolution::NotFound);
        assert!(!diagnostics.is_empty());
        // excluded from listings
        assert!(service.list_members("Ns", ListMembersOptions::default()).is_empty());
    }

    #[test]
    fn test_prefix_search_order_and_restartability() {
        let (service, _) = service_from_pairs(&[
            ("sym.rb", "class Symbol\n  def to_s() end\n  def to_proc() end\nend\n"),
            ("str.rb", "class String\n  def to_s() end\nend\n"),
        ]);

        let first: Vec<_> = service.search_by_prefix("to_").collect();
        let second: Vec<_> = service.search_by_prefix("to_").collect();
        assert_eq!(first, second);

        let pairs: Vec<_> = first
            .iter()
            .map(|hit| (hit.member.name.as_str(), hit.namespace.as_str()))
            .collect();
        // member name first, namespace fqn breaks ties
        assert_eq!(
            pairs,
            vec![
                ("to_proc", "Symbol"),
                ("to_s", "String"),
                ("to_s", "Symbol"),
            ]
        );
        assert!(service.search_by_prefix("zz").next().is_none());
    }

    #[test]
    fn test_find_member_distinguishes_receivers() {
        let (service, _) = service_from_pairs(&[(
            "date.rb",
            "class Date\n  def self.today() end\n  def year() end\nend\n",
        )]);

        assert!(
            service
                .find_member("Date", "today", ReceiverKind::Singleton)
                .is_some()
        );
        assert!(
            service
                .find_member("Date", "today", ReceiverKind::Instance)
                .is_none()
        );
        assert!(
            service
                .find_member("Date", "year", ReceiverKind::Instance)
                .is_some()
        );
    }

    #[test_log::test]
    fn test_queries_over_fixture_corpus() {
        let (service, diagnostics) = service_from_pairs(&testing::fixtures::corpus());
        assert!(!diagnostics.has_errors());

        let rsa = service.find_namespace("OpenSSL::PKey::RSA").unwrap();
        assert_eq!(rsa.kind, stub_parser::NamespaceKind::Class);

        // DateTime inherits Date's instance methods, closest first
        let members = service.list_members("DateTime", ListMembersOptions::inherited());
        let names = names(&members);
        assert!(names.contains(&"hour"));
        assert!(names.contains(&"year"));

        let AliasResolution::Canonical(canonical) = service.resolve_alias("Symbol", "id2name")
        else {
            panic!("expected a canonical resolution");
        };
        assert_eq!(canonical.name, "to_s");

        assert!(service.search_by_prefix("to_").count() >= 3);
    }

    #[test]
    fn test_records_serialize() {
        let (service, _) = service_from_pairs(&[(
            "io.rb",
            "class IO\n  # Reads bytes.\n  def read(length = nil, &blk) end\nend\n",
        )]);

        let members = service.list_members("IO", ListMembersOptions::default());
        let json = serde_json::to_value(&members).unwrap();
        assert_eq!(json[0]["name"], "read");
        assert_eq!(json[0]["receiver"], "instance");
        assert_eq!(json[0]["params"][0]["kind"], "optional");
        assert_eq!(json[0]["params"][1]["kind"], "block");
        assert_eq!(json[0]["source"]["unit"], "io.rb");
    }
}
