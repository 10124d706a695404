//! Symbol table builder: applies per-unit declaration streams to the shared
//! namespace tree.
//!
//! Merge rules: namespace identity is the fully-qualified name, the first
//! declared kind and superclass win, members and constants re-declared later
//! overwrite in place (monkey-patch-style re-opening) while keeping their
//! first declaration slot.

use log::{debug, warn};
use rustc_hash::FxHashMap;
use stub_parser::{
    Declaration, NamespaceKind, ParamList, ParsedUnit, ReceiverKind, Visibility,
};

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::index::{
    AliasLink, AliasState, Constant, Member, Namespace, NamespaceId, SourceLocation, StubIndex,
};

/// Parse-time body mode; resets whenever a namespace body opens, including
/// on re-open in another unit.
#[derive(Debug, Clone, Copy, Default)]
struct BodyMode {
    visibility: Visibility,
    module_function: bool,
}

struct OpenFrame {
    id: NamespaceId,
    mode: BodyMode,
}

pub struct SymbolTableBuilder {
    namespaces: Vec<Namespace>,
    by_fqn: FxHashMap<String, NamespaceId>,
}

impl Default for SymbolTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTableBuilder {
    pub fn new() -> Self {
        Self {
            namespaces: Vec::new(),
            by_fqn: FxHashMap::default(),
        }
    }

    /// Apply one parsed unit's declarations in order.
    pub fn apply_unit(&mut self, unit: &ParsedUnit, diagnostics: &mut Diagnostics) {
        debug!(
            "merging unit `{}` ({} declarations)",
            unit.unit_name,
            unit.declarations.len()
        );
        let mut stack: Vec<OpenFrame> = Vec::new();
        for declaration in &unit.declarations {
            match declaration {
                Declaration::OpenNamespace {
                    name,
                    kind,
                    superclass,
                    doc,
                    line,
                } => {
                    let parent = stack.last().map(|frame| frame.id);
                    let id = self.open_namespace(
                        parent,
                        name,
                        *kind,
                        superclass.clone(),
                        doc.clone(),
                        &unit.unit_name,
                        *line,
                        diagnostics,
                    );
                    stack.push(OpenFrame {
                        id,
                        mode: BodyMode::default(),
                    });
                }
                Declaration::CloseNamespace { .. } => {
                    stack.pop();
                }
                Declaration::DefineConstant {
                    name,
                    value,
                    doc,
                    line,
                } => {
                    let Some(frame) = stack.last() else { continue };
                    self.upsert_constant(
                        frame.id,
                        Constant {
                            name: name.clone(),
                            value: value.clone(),
                            doc: doc.clone(),
                            location: location(&unit.unit_name, *line),
                        },
                    );
                }
                Declaration::DefineMethod {
                    name,
                    receiver,
                    params,
                    doc,
                    line,
                } => {
                    let Some(frame) = stack.last() else { continue };
                    let receiver = match *receiver {
                        ReceiverKind::Instance if frame.mode.module_function => {
                            ReceiverKind::ModuleFunction
                        }
                        other => other,
                    };
                    // `private` never applies to singleton defs in the stubs
                    let visibility = if receiver == ReceiverKind::Singleton {
                        Visibility::Public
                    } else {
                        frame.mode.visibility
                    };
                    self.upsert_member(
                        frame.id,
                        Member {
                            name: name.clone(),
                            receiver,
                            visibility,
                            params: params.clone(),
                            doc: doc.clone(),
                            alias: None,
                            location: location(&unit.unit_name, *line),
                        },
                    );
                }
                Declaration::DefineAlias {
                    new_name,
                    target,
                    doc,
                    line,
                } => {
                    let Some(frame) = stack.last() else { continue };
                    let receiver = if frame.mode.module_function {
                        ReceiverKind::ModuleFunction
                    } else {
                        ReceiverKind::Instance
                    };
                    // params and receiver are adopted from the canonical
                    // member once the resolver runs
                    self.upsert_member(
                        frame.id,
                        Member {
                            name: new_name.clone(),
                            receiver,
                            visibility: frame.mode.visibility,
                            params: ParamList::new(),
                            doc: doc.clone(),
                            alias: Some(AliasLink {
                                target: target.clone(),
                                state: AliasState::Pending,
                            }),
                            location: location(&unit.unit_name, *line),
                        },
                    );
                }
                Declaration::DefineAttribute {
                    names,
                    reader,
                    writer,
                    doc,
                    line,
                } => {
                    let Some(frame) = stack.last() else { continue };
                    let visibility = frame.mode.visibility;
                    let frame_id = frame.id;
                    for name in names {
                        if *reader {
                            self.upsert_member(
                                frame_id,
                                Member {
                                    name: name.clone(),
                                    receiver: ReceiverKind::Instance,
                                    visibility,
                                    params: ParamList::new(),
                                    doc: doc.clone(),
                                    alias: None,
                                    location: location(&unit.unit_name, *line),
                                },
                            );
                        }
                        if *writer {
                            self.upsert_member(
                                frame_id,
                                Member {
                                    name: format!("{name}="),
                                    receiver: ReceiverKind::Instance,
                                    visibility,
                                    params: writer_params(),
                                    doc: doc.clone(),
                                    alias: None,
                                    location: location(&unit.unit_name, *line),
                                },
                            );
                        }
                    }
                }
                Declaration::SetVisibility { visibility, .. } => {
                    if let Some(frame) = stack.last_mut() {
                        frame.mode.visibility = *visibility;
                    }
                }
                Declaration::SetModuleFunctionMode { .. } => {
                    if let Some(frame) = stack.last_mut() {
                        frame.mode.module_function = true;
                    }
                }
                Declaration::IncludeModule { name, .. } => {
                    let Some(frame) = stack.last() else { continue };
                    let ns = &mut self.namespaces[frame.id.index()];
                    if !ns.includes.iter().any(|existing| existing == name) {
                        ns.includes.push(name.clone());
                    }
                }
                Declaration::ExtendModule { name, .. } => {
                    let Some(frame) = stack.last() else { continue };
                    let ns = &mut self.namespaces[frame.id.index()];
                    if !ns.extends.iter().any(|existing| existing == name) {
                        ns.extends.push(name.clone());
                    }
                }
            }
        }
    }

    /// Consume the builder; the resolver and the member table still run
    /// before the index is served.
    pub fn finish(self) -> StubIndex {
        StubIndex {
            namespaces: self.namespaces,
            by_fqn: self.by_fqn,
            member_table: Vec::new(),
        }
    }

    /// Open a possibly compound name (`Date::Infinity`) under `parent`.
    /// Intermediate segments that were never declared themselves are created
    /// as placeholder modules and adopt the first explicit kind later.
    #[allow(clippy::too_many_arguments)]
    fn open_namespace(
        &mut self,
        parent: Option<NamespaceId>,
        name: &str,
        kind: NamespaceKind,
        mut superclass: Option<String>,
        mut doc: Option<String>,
        unit: &str,
        line: u32,
        diagnostics: &mut Diagnostics,
    ) -> NamespaceId {
        let mut path: Vec<String> = parent
            .map(|id| self.namespaces[id.index()].path.clone())
            .unwrap_or_default();
        let mut parent_id = parent;
        let segments: Vec<&str> = name.split("::").collect();
        let mut id = NamespaceId(0);
        for (position, segment) in segments.iter().enumerate() {
            path.push(segment.to_string());
            let is_last = position + 1 == segments.len();
            let initial_kind = if is_last { kind } else { NamespaceKind::Module };
            id = self.ensure_namespace(&path, initial_kind, parent_id);
            if is_last {
                self.merge_header(
                    id,
                    kind,
                    superclass.take(),
                    doc.take(),
                    unit,
                    line,
                    diagnostics,
                );
            }
            parent_id = Some(id);
        }
        id
    }

    fn ensure_namespace(
        &mut self,
        path: &[String],
        kind: NamespaceKind,
        parent: Option<NamespaceId>,
    ) -> NamespaceId {
        let fqn = path.join("::");
        if let Some(&id) = self.by_fqn.get(&fqn) {
            return id;
        }
        let id = NamespaceId(self.namespaces.len() as u32);
        self.namespaces.push(Namespace {
            id,
            fqn: fqn.clone(),
            path: path.to_vec(),
            kind,
            parent,
            superclass: None,
            doc: None,
            members: Vec::new(),
            constants: Vec::new(),
            includes: Vec::new(),
            extends: Vec::new(),
            declaration_sites: Vec::new(),
            ancestors: Vec::new(),
            unresolved_bases: Vec::new(),
        });
        self.by_fqn.insert(fqn, id);
        id
    }

    #[allow(clippy::too_many_arguments)]
    fn merge_header(
        &mut self,
        id: NamespaceId,
        kind: NamespaceKind,
        superclass: Option<String>,
        doc: Option<String>,
        unit: &str,
        line: u32,
        diagnostics: &mut Diagnostics,
    ) {
        let ns = &mut self.namespaces[id.index()];
        let fqn = ns.fqn.clone();
        if ns.declaration_sites.is_empty() {
            // first explicit open; placeholder kind from a compound path is
            // not a conflict
            ns.kind = kind;
        } else if ns.kind != kind {
            warn!(
                "namespace `{fqn}` re-opened as {} in `{unit}`, keeping {}",
                kind.as_str(),
                ns.kind.as_str()
            );
            let message = format!(
                "`{fqn}` re-opened as {}, keeping {}",
                kind.as_str(),
                ns.kind.as_str()
            );
            diagnostics.push(Diagnostic::namespace_warning(
                DiagnosticKind::NamespaceKindConflict,
                &fqn,
                Some(unit),
                Some(line),
                message,
            ));
        }
        if let Some(superclass) = superclass {
            let ns = &mut self.namespaces[id.index()];
            match &ns.superclass {
                None => ns.superclass = Some(superclass),
                Some(existing) if *existing != superclass => {
                    let message = format!(
                        "`{fqn}` re-opened with superclass `{superclass}`, keeping `{existing}`"
                    );
                    diagnostics.push(Diagnostic::namespace_warning(
                        DiagnosticKind::SuperclassConflict,
                        &fqn,
                        Some(unit),
                        Some(line),
                        message,
                    ));
                }
                Some(_) => {}
            }
        }
        let ns = &mut self.namespaces[id.index()];
        if ns.doc.is_none() {
            ns.doc = doc;
        }
        ns.declaration_sites.push(location(unit, line));
    }

    fn upsert_member(&mut self, id: NamespaceId, member: Member) {
        let ns = &mut self.namespaces[id.index()];
        match ns
            .members
            .iter_mut()
            .find(|m| m.name == member.name && m.receiver == member.receiver)
        {
            // last write wins, first slot kept
            Some(existing) => *existing = member,
            None => ns.members.push(member),
        }
    }

    fn upsert_constant(&mut self, id: NamespaceId, constant: Constant) {
        let ns = &mut self.namespaces[id.index()];
        match ns
            .constants
            .iter_mut()
            .find(|c| c.name == constant.name)
        {
            Some(existing) => *existing = constant,
            None => ns.constants.push(constant),
        }
    }
}

fn location(unit: &str, line: u32) -> SourceLocation {
    SourceLocation {
        unit: unit.to_string(),
        line,
    }
}

fn writer_params() -> ParamList {
    let mut params = ParamList::new();
    params.push(stub_parser::Param {
        name: "value".to_string(),
        kind: stub_parser::ParamKind::Required,
        default_text: None,
    });
    params
}
