//! Parses one stub unit into its declaration stream.
//!
//! The grammar is the declarative subset the stub corpus actually uses:
//! `class`/`module` headers, constant assignments, `def` signatures with
//! empty bodies, `alias`, visibility markers, `include`/`extend`, and
//! `attr_*` lists. Anything else on a declaration line is a [`ParseError`]
//! that aborts this unit only.

use std::time::{Duration, Instant};

use log::debug;

use crate::error::{ParseError, Result};
use crate::events::{
    ConstantValue, Declaration, NamespaceKind, ParamList, ReceiverKind, Visibility,
};
use crate::line::{
    is_constant_name, is_constant_path, is_identifier, is_method_name, split_comment,
    take_constant_path,
};
use crate::params::{find_closing_paren, parse_params};

/// A unit whose parse aborted; its declarations are discarded.
#[derive(Debug, Clone)]
pub struct FailedUnit {
    pub unit_name: String,
    pub error: ParseError,
}

/// Parse statistics for a single unit.
#[derive(Debug, Clone, Default)]
pub struct UnitStats {
    pub parse_time: Duration,
    pub line_count: usize,
    pub declaration_count: usize,
}

/// A successfully parsed unit: the ordered declaration stream.
#[derive(Debug, Clone)]
pub struct ParsedUnit {
    pub unit_name: String,
    pub declarations: Vec<Declaration>,
    pub stats: UnitStats,
}

/// Result of parsing one unit.
#[derive(Debug)]
pub enum ParseOutcome {
    Parsed(ParsedUnit),
    Failed(FailedUnit),
}

impl ParseOutcome {
    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseOutcome::Parsed(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ParseOutcome::Failed(_))
    }

    /// Unit name regardless of outcome.
    pub fn unit_name(&self) -> &str {
        match self {
            ParseOutcome::Parsed(parsed) => &parsed.unit_name,
            ParseOutcome::Failed(failed) => &failed.unit_name,
        }
    }
}

/// Parser over one unit of stub source text.
pub struct UnitParser<'a> {
    name: String,
    text: &'a str,
}

impl<'a> UnitParser<'a> {
    pub fn new(name: impl Into<String>, text: &'a str) -> Self {
        Self {
            name: name.into(),
            text,
        }
    }

    pub fn size(&self) -> u64 {
        self.text.len() as u64
    }

    pub fn parse(self) -> ParseOutcome {
        let start = Instant::now();
        let mut state = ParserState::default();
        match state.run(self.text) {
            Ok(()) => ParseOutcome::Parsed(ParsedUnit {
                unit_name: self.name,
                stats: UnitStats {
                    parse_time: start.elapsed(),
                    line_count: state.line_count,
                    declaration_count: state.declarations.len(),
                },
                declarations: state.declarations,
            }),
            Err(error) => {
                debug!("aborting unit `{}`: {}", self.name, error);
                ParseOutcome::Failed(FailedUnit {
                    unit_name: self.name,
                    error,
                })
            }
        }
    }
}

struct OpenScope {
    name: String,
    line: u32,
}

#[derive(Default)]
struct ParserState {
    declarations: Vec<Declaration>,
    scopes: Vec<OpenScope>,
    pending_doc: Vec<String>,
    /// Nesting depth inside a `def` body; 0 when at declaration level.
    body_depth: usize,
    body_method: Option<(String, u32)>,
    line_count: usize,
}

impl ParserState {
    fn run(&mut self, text: &str) -> Result<()> {
        for (idx, raw) in text.lines().enumerate() {
            self.line_count = idx + 1;
            self.step(raw, (idx + 1) as u32)?;
        }
        if let Some((name, line)) = self.body_method.take()
            && self.body_depth > 0
        {
            return Err(ParseError::UnterminatedMethod { name, line });
        }
        if let Some(scope) = self.scopes.last() {
            return Err(ParseError::UnterminatedNamespace {
                name: scope.name.clone(),
                line: scope.line,
            });
        }
        Ok(())
    }

    fn step(&mut self, raw: &str, line: u32) -> Result<()> {
        let (code, comment) = split_comment(raw);
        let code = code.trim();

        if self.body_depth > 0 {
            self.skip_body_line(code);
            return Ok(());
        }

        if code.is_empty() {
            match comment {
                // comment-only line extends the pending doc block
                Some(text) => self.pending_doc.push(text.to_string()),
                // blank line ends it
                None => self.pending_doc.clear(),
            }
            return Ok(());
        }

        let keyword = code.split([' ', '\t', ';', '(']).next().unwrap_or(code);
        match keyword {
            "class" => self.open_namespace(NamespaceKind::Class, code, comment, line),
            "module" => self.open_namespace(NamespaceKind::Module, code, comment, line),
            "def" => self.define_method(code, comment, line),
            "alias" => self.define_alias(code, comment, line),
            "include" => self.record_mixin(code, "include", line),
            "extend" => self.record_mixin(code, "extend", line),
            "attr_reader" | "attr_writer" | "attr_accessor" => {
                self.define_attribute(keyword, code, comment, line)
            }
            "private" | "public" => self.set_visibility(keyword, code, line),
            "module_function" => self.set_module_function(code, line),
            "end" => self.close_namespace(code, line),
            _ => self.define_constant(code, comment, line),
        }
    }

    /// Stub bodies are empty in practice; tolerate simple statements and
    /// nested blocks without recording anything from them.
    fn skip_body_line(&mut self, code: &str) {
        if code.is_empty() {
            return;
        }
        if code == "end" || code == "end;" {
            self.body_depth -= 1;
            if self.body_depth == 0 {
                self.body_method = None;
            }
            return;
        }
        if opens_block(code) {
            self.body_depth += 1;
        }
    }

    fn open_namespace(
        &mut self,
        kind: NamespaceKind,
        code: &str,
        comment: Option<&str>,
        line: u32,
    ) -> Result<()> {
        let malformed = || ParseError::Malformed {
            text: code.to_string(),
            line,
        };
        let keyword_len = kind.as_str().len();
        let rest = code[keyword_len..].trim_start();
        let (name, rest) = take_constant_path(rest);
        if name.is_empty() {
            return Err(malformed());
        }

        let mut superclass = None;
        let mut rest = rest.trim_start();
        if kind == NamespaceKind::Class && rest.starts_with('<') && !rest.starts_with("<<") {
            let (sup, tail) = take_constant_path(rest[1..].trim_start());
            if sup.is_empty() {
                return Err(malformed());
            }
            superclass = Some(sup.to_string());
            rest = tail.trim_start();
        }

        let rest = rest.trim_start_matches(';').trim();
        let closes_inline = match rest {
            "" => false,
            "end" => true,
            _ => return Err(malformed()),
        };

        let doc = self.take_doc(comment);
        self.declarations.push(Declaration::OpenNamespace {
            name: name.to_string(),
            kind,
            superclass,
            doc,
            line,
        });
        if closes_inline {
            self.declarations.push(Declaration::CloseNamespace { line });
        } else {
            self.scopes.push(OpenScope {
                name: name.to_string(),
                line,
            });
        }
        Ok(())
    }

    fn close_namespace(&mut self, code: &str, line: u32) -> Result<()> {
        if code.trim_end_matches(';').trim() != "end" {
            return Err(ParseError::Malformed {
                text: code.to_string(),
                line,
            });
        }
        if self.scopes.pop().is_none() {
            return Err(ParseError::UnmatchedEnd { line });
        }
        self.pending_doc.clear();
        self.declarations.push(Declaration::CloseNamespace { line });
        Ok(())
    }

    fn define_method(&mut self, code: &str, comment: Option<&str>, line: u32) -> Result<()> {
        self.require_scope("def", line)?;
        let malformed = || ParseError::Malformed {
            text: code.to_string(),
            line,
        };

        let rest = code["def".len()..].trim_start();
        let (receiver, rest) = match rest.strip_prefix("self.") {
            Some(tail) => (ReceiverKind::Singleton, tail),
            None => (ReceiverKind::Instance, rest),
        };

        let name_end = rest
            .find(|c: char| c == '(' || c == ';' || c.is_whitespace())
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        if !is_method_name(name) {
            return Err(malformed());
        }

        let mut params = ParamList::new();
        let mut rest = rest[name_end..].trim_start();
        if rest.starts_with('(') {
            let close = find_closing_paren(rest).ok_or_else(malformed)?;
            params = parse_params(&rest[1..close], line)?;
            rest = rest[close + 1..].trim_start();
        }

        let rest = rest.trim_start_matches(';').trim();
        let closes_inline = match rest {
            "" => false,
            "end" => true,
            _ => return Err(malformed()),
        };

        let doc = self.take_doc(comment);
        self.declarations.push(Declaration::DefineMethod {
            name: name.to_string(),
            receiver,
            params,
            doc,
            line,
        });
        if !closes_inline {
            self.body_depth = 1;
            self.body_method = Some((name.to_string(), line));
        }
        Ok(())
    }

    fn define_alias(&mut self, code: &str, comment: Option<&str>, line: u32) -> Result<()> {
        self.require_scope("alias", line)?;
        let rest = code["alias".len()..].trim();
        let mut tokens = rest.split_whitespace();
        let (Some(new_name), Some(target), None) = (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(ParseError::Malformed {
                text: code.to_string(),
                line,
            });
        };
        let new_name = new_name.strip_prefix(':').unwrap_or(new_name);
        let target = target.strip_prefix(':').unwrap_or(target);
        if !is_method_name(new_name) || !is_method_name(target) {
            return Err(ParseError::Malformed {
                text: code.to_string(),
                line,
            });
        }

        let doc = self.take_doc(comment);
        self.declarations.push(Declaration::DefineAlias {
            new_name: new_name.to_string(),
            target: target.to_string(),
            doc,
            line,
        });
        Ok(())
    }

    fn record_mixin(&mut self, code: &str, keyword: &str, line: u32) -> Result<()> {
        self.require_scope(keyword, line)?;
        let name = code[keyword.len()..].trim();
        if !is_constant_path(name) {
            return Err(ParseError::Malformed {
                text: code.to_string(),
                line,
            });
        }
        self.pending_doc.clear();
        self.declarations.push(match keyword {
            "include" => Declaration::IncludeModule {
                name: name.to_string(),
                line,
            },
            _ => Declaration::ExtendModule {
                name: name.to_string(),
                line,
            },
        });
        Ok(())
    }

    fn define_attribute(
        &mut self,
        keyword: &str,
        code: &str,
        comment: Option<&str>,
        line: u32,
    ) -> Result<()> {
        self.require_scope(keyword, line)?;
        let (reader, writer) = match keyword {
            "attr_reader" => (true, false),
            "attr_writer" => (false, true),
            _ => (true, true),
        };
        let mut names = Vec::new();
        for piece in code[keyword.len()..].trim().split(',') {
            let piece = piece.trim();
            let name = piece.strip_prefix(':').unwrap_or_default();
            if !is_identifier(name) {
                return Err(ParseError::Malformed {
                    text: code.to_string(),
                    line,
                });
            }
            names.push(name.to_string());
        }
        let doc = self.take_doc(comment);
        self.declarations.push(Declaration::DefineAttribute {
            names,
            reader,
            writer,
            doc,
            line,
        });
        Ok(())
    }

    fn set_visibility(&mut self, keyword: &str, code: &str, line: u32) -> Result<()> {
        self.require_scope(keyword, line)?;
        // only the bare marker form appears in stubs
        if code != keyword {
            return Err(ParseError::Malformed {
                text: code.to_string(),
                line,
            });
        }
        self.pending_doc.clear();
        self.declarations.push(Declaration::SetVisibility {
            visibility: match keyword {
                "private" => Visibility::Private,
                _ => Visibility::Public,
            },
            line,
        });
        Ok(())
    }

    fn set_module_function(&mut self, code: &str, line: u32) -> Result<()> {
        self.require_scope("module_function", line)?;
        if code != "module_function" {
            return Err(ParseError::Malformed {
                text: code.to_string(),
                line,
            });
        }
        self.pending_doc.clear();
        self.declarations
            .push(Declaration::SetModuleFunctionMode { line });
        Ok(())
    }

    fn define_constant(&mut self, code: &str, comment: Option<&str>, line: u32) -> Result<()> {
        let malformed = || ParseError::Malformed {
            text: code.to_string(),
            line,
        };
        let Some(eq) = code.find('=') else {
            return Err(malformed());
        };
        let name = code[..eq].trim();
        if !is_constant_name(name) {
            return Err(malformed());
        }
        self.require_scope(name, line)?;
        let value_text = code[eq + 1..].trim();
        if value_text.is_empty() || value_text.starts_with('=') {
            return Err(malformed());
        }
        let value = if value_text == "_" {
            ConstantValue::Opaque
        } else {
            ConstantValue::Literal(value_text.to_string())
        };

        let doc = self.take_doc(comment);
        self.declarations.push(Declaration::DefineConstant {
            name: name.to_string(),
            value,
            doc,
            line,
        });
        Ok(())
    }

    fn require_scope(&self, keyword: &str, line: u32) -> Result<()> {
        if self.scopes.is_empty() {
            return Err(ParseError::OutsideNamespace {
                keyword: keyword.to_string(),
                line,
            });
        }
        Ok(())
    }

    /// Consume the pending doc block, appending any trailing inline comment.
    fn take_doc(&mut self, inline: Option<&str>) -> Option<String> {
        let mut parts = std::mem::take(&mut self.pending_doc);
        if let Some(text) = inline
            && !text.is_empty()
        {
            parts.push(text.to_string());
        }
        while parts.first().is_some_and(|s| s.is_empty()) {
            parts.remove(0);
        }
        while parts.last().is_some_and(|s| s.is_empty()) {
            parts.pop();
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    }
}

fn opens_block(code: &str) -> bool {
    let first = code.split_whitespace().next().unwrap_or("");
    matches!(
        first,
        "def" | "if" | "unless" | "while" | "until" | "case" | "begin" | "class" | "module" | "for"
    ) || code.ends_with(" do")
        || code.contains(" do |")
}
