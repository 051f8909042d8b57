//! metadata::loader
//!
//! JSON-LD expansion into a [`TripleStore`].
//!
//! # Supported Constructs
//!
//! The loader implements the part of JSON-LD expansion that software
//! metadata documents (schema.org, CodeMeta, maSMP) use:
//!
//! - `@context` as an object, an array of objects, or the schema.org URL;
//!   prefix definitions, term definitions (`@id`, `@type`), `@vocab`
//! - `@graph`, `@id`, `@type`, nested node objects and arrays
//! - value objects (`@value` with `@type` or `@language`)
//! - `@set` and `@list` (members become individual objects)
//! - compact IRIs (`schema:name`) and absolute IRIs
//!
//! Every document starts from a context that maps `schema` to
//! `https://schema.org/`. Remote contexts are never fetched.
//!
//! Properties are expanded in document order, and a nested node's triples
//! are emitted before the triple that links to it. `@context`, `@id` and
//! `@type` are read first wherever they appear in the object.
//!
//! # Example
//!
//! ```
//! use smp_submitter::metadata::loader::parse_json_ld;
//!
//! let store = parse_json_ld(r#"{
//!     "@context": {"schema": "https://schema.org/"},
//!     "@type": "schema:SoftwareSourceCode",
//!     "schema:name": "widgets"
//! }"#).unwrap();
//! assert_eq!(store.len(), 2);
//! ```

use std::collections::HashMap;

use oxrdf::vocab::{rdf, xsd};
use oxrdf::{BlankNode, Literal, NamedNode, Term, Triple};
use serde_json::{Map, Value};

use super::store::TripleStore;
use super::MetadataError;

/// Namespace IRI of schema.org.
pub const SCHEMA_NS: &str = "https://schema.org/";

/// Prefixes every document can use without declaring them.
pub const KNOWN_PREFIXES: &[(&str, &str)] = &[("schema", SCHEMA_NS)];

/// The only `@context` URL accepted without an inline definition.
pub const SUPPORTED_REMOTE_CONTEXT: &str = "https://schema.org/";

/// Parse a JSON-LD document into a triple store.
///
/// # Errors
///
/// Returns [`MetadataError::Parse`] if the text is not JSON or not a valid
/// JSON-LD structure.
pub fn parse_json_ld(text: &str) -> Result<TripleStore, MetadataError> {
    let value: Value = serde_json::from_str(text).map_err(|e| MetadataError::Parse(e.to_string()))?;

    let mut expander = Expander::default();
    let context = Context::with_known_prefixes();

    match &value {
        Value::Object(obj) => {
            expander.node(obj, &context)?;
        }
        Value::Array(items) => expander.top_level_items(items, &context)?,
        other => {
            return Err(MetadataError::Parse(format!(
                "expected a JSON object or array at top level, found {}",
                json_kind(other)
            )));
        }
    }

    Ok(expander.store)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn parse_error(message: impl Into<String>) -> MetadataError {
    MetadataError::Parse(message.into())
}

// --------------------------------------------------------------------------
// Active context
// --------------------------------------------------------------------------

/// How string values of a term are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Coercion {
    /// Plain string literal
    None,
    /// IRI or compact IRI (`"@type": "@id"`)
    Id,
    /// Vocabulary-relative IRI (`"@type": "@vocab"`)
    Vocab,
    /// Typed literal with the given datatype
    Datatype(String),
}

#[derive(Debug, Clone)]
struct TermDefinition {
    iri: String,
    coercion: Coercion,
}

#[derive(Debug, Clone, Default)]
struct Context {
    vocab: Option<String>,
    /// `None` marks a term explicitly mapped to null.
    terms: HashMap<String, Option<TermDefinition>>,
}

impl Context {
    fn with_known_prefixes() -> Self {
        let mut context = Context::default();
        for (prefix, iri) in KNOWN_PREFIXES {
            context.terms.insert(
                prefix.to_string(),
                Some(TermDefinition {
                    iri: iri.to_string(),
                    coercion: Coercion::None,
                }),
            );
        }
        context
    }

    /// Apply a local `@context` value, producing the new active context.
    fn merged(&self, local: &Value) -> Result<Context, MetadataError> {
        match local {
            Value::Null => Ok(Context::with_known_prefixes()),
            Value::String(url) => {
                if is_schema_org_context(url) {
                    let mut context = self.clone();
                    context.vocab = Some(SCHEMA_NS.to_string());
                    Ok(context)
                } else {
                    Err(parse_error(format!(
                        "remote context '{}' is not supported; use {} or an inline @context object",
                        url, SUPPORTED_REMOTE_CONTEXT
                    )))
                }
            }
            Value::Array(items) => {
                let mut context = self.clone();
                for item in items {
                    context = context.merged(item)?;
                }
                Ok(context)
            }
            Value::Object(definitions) => {
                let mut context = self.clone();
                context.define_all(definitions)?;
                Ok(context)
            }
            other => Err(parse_error(format!(
                "@context must be an object, array or string, found {}",
                json_kind(other)
            ))),
        }
    }

    fn define_all(&mut self, definitions: &Map<String, Value>) -> Result<(), MetadataError> {
        if let Some(vocab) = definitions.get("@vocab") {
            self.vocab = match vocab {
                Value::Null => None,
                Value::String(v) => Some(self.expand_iri(v, true).unwrap_or_else(|| v.clone())),
                other => {
                    return Err(parse_error(format!(
                        "@vocab must be a string or null, found {}",
                        json_kind(other)
                    )))
                }
            };
        }

        // Second pass lets a term use a prefix declared after it.
        for _ in 0..2 {
            for (term, definition) in definitions {
                if term.starts_with('@') {
                    continue;
                }
                let parsed = self.term_definition(term, definition)?;
                self.terms.insert(term.clone(), parsed);
            }
        }
        Ok(())
    }

    fn term_definition(
        &self,
        term: &str,
        definition: &Value,
    ) -> Result<Option<TermDefinition>, MetadataError> {
        match definition {
            Value::Null => Ok(None),
            Value::String(iri) => Ok(self
                .expand_iri(iri, true)
                .map(|iri| TermDefinition {
                    iri,
                    coercion: Coercion::None,
                })),
            Value::Object(expanded) => {
                if expanded.contains_key("@reverse") {
                    return Ok(None);
                }

                let iri = match expanded.get("@id") {
                    Some(Value::String(id)) => self.expand_iri(id, true),
                    Some(Value::Null) => return Ok(None),
                    Some(other) => {
                        return Err(parse_error(format!(
                            "@id of term '{}' must be a string, found {}",
                            term,
                            json_kind(other)
                        )))
                    }
                    None => self.expand_undefined_term(term),
                };

                let coercion = match expanded.get("@type") {
                    None | Some(Value::Null) => Coercion::None,
                    Some(Value::String(t)) if t == "@id" => Coercion::Id,
                    Some(Value::String(t)) if t == "@vocab" => Coercion::Vocab,
                    Some(Value::String(t)) => Coercion::Datatype(
                        self.expand_iri(t, true).unwrap_or_else(|| t.clone()),
                    ),
                    Some(other) => {
                        return Err(parse_error(format!(
                            "@type of term '{}' must be a string, found {}",
                            term,
                            json_kind(other)
                        )))
                    }
                };

                Ok(iri.map(|iri| TermDefinition { iri, coercion }))
            }
            other => Err(parse_error(format!(
                "invalid definition for term '{}': {}",
                term,
                json_kind(other)
            ))),
        }
    }

    /// Expand a term that has no `@id` in its definition.
    fn expand_undefined_term(&self, term: &str) -> Option<String> {
        if term.contains(':') {
            self.expand_compact(term)
        } else {
            self.vocab.as_ref().map(|v| format!("{}{}", v, term))
        }
    }

    fn definition(&self, term: &str) -> Option<&TermDefinition> {
        self.terms.get(term).and_then(|d| d.as_ref())
    }

    /// Expand a compact or absolute IRI (`prefix:suffix`, `https://...`).
    fn expand_compact(&self, value: &str) -> Option<String> {
        let (prefix, suffix) = value.split_once(':')?;
        if prefix == "_" || suffix.starts_with("//") {
            return Some(value.to_string());
        }
        match self.terms.get(prefix) {
            Some(Some(def)) => Some(format!("{}{}", def.iri, suffix)),
            Some(None) => None,
            None => Some(value.to_string()),
        }
    }

    /// Expand a string to an IRI.
    ///
    /// With `vocab` set, terms and `@vocab` are consulted (keys, `@type`
    /// values); otherwise only compact and absolute IRIs expand (`@id`
    /// values). Returns `None` for values that expand to nothing.
    fn expand_iri(&self, value: &str, vocab: bool) -> Option<String> {
        if value.starts_with('@') {
            return None;
        }
        if vocab {
            if let Some(entry) = self.terms.get(value) {
                return entry.as_ref().map(|d| d.iri.clone());
            }
        }
        if value.contains(':') {
            return self.expand_compact(value);
        }
        if vocab {
            return self.vocab.as_ref().map(|v| format!("{}{}", v, value));
        }
        None
    }
}

fn is_schema_org_context(url: &str) -> bool {
    let trimmed = url.trim_end_matches('/');
    matches!(trimmed, "https://schema.org" | "http://schema.org")
}

// --------------------------------------------------------------------------
// Expansion
// --------------------------------------------------------------------------

/// Subject of emitted triples.
#[derive(Debug, Clone)]
enum Node {
    Named(NamedNode),
    Blank(BlankNode),
}

impl Node {
    fn into_term(self) -> Term {
        match self {
            Node::Named(n) => Term::NamedNode(n),
            Node::Blank(b) => Term::BlankNode(b),
        }
    }
}

#[derive(Debug, Default)]
struct Expander {
    store: TripleStore,
    /// Blank node labels (`_:x`) and relative `@id`s seen so far.
    labels: HashMap<String, BlankNode>,
}

impl Expander {
    fn emit(&mut self, subject: &Node, predicate: NamedNode, object: Term) {
        let triple = match subject {
            Node::Named(n) => Triple::new(n.clone(), predicate, object),
            Node::Blank(b) => Triple::new(b.clone(), predicate, object),
        };
        self.store.insert(triple);
    }

    fn top_level_items(&mut self, items: &[Value], context: &Context) -> Result<(), MetadataError> {
        for item in items {
            match item {
                Value::Object(obj) => {
                    self.node(obj, context)?;
                }
                Value::Array(nested) => self.top_level_items(nested, context)?,
                Value::Null => {}
                other => {
                    return Err(parse_error(format!(
                        "expected node objects in top-level array, found {}",
                        json_kind(other)
                    )))
                }
            }
        }
        Ok(())
    }

    /// Resolve an `@id` (or an `@id`-coerced value) to a node.
    fn node_ref(&mut self, id: &str, context: &Context) -> Result<Node, MetadataError> {
        if let Some(label) = id.strip_prefix("_:") {
            return Ok(Node::Blank(self.labelled_blank(&format!("_:{}", label))));
        }
        match context.expand_iri(id, false) {
            Some(iri) => NamedNode::new(iri.as_str())
                .map(Node::Named)
                .map_err(|e| parse_error(format!("invalid IRI '{}': {}", iri, e))),
            // No base IRI is available, so relative references stay local.
            None => Ok(Node::Blank(self.labelled_blank(id))),
        }
    }

    fn labelled_blank(&mut self, label: &str) -> BlankNode {
        self.labels
            .entry(label.to_string())
            .or_default()
            .clone()
    }

    fn vocab_iri(&self, value: &str, context: &Context) -> Result<Option<NamedNode>, MetadataError> {
        match context.expand_iri(value, true) {
            Some(iri) if !iri.starts_with("_:") => NamedNode::new(iri.as_str())
                .map(Some)
                .map_err(|e| parse_error(format!("invalid IRI '{}': {}", iri, e))),
            _ => Ok(None),
        }
    }

    /// Expand a node object, emitting its triples. Returns its subject.
    fn node(&mut self, obj: &Map<String, Value>, parent: &Context) -> Result<Node, MetadataError> {
        let context = match obj.get("@context") {
            Some(local) => parent.merged(local)?,
            None => parent.clone(),
        };

        let subject = match obj.get("@id") {
            Some(Value::String(id)) => self.node_ref(id, &context)?,
            Some(other) => {
                return Err(parse_error(format!(
                    "@id must be a string, found {}",
                    json_kind(other)
                )))
            }
            None => Node::Blank(BlankNode::default()),
        };

        if let Some(graph) = obj.get("@graph") {
            match graph {
                Value::Object(inner) => {
                    self.node(inner, &context)?;
                }
                Value::Array(items) => self.top_level_items(items, &context)?,
                Value::Null => {}
                other => {
                    return Err(parse_error(format!(
                        "@graph must be an object or array, found {}",
                        json_kind(other)
                    )))
                }
            }
        }

        if let Some(types) = obj.get("@type") {
            let names: Vec<&str> = match types {
                Value::String(t) => vec![t.as_str()],
                Value::Array(items) => items
                    .iter()
                    .map(|t| {
                        t.as_str()
                            .ok_or_else(|| parse_error("@type values must be strings"))
                    })
                    .collect::<Result<_, _>>()?,
                other => {
                    return Err(parse_error(format!(
                        "@type must be a string or array, found {}",
                        json_kind(other)
                    )))
                }
            };
            for name in names {
                if let Some(class) = self.vocab_iri(name, &context)? {
                    self.emit(&subject, rdf::TYPE.into_owned(), Term::NamedNode(class));
                }
            }
        }

        for (key, value) in obj {
            if key.starts_with('@') {
                continue;
            }
            let Some(predicate) = self.vocab_iri(key, &context)? else {
                continue;
            };
            let coercion = context
                .definition(key)
                .map(|d| d.coercion.clone())
                .unwrap_or(Coercion::None);

            let mut objects = Vec::new();
            self.values(value, &coercion, &context, &mut objects)?;
            for object in objects {
                self.emit(&subject, predicate.clone(), object);
            }
        }

        Ok(subject)
    }

    /// Expand a property value into object terms.
    fn values(
        &mut self,
        value: &Value,
        coercion: &Coercion,
        context: &Context,
        out: &mut Vec<Term>,
    ) -> Result<(), MetadataError> {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    self.values(item, coercion, context, out)?;
                }
            }
            Value::String(s) => out.push(self.string_value(s, coercion, context)?),
            Value::Bool(_) | Value::Number(_) => out.push(scalar_literal(value, None)?),
            Value::Object(obj) => {
                if let Some(inner) = obj.get("@value") {
                    if let Some(literal) = self.value_object(inner, obj, context)? {
                        out.push(literal);
                    }
                } else if let Some(inner) = obj.get("@list").or_else(|| obj.get("@set")) {
                    self.values(inner, coercion, context, out)?;
                } else {
                    let node = self.node(obj, context)?;
                    out.push(node.into_term());
                }
            }
        }
        Ok(())
    }

    fn string_value(
        &mut self,
        s: &str,
        coercion: &Coercion,
        context: &Context,
    ) -> Result<Term, MetadataError> {
        match coercion {
            Coercion::None => Ok(Literal::new_simple_literal(s).into()),
            Coercion::Id => Ok(self.node_ref(s, context)?.into_term()),
            Coercion::Vocab => match self.vocab_iri(s, context)? {
                Some(iri) => Ok(Term::NamedNode(iri)),
                None => Ok(self.node_ref(s, context)?.into_term()),
            },
            Coercion::Datatype(datatype) => {
                let datatype = NamedNode::new(datatype.as_str())
                    .map_err(|e| parse_error(format!("invalid datatype '{}': {}", datatype, e)))?;
                Ok(Literal::new_typed_literal(s, datatype).into())
            }
        }
    }

    fn value_object(
        &self,
        inner: &Value,
        obj: &Map<String, Value>,
        context: &Context,
    ) -> Result<Option<Term>, MetadataError> {
        if inner.is_null() {
            return Ok(None);
        }

        if let Some(datatype) = obj.get("@type") {
            let datatype = datatype
                .as_str()
                .ok_or_else(|| parse_error("@type in a value object must be a string"))?;
            let iri = context.expand_iri(datatype, true).unwrap_or_else(|| datatype.to_string());
            let datatype = NamedNode::new(iri.as_str())
                .map_err(|e| parse_error(format!("invalid datatype '{}': {}", iri, e)))?;
            let lexical = lexical_form(inner)?;
            return Ok(Some(Literal::new_typed_literal(lexical, datatype).into()));
        }

        if let Some(language) = obj.get("@language").and_then(Value::as_str) {
            let lexical = inner
                .as_str()
                .ok_or_else(|| parse_error("@value with @language must be a string"))?;
            let literal = Literal::new_language_tagged_literal(lexical, language)
                .map_err(|e| parse_error(format!("invalid language tag '{}': {}", language, e)))?;
            return Ok(Some(literal.into()));
        }

        match inner {
            Value::String(s) => Ok(Some(Literal::new_simple_literal(s.as_str()).into())),
            Value::Bool(_) | Value::Number(_) => Ok(Some(scalar_literal(inner, None)?)),
            other => Err(parse_error(format!(
                "@value must be a scalar, found {}",
                json_kind(other)
            ))),
        }
    }
}

fn lexical_form(value: &Value) -> Result<String, MetadataError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(parse_error(format!(
            "@value must be a scalar, found {}",
            json_kind(other)
        ))),
    }
}

/// Typed literal for a JSON boolean or number.
fn scalar_literal(value: &Value, datatype: Option<NamedNode>) -> Result<Term, MetadataError> {
    let lexical = lexical_form(value)?;
    let datatype = match (datatype, value) {
        (Some(dt), _) => dt,
        (None, Value::Bool(_)) => xsd::BOOLEAN.into_owned(),
        (None, Value::Number(n)) if n.is_i64() || n.is_u64() => xsd::INTEGER.into_owned(),
        (None, _) => xsd::DOUBLE.into_owned(),
    };
    Ok(Literal::new_typed_literal(lexical, datatype).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::NamedNodeRef;

    const CODE_REPOSITORY: &str = "https://schema.org/codeRepository";

    fn objects(store: &TripleStore, predicate: &str) -> Vec<Term> {
        store
            .objects_for_predicate(NamedNodeRef::new(predicate).unwrap())
            .into_iter()
            .cloned()
            .collect()
    }

    fn literal(value: &str) -> Term {
        Literal::new_simple_literal(value).into()
    }

    fn named(value: &str) -> Term {
        NamedNode::new(value).unwrap().into()
    }

    #[test]
    fn compact_iri_with_declared_prefix() {
        let store = parse_json_ld(
            r#"{"@context":{"schema":"https://schema.org/"},
                "schema:codeRepository":"https://github.com/acme/widgets"}"#,
        )
        .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(
            objects(&store, CODE_REPOSITORY),
            vec![literal("https://github.com/acme/widgets")]
        );
    }

    #[test]
    fn known_prefix_without_context() {
        let store =
            parse_json_ld(r#"{"schema:codeRepository":"https://github.com/a/b"}"#).unwrap();
        assert_eq!(objects(&store, CODE_REPOSITORY).len(), 1);
    }

    #[test]
    fn vocab_and_term_coercion() {
        let store = parse_json_ld(
            r#"{
                "@context": {
                    "@vocab": "https://schema.org/",
                    "codeRepository": {"@type": "@id"}
                },
                "@type": "SoftwareSourceCode",
                "name": "widgets",
                "codeRepository": "https://github.com/acme/widgets"
            }"#,
        )
        .unwrap();

        assert_eq!(
            objects(&store, CODE_REPOSITORY),
            vec![named("https://github.com/acme/widgets")]
        );
        assert_eq!(
            objects(&store, "https://schema.org/name"),
            vec![literal("widgets")]
        );
        assert_eq!(
            objects(&store, rdf::TYPE.as_str()),
            vec![named("https://schema.org/SoftwareSourceCode")]
        );
    }

    #[test]
    fn schema_org_string_context() {
        let store = parse_json_ld(
            r#"{"@context":"https://schema.org/","codeRepository":"https://github.com/a/b"}"#,
        )
        .unwrap();
        assert_eq!(
            objects(&store, CODE_REPOSITORY),
            vec![literal("https://github.com/a/b")]
        );
    }

    #[test]
    fn remote_context_is_rejected() {
        let err = parse_json_ld(r#"{"@context":"https://w3id.org/codemeta/3.0"}"#).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("remote context 'https://w3id.org/codemeta/3.0'"));
        assert!(message.contains(SUPPORTED_REMOTE_CONTEXT));
        assert!(message.contains("inline @context"));
    }

    #[test]
    fn properties_follow_document_order() {
        let store = parse_json_ld(
            r#"{
                "@context": {"@vocab": "https://schema.org/", "schema": "https://schema.org/"},
                "schema:codeRepository": "https://github.com/a/first",
                "codeRepository": "https://github.com/b/second"
            }"#,
        )
        .unwrap();

        assert_eq!(
            objects(&store, CODE_REPOSITORY),
            vec![
                literal("https://github.com/a/first"),
                literal("https://github.com/b/second"),
            ]
        );
    }

    #[test]
    fn nested_triples_precede_their_parent_link() {
        let store = parse_json_ld(
            r#"{
                "schema:targetProduct": {"schema:codeRepository": "https://github.com/z/first"},
                "schema:codeRepository": "https://github.com/a/second"
            }"#,
        )
        .unwrap();

        assert_eq!(
            objects(&store, CODE_REPOSITORY),
            vec![
                literal("https://github.com/z/first"),
                literal("https://github.com/a/second"),
            ]
        );
        let predicates: Vec<&str> = store.iter().map(|t| t.predicate.as_str()).collect();
        assert_eq!(
            predicates,
            vec![
                CODE_REPOSITORY,
                "https://schema.org/targetProduct",
                CODE_REPOSITORY,
            ]
        );
    }

    #[test]
    fn keywords_apply_wherever_they_appear() {
        let store = parse_json_ld(
            r#"{
                "codeRepository": "https://github.com/acme/widgets",
                "@type": "SoftwareSourceCode",
                "@id": "https://example.org/widgets",
                "@context": {"@vocab": "https://schema.org/"}
            }"#,
        )
        .unwrap();

        assert_eq!(store.len(), 2);
        assert!(store
            .iter()
            .all(|t| t.subject.to_string() == "<https://example.org/widgets>"));
        assert_eq!(
            objects(&store, CODE_REPOSITORY),
            vec![literal("https://github.com/acme/widgets")]
        );
    }

    #[test]
    fn term_may_use_prefix_declared_later() {
        let store = parse_json_ld(
            r#"{
                "@context": {
                    "repo": {"@id": "s:codeRepository", "@type": "@id"},
                    "s": "https://schema.org/"
                },
                "repo": "https://github.com/acme/widgets"
            }"#,
        )
        .unwrap();

        assert_eq!(
            objects(&store, CODE_REPOSITORY),
            vec![named("https://github.com/acme/widgets")]
        );
    }

    #[test]
    fn graph_and_nested_nodes() {
        let store = parse_json_ld(
            r#"{
                "@context": {"schema": "https://schema.org/"},
                "@graph": [
                    {
                        "@id": "https://example.org/software",
                        "schema:author": {"@id": "_:alice", "schema:name": "Alice"},
                        "schema:codeRepository": {"@id": "https://github.com/acme/widgets"}
                    },
                    {"@id": "_:alice", "schema:email": "alice@example.org"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            objects(&store, CODE_REPOSITORY),
            vec![named("https://github.com/acme/widgets")]
        );

        // Both mentions of _:alice describe the same node
        let subjects: std::collections::HashSet<String> = store
            .iter()
            .filter(|t| {
                t.predicate.as_str() == "https://schema.org/name"
                    || t.predicate.as_str() == "https://schema.org/email"
            })
            .map(|t| t.subject.to_string())
            .collect();
        assert_eq!(subjects.len(), 1);
    }

    #[test]
    fn arrays_lists_and_value_objects() {
        let store = parse_json_ld(
            r#"{
                "@context": {"schema": "https://schema.org/"},
                "schema:codeRepository": [
                    "https://gitlab.com/acme/widgets",
                    {"@value": "https://github.com/acme/widgets"},
                    {"@list": ["https://github.com/acme/other"]},
                    null
                ],
                "schema:description": {"@value": "Widgets", "@language": "en"},
                "schema:version": 3,
                "schema:isAccessibleForFree": true
            }"#,
        )
        .unwrap();

        assert_eq!(
            objects(&store, CODE_REPOSITORY),
            vec![
                literal("https://gitlab.com/acme/widgets"),
                literal("https://github.com/acme/widgets"),
                literal("https://github.com/acme/other"),
            ]
        );

        let version = objects(&store, "https://schema.org/version");
        assert_eq!(
            version,
            vec![Term::from(Literal::new_typed_literal("3", xsd::INTEGER))]
        );

        let free = objects(&store, "https://schema.org/isAccessibleForFree");
        assert_eq!(
            free,
            vec![Term::from(Literal::new_typed_literal("true", xsd::BOOLEAN))]
        );

        let description = objects(&store, "https://schema.org/description");
        assert_eq!(
            description,
            vec![Term::from(
                Literal::new_language_tagged_literal("Widgets", "en").unwrap()
            )]
        );
    }

    #[test]
    fn unmapped_terms_are_dropped() {
        let store = parse_json_ld(r#"{"name": "widgets", "codeRepository": "x"}"#).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn null_term_definition_drops_property() {
        let store = parse_json_ld(
            r#"{"@context":{"@vocab":"https://schema.org/","name":null},"name":"w","url":"u"}"#,
        )
        .unwrap();
        assert_eq!(store.len(), 1);
        assert!(objects(&store, "https://schema.org/name").is_empty());
    }

    #[test]
    fn top_level_array() {
        let store = parse_json_ld(
            r#"[
                {"schema:codeRepository": "https://github.com/a/b"},
                {"schema:codeRepository": "https://github.com/c/d"}
            ]"#,
        )
        .unwrap();
        assert_eq!(objects(&store, CODE_REPOSITORY).len(), 2);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        for input in [
            "",
            "{",
            r#"{"schema:codeRepository": "https://github.com/a/b""#,
            r#"{"a": [1, 2}"#,
            "not json",
        ] {
            assert!(
                matches!(parse_json_ld(input), Err(MetadataError::Parse(_))),
                "expected parse error for {:?}",
                input
            );
        }
    }

    #[test]
    fn structural_errors_are_parse_errors() {
        for input in [
            "42",
            r#""just a string""#,
            r#"{"@id": 5}"#,
            r#"{"@context": 5}"#,
            r#"{"@type": {"a": 1}}"#,
            r#"[1, 2]"#,
            r#"{"@context": {"schema": "https://schema.org/"}, "schema:x": {"@value": [1]}}"#,
        ] {
            assert!(
                matches!(parse_json_ld(input), Err(MetadataError::Parse(_))),
                "expected parse error for {:?}",
                input
            );
        }
    }

    #[test]
    fn invalid_iri_is_a_parse_error() {
        let result = parse_json_ld(r#"{"@id": "https://exa mple.org/x", "schema:name": "w"}"#);
        assert!(matches!(result, Err(MetadataError::Parse(_))));
    }
}
