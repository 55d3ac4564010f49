//! Composable boolean filter trees rendered to WHERE fragments.
//!
//! A [`Specification`] is an ordered list of nodes, each tagged with the
//! connector (`AND`/`OR`) that joins it to the nodes before it. Nodes are
//! predicates, nested specifications or raw SQL fragments:
//!
//! ```
//! use folio_data::{Predicate, Specification, Value};
//!
//! let mut pending = Specification::new();
//! pending.add_and(Predicate::equals("waitingFor", Value::Null));
//!
//! let mut spec = Specification::new();
//! spec.add_and(("waitingFor", 0)).add_or(pending);
//!
//! assert_eq!(spec.render(), "waitingFor = 0 OR (waitingFor is null)");
//! ```
//!
//! Rendering is a pure function of the tree: it can be repeated any number
//! of times and from any thread once construction is finished.

use serde::{Deserialize, Serialize};

use crate::field::{ColumnMapper, FieldPath};
use crate::operator::Connector;
use crate::predicate::Predicate;
use crate::query::Dialect;
use crate::render::{BoundFragment, Renderer};
use crate::value::Value;

/// Fragment rendered by [`Specification::always_true`].
pub const TAUTOLOGY: &str = "1=1";

/// A SQL fragment inserted verbatim.
///
/// Nothing inside is escaped or validated. Values interpolated into a raw
/// fragment are the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFragment {
    sql: String,
    #[serde(default)]
    connector: Connector,
}

impl RawFragment {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn connector(&self) -> Connector {
        self.connector
    }
}

/// A node of a specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Predicate(Predicate),
    Specification(Specification),
    Raw(RawFragment),
}

impl Criterion {
    /// A raw SQL fragment. See [`RawFragment`].
    pub fn raw(sql: impl Into<String>) -> Self {
        Criterion::Raw(RawFragment {
            sql: sql.into(),
            connector: Connector::And,
        })
    }

    /// Connector joining this node to its preceding siblings.
    pub fn connector(&self) -> Connector {
        match self {
            Criterion::Predicate(p) => p.connector(),
            Criterion::Specification(s) => s.parent_connector.unwrap_or_default(),
            Criterion::Raw(r) => r.connector,
        }
    }

    fn with_connector(self, connector: Connector) -> Self {
        match self {
            Criterion::Predicate(p) => Criterion::Predicate(p.with_connector(connector)),
            Criterion::Specification(mut s) => {
                s.parent_connector = Some(connector);
                Criterion::Specification(s)
            }
            Criterion::Raw(mut r) => {
                r.connector = connector;
                Criterion::Raw(r)
            }
        }
    }

    /// Rendered body without the connector. `None` for nodes that render
    /// to nothing (empty nested specifications, blank raw fragments).
    fn render_body(&self, r: &mut Renderer<'_>) -> Option<String> {
        match self {
            Criterion::Predicate(p) => Some(p.render_with(r)),
            Criterion::Specification(s) => {
                let inner = s.render_nodes(r);
                (!inner.is_empty()).then(|| format!("({inner})"))
            }
            Criterion::Raw(raw) => {
                let sql = raw.sql.trim();
                (!sql.is_empty()).then(|| sql.to_string())
            }
        }
    }
}

impl From<Predicate> for Criterion {
    fn from(p: Predicate) -> Self {
        Criterion::Predicate(p)
    }
}

impl From<Specification> for Criterion {
    fn from(s: Specification) -> Self {
        Criterion::Specification(s)
    }
}

impl From<&str> for Criterion {
    fn from(sql: &str) -> Self {
        Criterion::raw(sql)
    }
}

impl From<String> for Criterion {
    fn from(sql: String) -> Self {
        Criterion::raw(sql)
    }
}

/// `(field, value)` shorthand for an equality predicate. A list value
/// always means membership (`in`), never equality with an array.
impl<F, V> From<(F, V)> for Criterion
where
    F: Into<FieldPath>,
    V: Into<Value>,
{
    fn from((field, value): (F, V)) -> Self {
        Criterion::Predicate(Predicate::equals(field, value))
    }
}

/// A boolean tree of filter criteria.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Specification {
    nodes: Vec<Criterion>,
    /// Set only when nested inside another specification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_connector: Option<Connector>,
    #[serde(default)]
    default_connector: Connector,
}

impl Specification {
    pub fn new() -> Self {
        Self::default()
    }

    /// A specification that filters nothing out. Renders to `1=1`.
    ///
    /// Each call returns a fresh value.
    pub fn always_true() -> Self {
        let mut spec = Self::new();
        spec.add_and(TAUTOLOGY);
        spec
    }

    /// Append a node joined with `AND`.
    ///
    /// A nested specification is kept as a single parenthesized node; its
    /// own nodes are not merged into this one.
    pub fn add_and(&mut self, criterion: impl Into<Criterion>) -> &mut Self {
        self.push(Connector::And, criterion.into())
    }

    /// Append a node joined with `OR`.
    pub fn add_or(&mut self, criterion: impl Into<Criterion>) -> &mut Self {
        self.push(Connector::Or, criterion.into())
    }

    /// Append a node joined with the given connector.
    pub fn add(&mut self, connector: Connector, criterion: impl Into<Criterion>) -> &mut Self {
        self.push(connector, criterion.into())
    }

    /// By-value form of [`add_and`](Self::add_and) for fluent construction.
    pub fn and(mut self, criterion: impl Into<Criterion>) -> Self {
        self.add_and(criterion);
        self
    }

    /// By-value form of [`add_or`](Self::add_or) for fluent construction.
    pub fn or(mut self, criterion: impl Into<Criterion>) -> Self {
        self.add_or(criterion);
        self
    }

    /// Add `field = value` using the current default connector.
    ///
    /// Order-sensitive: the connector is captured now, so a later
    /// [`set_default_connector`](Self::set_default_connector) does not
    /// affect predicates already assigned.
    pub fn assign(&mut self, field: impl Into<FieldPath>, value: impl Into<Value>) -> &mut Self {
        let connector = self.default_connector;
        self.push(connector, Predicate::equals(field, value).into())
    }

    /// Change the connector used by [`assign`](Self::assign) from now on.
    ///
    /// Predicates assigned before the switch keep their connector, so
    /// switching mid-construction mixes `AND` and `OR` in insertion order.
    pub fn set_default_connector(&mut self, connector: Connector) -> &mut Self {
        self.default_connector = connector;
        self
    }

    pub fn default_connector(&self) -> Connector {
        self.default_connector
    }

    /// Connector this specification was nested with; `None` at the root.
    pub fn parent_connector(&self) -> Option<Connector> {
        self.parent_connector
    }

    pub fn nodes(&self) -> &[Criterion] {
        &self.nodes
    }

    /// Top-level predicates, for adjusting values before rendering.
    pub fn predicates_mut(&mut self) -> impl Iterator<Item = &mut Predicate> {
        self.nodes.iter_mut().filter_map(|node| match node {
            Criterion::Predicate(p) => Some(p),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether any predicate, at any depth, targets a qualified column.
    ///
    /// Query executors use this to decide whether associated tables must be
    /// joined. Raw fragments are opaque and never count.
    pub fn requires_join(&self) -> bool {
        self.nodes.iter().any(|node| match node {
            Criterion::Predicate(p) => p.path().is_qualified(),
            Criterion::Specification(s) => s.requires_join(),
            Criterion::Raw(_) => false,
        })
    }

    /// Every predicate path at any depth, in rendering order.
    ///
    /// Raw fragments are opaque and contribute nothing.
    pub fn field_paths(&self) -> Vec<&FieldPath> {
        let mut paths = Vec::new();
        self.collect_paths(&mut paths);
        paths
    }

    fn collect_paths<'s>(&'s self, paths: &mut Vec<&'s FieldPath>) {
        for node in &self.nodes {
            match node {
                Criterion::Predicate(p) => paths.push(p.path()),
                Criterion::Specification(s) => s.collect_paths(paths),
                Criterion::Raw(_) => {}
            }
        }
    }

    /// Render with inline literals and logical column names.
    ///
    /// An empty specification renders to the empty string.
    pub fn render(&self) -> String {
        let sql = self.render_nodes(&mut Renderer::inline(None));
        tracing::trace!(fragment = %sql, "rendered specification");
        sql
    }

    /// Render with inline literals, translating columns through `mapper`.
    pub fn render_mapped(&self, mapper: &dyn ColumnMapper) -> String {
        let sql = self.render_nodes(&mut Renderer::inline(Some(mapper)));
        tracing::trace!(fragment = %sql, "rendered specification");
        sql
    }

    /// Render with placeholders in the style of `dialect`, numbered from 1.
    ///
    /// `null` comparisons stay literal; every other value is returned in
    /// placeholder order.
    pub fn render_bound(&self, dialect: Dialect, mapper: Option<&dyn ColumnMapper>) -> BoundFragment {
        self.render_in(Renderer::bound(dialect, 1, mapper))
    }

    /// Render through a prepared renderer and collect its parameters.
    pub(crate) fn render_in(&self, mut renderer: Renderer<'_>) -> BoundFragment {
        let sql = self.render_nodes(&mut renderer);
        let bound = renderer.finish(sql);
        tracing::trace!(
            fragment = %bound.sql,
            params = bound.params.len(),
            "rendered bound specification"
        );
        bound
    }

    /// Render, or `1=1` when nothing would be rendered.
    pub fn render_or_true(&self) -> String {
        let sql = self.render();
        if sql.is_empty() {
            TAUTOLOGY.to_string()
        } else {
            sql
        }
    }

    fn push(&mut self, connector: Connector, criterion: Criterion) -> &mut Self {
        self.nodes.push(criterion.with_connector(connector));
        self
    }

    fn render_nodes(&self, r: &mut Renderer<'_>) -> String {
        let parts: Vec<String> = self
            .nodes
            .iter()
            .filter_map(|node| {
                node.render_body(r)
                    .map(|body| format!("{} {body}", node.connector()))
            })
            .collect();
        strip_leading_connector(parts.join(" "))
    }
}

/// The first node's connector has nothing to join to.
fn strip_leading_connector(sql: String) -> String {
    for connector in [Connector::And, Connector::Or] {
        if let Some(rest) = sql.strip_prefix(connector.as_sql()) {
            if let Some(rest) = rest.strip_prefix(' ') {
                return rest.to_string();
            }
        }
    }
    sql
}
