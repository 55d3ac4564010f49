//! Declarative filtering, sorting and pagination for SQL-backed listings.
//!
//! Build a [`Specification`] from predicates, attach a [`Pageable`] with a
//! [`SortCollection`], render SQL fragments (or a whole [`SelectQuery`]) and
//! wrap the rows an external executor returns in a [`PageResult`].
//!
//! Nothing here opens connections or runs statements.

pub mod config;
pub mod entity;
pub mod error;
pub mod field;
pub mod operator;
pub mod page;
pub mod page_result;
pub mod predicate;
pub mod query;
mod render;
pub mod repository;
pub mod sort;
pub mod specification;
pub mod value;

pub use config::{PagingConfig, SqlConfig};
pub use entity::Entity;
pub use error::DataError;
pub use field::{ColumnMap, ColumnMapper, FieldPath};
pub use operator::{Connector, Operator};
pub use page::{Limit, Page, PageRequest, Pageable, Window};
pub use page_result::{PageLink, PageResult};
pub use predicate::Predicate;
pub use query::{Dialect, IdentifierPolicy, SelectQuery};
pub use render::BoundFragment;
pub use repository::SpecificationExecutor;
pub use sort::{SortCollection, SortCriterion, SortDirection, SortEntry};
pub use specification::{Criterion, RawFragment, Specification};
pub use value::{Scalar, Value};

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        ColumnMap, Connector, DataError, Dialect, Entity, FieldPath, PageRequest, PageResult,
        Pageable, Predicate, SelectQuery, SortCollection, SortDirection, Specification,
        SpecificationExecutor, Value,
    };
}
