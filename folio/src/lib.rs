//! Folio: declarative SQL filtering, sorting and pagination.
//!
//! This facade crate re-exports the folio sub-crates through a single
//! dependency. Import everything you need with:
//!
//! ```
//! use folio::prelude::*;
//!
//! let spec = Specification::new().and(("active", true));
//! assert_eq!(spec.render(), "active = true");
//! ```
//!
//! # Feature flags
//!
//! | Feature | Default | Crate                            |
//! |---------|---------|----------------------------------|
//! | `data`  | **yes** | `folio-data` (queries, paging)   |

pub use folio_core;
pub use folio_core::{
    init_tracing, try_init_tracing, ConfigError, ConfigProperties, ConfigValue, FolioConfig,
    LogConfig, LogFormat,
};

#[cfg(feature = "data")]
pub use folio_data;

#[cfg(feature = "data")]
pub use folio_data::field_enum;

pub mod prelude {
    //! Everything needed to configure folio and build paged queries.
    pub use folio_core::{init_tracing, ConfigProperties, FolioConfig, LogConfig};

    #[cfg(feature = "data")]
    pub use folio_data::prelude::*;

    #[cfg(feature = "data")]
    pub use folio_data::{field_enum, PagingConfig, SqlConfig};
}
