use crate::error::DataError;
use crate::page::Pageable;
use crate::page_result::PageResult;
use crate::specification::Specification;
use std::future::Future;

/// The boundary an external query executor implements.
///
/// Implementations typically build statements with
/// [`SelectQuery`](crate::SelectQuery), run them on their own driver and
/// wrap driver failures with [`DataError::executor`].
///
/// Uses RPITIT (return-position `impl Trait` in traits); no `async-trait` needed.
pub trait SpecificationExecutor<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Rows matching `filter` in the window described by `pageable`.
    fn find_page(
        &self,
        filter: &Specification,
        pageable: &Pageable,
    ) -> impl Future<Output = Result<PageResult<T>, DataError>> + Send;

    /// Number of rows matching `filter`.
    fn count(&self, filter: &Specification) -> impl Future<Output = Result<u64, DataError>> + Send;
}
