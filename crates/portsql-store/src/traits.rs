//! Database and executor traits -- the public seam for migration execution.
//!
//! The runner and tracking store depend on these traits rather than on a
//! concrete driver, so alternative backends (mocks, proxies) can be
//! substituted. Transactions are closure-scoped: the closure's `Ok` commits,
//! its `Err` rolls back.

use portsql_dialect::Dialect;

use crate::error::Result;

/// Executes SQL, either directly on a connection or inside a transaction.
///
/// `query_rows` stringifies scalar result columns; callers selecting
/// non-text values they care about should cast in SQL.
pub trait DbExecutor {
    /// Executes one statement (or a statement batch the driver accepts).
    fn execute(&mut self, sql: &str) -> Result<()>;

    /// Runs a query and returns every row as a vector of strings.
    fn query_rows(&mut self, sql: &str) -> Result<Vec<Vec<String>>>;
}

/// A live database connection for one of the supported dialects.
pub trait Database: DbExecutor {
    /// The dialect this connection speaks.
    fn dialect(&self) -> Dialect;

    /// Runs the closure inside a transaction.
    ///
    /// Commits when the closure returns `Ok`, rolls back when it returns
    /// `Err`, and propagates the closure's error unchanged.
    fn with_transaction(
        &mut self,
        f: &mut dyn FnMut(&mut dyn DbExecutor) -> Result<()>,
    ) -> Result<()>;
}
