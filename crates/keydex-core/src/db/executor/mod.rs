//! Executors: one per operation family, each borrowing the [`Db`](crate::db::Db)
//! and carrying its debug flag.

mod delete;
mod load;
mod save;

#[cfg(test)]
mod tests;

pub use delete::DeleteExecutor;
pub use load::LoadExecutor;
pub use save::SaveExecutor;

/// Lifecycle log line: `debug` level when the executor runs in debug mode,
/// `trace` otherwise.
macro_rules! exec_log {
    ($debug:expr, $($arg:tt)+) => {
        if $debug {
            tracing::debug!($($arg)+);
        } else {
            tracing::trace!($($arg)+);
        }
    };
}

pub(crate) use exec_log;
