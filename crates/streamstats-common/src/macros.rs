//! Convenience macros for error handling and propagation

/// Equivalent to `anyhow::bail!` but for `StatsError`
///
/// # Examples
///
/// ```rust
/// use streamstats_common::bail;
/// use streamstats_common::Result;
///
/// fn check_value(value: i32) -> Result<()> {
///     if value < 0 {
///         bail!("Value cannot be negative: {}", value);
///     }
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::StatsError::new($msg))
    };
    ($err:expr $(,)?) => {
        return Err($crate::StatsError::from($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::StatsError::new(format!($fmt, $($arg)*)))
    };
}

/// Equivalent to `anyhow::ensure!` but for `StatsError`
///
/// # Examples
///
/// ```rust
/// use streamstats_common::ensure;
/// use streamstats_common::Result;
///
/// fn validate_positive(value: i32) -> Result<()> {
///     ensure!(value > 0, "Value must be positive, got: {}", value);
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal $(,)?) => {
        if !$cond {
            return Err($crate::StatsError::new($msg));
        }
    };
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($crate::StatsError::from($err));
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::StatsError::new(format!($fmt, $($arg)*)));
        }
    };
}
