//! Typed configuration loaded from environment variables.

pub mod db;
pub mod game;
pub mod retention;
pub mod server;

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::AppError;

/// Read `name` and parse it, falling back to `default` when unset or blank.
///
/// A set but unparseable value is a configuration error, never a silent default.
pub(crate) fn parse_var<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse::<T>().map_err(|e| {
            AppError::config(format!("{name} has invalid value '{}': {e}", raw.trim()))
        }),
        _ => Ok(default),
    }
}
