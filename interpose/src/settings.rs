// vim: tw=80
//! Process-wide defaults for new mocks.
//!
//! Read once from the environment:
//!
//! * `INTERPOSE_RELAXED`: if true, every mock is relaxed.
//! * `INTERPOSE_RELAX_UNIT_FUN`: if true, methods returning `()` need no stub.
//!
//! Explicit [`MockConfig`](crate::MockConfig) settings are or-ed with these.

use lazy_static::lazy_static;
use std::env;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Settings {
    pub relaxed: bool,
    pub relax_unit_fun: bool
}

impl Settings {
    fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        Settings {
            relaxed: flag(lookup("INTERPOSE_RELAXED")),
            relax_unit_fun: flag(lookup("INTERPOSE_RELAX_UNIT_FUN"))
        }
    }
}

fn flag(value: Option<String>) -> bool {
    match value {
        Some(v) => matches!(v.trim().to_ascii_lowercase().as_str(),
                            "1" | "true" | "yes" | "on"),
        None => false
    }
}

lazy_static! {
    static ref SETTINGS: Settings =
        Settings::from_lookup(|k| env::var(k).ok());
}

/// The process-wide defaults
pub fn settings() -> Settings {
    *SETTINGS
}
