//! Decentralized settings registry.
//!
//! Declare named, typed, optionally-validated settings wherever they are
//! logically used; they all bind into one process-wide dotted-path tree.
//! The tree can be bulk-updated from YAML or TOML without ever rebinding or
//! retyping a declared setting, and the effective value of a setting
//! resolves through a three-tier precedence chain: instance override, then
//! registry value, then declared default.
//!
//! ```
//! use settree::{conditions, Format, Registry, Setting};
//!
//! let registry = Registry::new();
//! registry.declare(
//!     "server.port",
//!     Setting::new(8080)
//!         .desc("Port to listen on")
//!         .check(conditions::within(0, 65536))
//!         .build()?,
//! )?;
//! registry.declare("server.host", Setting::new("localhost").build()?)?;
//!
//! registry.load("server:\n  port: 9000\n", Format::Yaml)?;
//! assert_eq!(registry.value("server.port")?, settree::Value::Int(9000));
//! # Ok::<(), settree::SettingsError>(())
//! ```
//!
//! Process-wide use goes through [`registry()`], whose tree lives for the
//! lifetime of the process and is discarded only by an explicit
//! [`Registry::reset`].

pub mod conditions;
pub mod error;
pub mod io;
pub mod registry;
pub mod resolve;
pub mod setting;
pub mod value;

pub use conditions::Condition;
pub use error::{Result, SettingsError};
pub use io::{Format, decode};
pub use registry::{Entry, PATH_SEPARATOR, Registry, registry};
pub use resolve::{Overrides, resolve};
pub use setting::{Setting, SettingBuilder};
pub use value::{Kind, Value};
