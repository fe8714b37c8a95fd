//! Error reporting foundation.
//!
//! Crates in the workspace define their own error enums and surface them
//! wrapped in a `rootcause::Report`, so a failure keeps its typed context
//! while still rendering a full chain when logged.

use rootcause::Report;

/// Result alias carrying a `rootcause` report.
///
/// The context type defaults to `()` for call sites that only need to
/// propagate; domain code names its own error enum as `C`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
