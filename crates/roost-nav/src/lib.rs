//! Roost Nav - Route Metadata and Navigation Guard
//!
//! A name-keyed route table carrying one flag per view (does it require an
//! authenticated session) and the synchronous guard that enforces it on
//! every transition.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod guard;
pub mod route;

pub use guard::{NavDecision, NavigationGuard};
pub use route::{Route, RouteTable};
