//! URL handling module for Sumi-Scout
//!
//! This module provides URL normalization (the key used by the visited set),
//! host and registrable-domain extraction, and the [`Site`] type describing
//! one crawl target.

mod domain;
mod normalize;
mod site;

pub use domain::{extract_domain, is_same_site, registrable_domain};
pub use normalize::{normalize_url, strip_fragment};
pub use site::Site;
