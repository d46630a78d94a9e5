//! Object boundary geometry for 2-D label images.
//!
//! Chain codes describe an object's outer boundary as a start pixel plus a
//! sequence of unit steps; convex hulls are derived from them. Both exist
//! to serve the chain-code and convex-hull feature kinds, which are defined
//! for 2-D images only.

mod chain_code;
mod convex_hull;

pub use chain_code::{extract_chain_codes, ChainCode};
pub use convex_hull::ConvexHull;
