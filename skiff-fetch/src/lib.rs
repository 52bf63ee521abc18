//! Skiff's backend wire surface: the Insight-style push and HTTP connectors,
//! and the adapters that normalise the backend's two transaction encodings
//! into canonical [`bitcoin::Transaction`] values.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod insight;
pub mod wire;
