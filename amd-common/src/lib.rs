//! Shared types for the AMD scene asset format.
//!
//! The exporter builds an [`AmdFile`] and writes it with [`AmdFile::write_to`];
//! tools that only need to read or validate `.amd` files use
//! [`AmdFile::from_bytes`].

pub mod formats;

pub use formats::*;
