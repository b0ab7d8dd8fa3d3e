//! File exchange.

pub mod iges;
