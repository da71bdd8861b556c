#[cfg(feature = "d2")]
pub mod d2;
#[cfg(feature = "d3")]
pub mod d3;
pub mod frame;
