pub mod bvlc;
pub mod framer;
pub mod transport;
