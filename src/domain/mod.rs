//! Domain types shared by every layer, and the ports the application layer
//! calls out through.

pub mod access;
pub mod amount;
pub mod currency;
pub mod method;
pub mod payment;
pub mod ports;
pub mod status;
