// Middleware for remote calls
//
// Provides per-key request coalescing for cache fills

pub mod single_flight;

pub use single_flight::{FlightAborted, SingleFlight};
