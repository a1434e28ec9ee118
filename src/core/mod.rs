//! Core business logic, independent of the HTTP layer.
//!
//! Every operation takes a database connection and returns domain models or
//! `errors::Error`; the `api` module only parses requests and maps results.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod favorites;
pub mod order;
pub mod pricing;
pub mod profile;
pub mod promotion;
pub mod report;
