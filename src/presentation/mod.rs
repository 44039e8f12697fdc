//! Mapping from domain records to wire types.

pub mod views;
