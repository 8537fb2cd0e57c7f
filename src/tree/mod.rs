//! Web pipeline tree: conversion output types + id handling.

pub mod ids;
pub mod types;

pub use ids::{IdGenerator, SequentialIdGenerator, UuidIdGenerator, replace_all_id};
pub use types::*;
