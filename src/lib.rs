//! Chaos Draft - pack inventory and weighted draft engine
//!
//! This crate implements the core of a chaos-draft companion for trading-card
//! game nights: a per-user pack inventory, a weighted random draft across
//! players in round-robin order with single-step undo, and a draft history
//! whose deletion hands drafted packs back to the inventory.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;
pub mod telemetry;
