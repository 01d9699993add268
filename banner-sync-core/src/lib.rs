#![doc = "banner-sync-core: core workflows for the featured posts banner."]

//! This crate holds the data model, the [`contract::Platform`] abstraction and
//! the download/upload workflows. It never talks HTTP itself: the CLI crate
//! provides the concrete Reddit client, tests provide `MockPlatform`.
//!
//! # Usage
//! Build a [`resources::ResourceLayout`] and [`synchronise::BannerSettings`],
//! then call [`synchronise::run_download`] or [`synchronise::run_upload`].

pub mod contract;
pub mod download;
pub mod error;
pub mod resources;
pub mod sidebar;
pub mod synchronise;
pub mod upload;
pub mod widget;
