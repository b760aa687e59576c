//! Sync engine and resource model for eero home networks.
//!
//! Sits between `eerosync-api` (the session client) and hosts such as the
//! `eerosync` CLI:
//!
//! - **[`Engine`]** runs sync cycles. Each cycle fetches the account, then
//!   per selected network the network itself, its Thread settings and
//!   whatever the [`SyncPlan`] asks for (backup access points, clients,
//!   profiles, release notes, activity series). A cycle either succeeds as
//!   a whole and publishes a new [`Account`] snapshot, or leaves the
//!   previous snapshot in place.
//!
//! - **Resource model** ([`model`]) borrows an immutable [`Account`]:
//!   [`Network`], [`Device`] (eero units), [`Profile`], [`Client`] and
//!   [`BackupNetwork`] views, unified by the closed [`Resource`] enum.
//!   Mutations issue exactly one remote call and never touch the snapshot.
//!
//! - **Activity windows** ([`window`]) turn a day/week/month period and an
//!   IANA timezone into the UTC interval the insights endpoints expect.

pub mod activity;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod window;

// ── Primary re-exports ──────────────────────────────────────────────
pub use activity::{Activity, ActivityScope, InsightType};
pub use config::{EngineConfig, NetworkSelection, SyncPlan};
pub use engine::{Engine, VerifiedLogin};
pub use error::CoreError;
pub use window::{ActivityWindow, Cadence, Period};

pub use model::{
    Account, AdBlockStatus, BackupNetwork, BlockedCounts, Client, DataUsage, DerivedAttribute,
    Device, DeviceCategory, Firmware, Network, NetworkSetting, Nightlight, NightlightMode,
    Profile, ProfileSetting, Resource, ResourceKind,
};
