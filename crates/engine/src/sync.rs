//! Sync strategies: how a collection's on-adapter schema is reconciled
//! with its declared attributes when a Facade is opened.
//!
//! Mirrors the shape of a pluggable persistence-mode trait: each strategy
//! is a zero-sized type implementing one method, boxed as a trait object
//! so the strategy can be chosen at runtime (e.g. from config) rather than
//! fixed at compile time.

use crate::facade::AdapterFacade;
use millrace_core::{Adapter, Result};
use millrace_primitives::AttributeInput;
use std::collections::BTreeMap;

/// How an `AdapterFacade` reconciles a collection's existing schema with
/// its declared attributes at open time.
pub trait SyncStrategy<A: Adapter + 'static>: Send + Sync {
    /// Reconcile `collection`'s schema with `attributes`.
    fn sync(
        &self,
        facade: &AdapterFacade<A>,
        collection: &str,
        attributes: &BTreeMap<String, AttributeInput>,
    ) -> Result<()>;
}

/// Drops and redefines the collection on every open, discarding any
/// existing data. Intended for development/test environments.
pub struct DropSync;

impl<A: Adapter + 'static> SyncStrategy<A> for DropSync {
    fn sync(
        &self,
        facade: &AdapterFacade<A>,
        collection: &str,
        attributes: &BTreeMap<String, AttributeInput>,
    ) -> Result<()> {
        if facade.describe(collection)?.is_some() {
            facade.drop_collection(collection)?;
        }
        facade.define(collection, attributes)
    }
}

/// Defines the collection if it doesn't exist yet, otherwise alters it to
/// match the declared attributes in place, preserving existing data.
pub struct AlterSync;

impl<A: Adapter + 'static> SyncStrategy<A> for AlterSync {
    fn sync(
        &self,
        facade: &AdapterFacade<A>,
        collection: &str,
        attributes: &BTreeMap<String, AttributeInput>,
    ) -> Result<()> {
        if facade.describe(collection)?.is_some() {
            facade.alter(collection, attributes)
        } else {
            facade.define(collection, attributes)
        }
    }
}

/// Defines the collection only if it doesn't already exist; never alters
/// or drops an existing one, even if its schema has since diverged from
/// the declared attributes. Intended for production environments where
/// schema changes are applied out of band.
pub struct SafeSync;

impl<A: Adapter + 'static> SyncStrategy<A> for SafeSync {
    fn sync(
        &self,
        facade: &AdapterFacade<A>,
        collection: &str,
        attributes: &BTreeMap<String, AttributeInput>,
    ) -> Result<()> {
        if facade.describe(collection)?.is_none() {
            facade.define(collection, attributes)?;
        }
        Ok(())
    }
}
