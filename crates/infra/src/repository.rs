//! Product repositories.
//!
//! [`InMemoryProductStore`] is the committed state shared by every unit of
//! work. [`TrackingRepository`] is the per-unit-of-work view: it hands out
//! private working copies and remembers which products it has seen, so the
//! unit of work can commit them and collect the messages they raised.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use allocation_core::{AggregateRoot, BatchRef, ExpectedVersion, Sku};
use allocation_domain::Product;

use crate::unit_of_work::UnitOfWorkError;

/// Collection-like access to products inside a unit of work.
pub trait ProductRepository {
    /// Track a new product; fails if one already exists for its SKU.
    fn add(&mut self, product: Product) -> Result<(), UnitOfWorkError>;

    fn get(&mut self, sku: &Sku) -> Result<Option<&mut Product>, UnitOfWorkError>;

    fn get_by_batch_ref(
        &mut self,
        reference: &BatchRef,
    ) -> Result<Option<&mut Product>, UnitOfWorkError>;
}

/// In-memory committed product state.
///
/// Intended for tests/dev. Stored products never carry pending messages.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<HashMap<Sku, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed copy of a product.
    pub fn snapshot(&self, sku: &Sku) -> Result<Option<Product>, UnitOfWorkError> {
        let products = self.products.read().map_err(|_| UnitOfWorkError::Poisoned)?;
        Ok(products.get(sku).cloned())
    }

    fn find_by_batch_ref(
        &self,
        reference: &BatchRef,
    ) -> Result<Option<Product>, UnitOfWorkError> {
        let products = self.products.read().map_err(|_| UnitOfWorkError::Poisoned)?;
        Ok(products
            .values()
            .find(|p| p.batch(reference).is_some())
            .cloned())
    }

    /// Write all products at once, or none if any version check fails.
    pub(crate) fn save_all(
        &self,
        changes: &[(ExpectedVersion, &Product)],
    ) -> Result<(), UnitOfWorkError> {
        let mut products = self.products.write().map_err(|_| UnitOfWorkError::Poisoned)?;

        for (expected, product) in changes {
            let actual = products.get(product.sku()).map(AggregateRoot::version);
            expected
                .check(actual)
                .map_err(|source| UnitOfWorkError::Concurrency {
                    sku: product.sku().clone(),
                    source,
                })?;
        }

        for (_, product) in changes {
            let mut stored = (*product).clone();
            stored.discard_messages();
            products.insert(stored.sku().clone(), stored);
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Tracked {
    expected: ExpectedVersion,
    product: Product,
}

/// Repository view owned by one unit of work.
#[derive(Debug)]
pub struct TrackingRepository {
    store: Arc<InMemoryProductStore>,
    /// First-seen order.
    seen: Vec<Tracked>,
}

impl TrackingRepository {
    pub fn new(store: Arc<InMemoryProductStore>) -> Self {
        Self {
            store,
            seen: Vec::new(),
        }
    }

    /// Products handed out by this repository, in first-seen order.
    pub fn seen(&self) -> impl Iterator<Item = &Product> {
        self.seen.iter().map(|t| &t.product)
    }

    pub(crate) fn seen_mut(&mut self) -> impl Iterator<Item = &mut Product> {
        self.seen.iter_mut().map(|t| &mut t.product)
    }

    pub(crate) fn commit(&mut self) -> Result<(), UnitOfWorkError> {
        let changes: Vec<_> = self
            .seen
            .iter()
            .map(|t| (t.expected, &t.product))
            .collect();
        self.store.save_all(&changes)?;

        for tracked in &mut self.seen {
            tracked.expected = ExpectedVersion::Exact(tracked.product.version());
        }
        Ok(())
    }

    pub(crate) fn discard(&mut self) {
        self.seen.clear();
    }

    fn position(&self, sku: &Sku) -> Option<usize> {
        self.seen.iter().position(|t| t.product.sku() == sku)
    }

    fn track(&mut self, expected: ExpectedVersion, product: Product) -> usize {
        self.seen.push(Tracked { expected, product });
        self.seen.len() - 1
    }
}

impl ProductRepository for TrackingRepository {
    fn add(&mut self, product: Product) -> Result<(), UnitOfWorkError> {
        if self.position(product.sku()).is_some() || self.store.snapshot(product.sku())?.is_some() {
            return Err(UnitOfWorkError::Duplicate(product.sku().clone()));
        }
        self.track(ExpectedVersion::Absent, product);
        Ok(())
    }

    fn get(&mut self, sku: &Sku) -> Result<Option<&mut Product>, UnitOfWorkError> {
        let idx = match self.position(sku) {
            Some(idx) => idx,
            None => match self.store.snapshot(sku)? {
                Some(product) => {
                    let expected = ExpectedVersion::Exact(product.version());
                    self.track(expected, product)
                }
                None => return Ok(None),
            },
        };
        Ok(Some(&mut self.seen[idx].product))
    }

    fn get_by_batch_ref(
        &mut self,
        reference: &BatchRef,
    ) -> Result<Option<&mut Product>, UnitOfWorkError> {
        let tracked = self
            .seen
            .iter()
            .position(|t| t.product.batch(reference).is_some());

        let idx = match tracked {
            Some(idx) => idx,
            None => match self.store.find_by_batch_ref(reference)? {
                Some(product) if self.position(product.sku()).is_none() => {
                    let expected = ExpectedVersion::Exact(product.version());
                    self.track(expected, product)
                }
                // A tracked working copy no longer has the batch; trust it.
                Some(_) | None => return Ok(None),
            },
        };
        Ok(Some(&mut self.seen[idx].product))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allocation_domain::Batch;

    fn sku(value: &str) -> Sku {
        Sku::new(value).unwrap()
    }

    fn product(sku_value: &str, reference: &str, qty: u32) -> Product {
        let mut product = Product::new(sku(sku_value));
        product
            .add_batch(Batch::new(BatchRef::new(reference).unwrap(), sku(sku_value), qty, None))
            .unwrap();
        product
    }

    #[test]
    fn committed_products_are_visible_to_other_repositories() {
        let store = Arc::new(InMemoryProductStore::new());
        let mut first = TrackingRepository::new(store.clone());
        first.add(product("LAMP", "b1", 10)).unwrap();
        first.commit().unwrap();

        let mut second = TrackingRepository::new(store);
        let found = second.get(&sku("LAMP")).unwrap().unwrap();
        assert_eq!(found.batches().len(), 1);

        let by_ref = second
            .get_by_batch_ref(&BatchRef::new("b1").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(by_ref.sku(), &sku("LAMP"));
        assert_eq!(second.seen().count(), 1);
    }

    #[test]
    fn uncommitted_changes_stay_private() {
        let store = Arc::new(InMemoryProductStore::new());
        let mut repo = TrackingRepository::new(store.clone());
        repo.add(product("LAMP", "b1", 10)).unwrap();

        assert!(store.snapshot(&sku("LAMP")).unwrap().is_none());
        repo.discard();
        assert_eq!(repo.seen().count(), 0);
    }

    #[test]
    fn adding_an_existing_product_is_rejected() {
        let store = Arc::new(InMemoryProductStore::new());
        let mut repo = TrackingRepository::new(store.clone());
        repo.add(product("LAMP", "b1", 10)).unwrap();
        repo.commit().unwrap();

        let mut other = TrackingRepository::new(store);
        assert!(matches!(
            other.add(product("LAMP", "b2", 5)),
            Err(UnitOfWorkError::Duplicate(_))
        ));
    }

    #[test]
    fn stale_working_copies_fail_to_commit() {
        let store = Arc::new(InMemoryProductStore::new());
        let mut setup = TrackingRepository::new(store.clone());
        setup.add(product("LAMP", "b1", 10)).unwrap();
        setup.commit().unwrap();

        let mut first = TrackingRepository::new(store.clone());
        let mut second = TrackingRepository::new(store.clone());
        let b2 = Batch::new(BatchRef::new("b2").unwrap(), sku("LAMP"), 5, None);
        let b3 = Batch::new(BatchRef::new("b3").unwrap(), sku("LAMP"), 5, None);
        first.get(&sku("LAMP")).unwrap().unwrap().add_batch(b2).unwrap();
        second.get(&sku("LAMP")).unwrap().unwrap().add_batch(b3).unwrap();

        first.commit().unwrap();
        assert!(matches!(
            second.commit(),
            Err(UnitOfWorkError::Concurrency { .. })
        ));
        assert_eq!(store.snapshot(&sku("LAMP")).unwrap().unwrap().batches().len(), 2);
    }
}
