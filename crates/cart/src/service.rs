//! Cart service: the public surface a UI layer drives.

use chrono::Utc;
use tracing::{debug, info, warn};

use fruitcart_core::{Aggregate, AggregateRoot, DomainError, DomainResult, Money};
use fruitcart_events::EventEnvelope;
use fruitcart_products::{Product, ProductCatalog, ProductId};

use crate::line_item::CartLineItem;
use crate::session::{
    AddProduct, CartCommand, CartEvent, CartSession, DecreaseQuantity, EmptyCart,
    IncreaseQuantity, Pay, RemoveProduct, SetQuantity,
};

/// Aggregate type recorded on journal envelopes.
pub const CART_AGGREGATE_TYPE: &str = "cart";

/// Couples a read-only catalog with one [`CartSession`].
///
/// Every mutation goes through the session's `handle`/`apply` pair and every
/// applied event is appended to the journal. The journal is an audit trail:
/// it grows with each applied event until a caller drains it with
/// [`CartService::take_journal`] (for example after shipping the entries to
/// durable storage). Sequence numbers keep counting across drains.
#[derive(Debug, Clone)]
pub struct CartService {
    catalog: ProductCatalog,
    session: CartSession,
    journal: Vec<EventEnvelope<CartEvent>>,
}

impl CartService {
    /// Service with a fresh, empty session.
    pub fn new(catalog: ProductCatalog) -> Self {
        Self::with_session(catalog, CartSession::default())
    }

    /// Service driving an existing session.
    pub fn with_session(catalog: ProductCatalog, session: CartSession) -> Self {
        Self {
            catalog,
            session,
            journal: Vec::new(),
        }
    }

    pub fn into_session(self) -> CartSession {
        self.session
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn products(&self) -> &[Product] {
        self.catalog.products()
    }

    pub fn session(&self) -> &CartSession {
        &self.session
    }

    /// Current cart lines, in the order they were first added.
    pub fn cart(&self) -> &[CartLineItem] {
        self.session.lines()
    }

    pub fn total_paid(&self) -> Money {
        self.session.total_paid()
    }

    /// Entries recorded since the last [`CartService::take_journal`].
    pub fn journal(&self) -> &[EventEnvelope<CartEvent>] {
        &self.journal
    }

    /// Hand over the recorded entries and start an empty journal.
    pub fn take_journal(&mut self) -> Vec<EventEnvelope<CartEvent>> {
        let drained = std::mem::take(&mut self.journal);
        debug!(entries = drained.len(), "journal drained");
        drained
    }

    pub fn find_product_by_id(&self, product_id: ProductId) -> Option<&Product> {
        self.catalog.find_product_by_id(product_id)
    }

    pub fn find_cart_item_by_id(&self, product_id: ProductId) -> Option<&CartLineItem> {
        self.session.find_line(product_id)
    }

    /// Add one unit of a catalog product.
    ///
    /// Fails with `NotFound` if the catalog has no such product.
    pub fn add_product_to_cart(&mut self, product_id: ProductId) -> DomainResult<()> {
        let Some(product) = self.catalog.find_product_by_id(product_id) else {
            warn!(%product_id, "add to cart rejected: unknown product");
            return Err(DomainError::not_found(format!("product {product_id}")));
        };
        let item = CartLineItem::from_product(product);

        self.dispatch(CartCommand::AddProduct(AddProduct {
            item,
            occurred_at: Utc::now(),
        }))?;
        self.trace_line(product_id, "added to cart");
        Ok(())
    }

    /// No-op when the product is not in the cart.
    pub fn increase_quantity(&mut self, product_id: ProductId) -> DomainResult<()> {
        self.dispatch(CartCommand::IncreaseQuantity(IncreaseQuantity {
            product_id,
            occurred_at: Utc::now(),
        }))?;
        self.trace_line(product_id, "quantity increased");
        Ok(())
    }

    /// Removes the line once its quantity would reach zero. No-op when absent.
    pub fn decrease_quantity(&mut self, product_id: ProductId) -> DomainResult<()> {
        self.dispatch(CartCommand::DecreaseQuantity(DecreaseQuantity {
            product_id,
            occurred_at: Utc::now(),
        }))?;
        self.trace_line(product_id, "quantity decreased");
        Ok(())
    }

    pub fn remove_product_from_cart(&mut self, product_id: ProductId) -> DomainResult<()> {
        let events = self.dispatch(CartCommand::RemoveProduct(RemoveProduct {
            product_id,
            occurred_at: Utc::now(),
        }))?;
        if !events.is_empty() {
            debug!(%product_id, "removed from cart");
        }
        Ok(())
    }

    /// Set a line's quantity directly; `0` removes the line.
    ///
    /// Fails with `InvalidArgument` for negative quantities. No-op when the
    /// product is not in the cart.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) -> DomainResult<()> {
        self.dispatch(CartCommand::SetQuantity(SetQuantity {
            product_id,
            quantity,
            occurred_at: Utc::now(),
        }))?;
        self.trace_line(product_id, "quantity set");
        Ok(())
    }

    /// Fails with `InvariantViolation` if the total does not fit in `Money`.
    pub fn cart_total(&self) -> DomainResult<Money> {
        self.session.cart_total()
    }

    /// Tender `amount` toward the cart.
    ///
    /// Returns `total_paid - cart_total`: negative while money is still owed,
    /// otherwise the change due (the cart is then emptied and the paid total
    /// reset). Fails with `InvalidArgument` for a negative amount and with
    /// `InvariantViolation` when a running total would overflow; either way
    /// the session is left untouched.
    pub fn pay(&mut self, amount: Money) -> DomainResult<Money> {
        let events = self.dispatch(CartCommand::Pay(Pay {
            amount,
            occurred_at: Utc::now(),
        }))?;

        let received = events
            .iter()
            .find_map(|event| match event {
                CartEvent::PaymentReceived(e) => Some(e),
                _ => None,
            })
            .ok_or_else(|| DomainError::invariant("payment was not recorded"))?;

        if received.is_settled() {
            info!(
                %amount,
                total = %received.cart_total,
                change = %received.remaining,
                "payment complete"
            );
        } else {
            warn!(
                %amount,
                total_paid = %received.total_paid,
                balance = %received.remaining,
                "payment short of cart total"
            );
        }

        Ok(received.remaining)
    }

    /// Remove every line and reset the paid total. Catalog entries are not
    /// touched.
    pub fn empty_cart(&mut self) -> DomainResult<()> {
        let events = self.dispatch(CartCommand::EmptyCart(EmptyCart {
            occurred_at: Utc::now(),
        }))?;
        if !events.is_empty() {
            debug!("cart emptied");
        }
        Ok(())
    }

    /// Decide, apply and journal a command.
    fn dispatch(&mut self, command: CartCommand) -> DomainResult<Vec<CartEvent>> {
        let events = self.session.handle(&command).inspect_err(|err| {
            warn!(cart_id = %self.session.id_typed(), error = %err, "cart command rejected");
        })?;

        for event in &events {
            self.session.apply(event);
            self.journal.push(EventEnvelope::record(
                self.session.id_typed().0,
                CART_AGGREGATE_TYPE,
                self.session.version(),
                event.clone(),
            ));
        }

        Ok(events)
    }

    fn trace_line(&self, product_id: ProductId, message: &'static str) {
        match self.session.find_line(product_id) {
            Some(line) => debug!(%product_id, quantity = line.quantity(), "{message}"),
            None => debug!(%product_id, quantity = 0, "{message}"),
        }
    }
}

impl Default for CartService {
    fn default() -> Self {
        Self::new(ProductCatalog::fruit_stand())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fruitcart_events::Event;

    const CHERRY: ProductId = ProductId(100);
    const ORANGE: ProductId = ProductId(101);
    const STRAWBERRY: ProductId = ProductId(102);

    fn cents(value: i64) -> Money {
        Money::from_cents(value)
    }

    #[test]
    fn add_unknown_product_fails_with_not_found() {
        let mut service = CartService::default();
        let err = service.add_product_to_cart(ProductId::new(999)).unwrap_err();

        match err {
            DomainError::NotFound(msg) if msg.contains("999") => {}
            other => panic!("Expected NotFound, got {other:?}"),
        }
        assert!(service.cart().is_empty());
        assert!(service.journal().is_empty());
    }

    #[test]
    fn each_catalog_product_adds_as_single_line() {
        let service = CartService::default();
        for product in service.products() {
            let mut service = CartService::default();
            service.add_product_to_cart(product.product_id()).unwrap();

            assert_eq!(service.cart().len(), 1);
            let line = &service.cart()[0];
            assert_eq!(line.quantity(), 1);
            assert_eq!(line.price(), product.price());
        }
    }

    #[test]
    fn adding_twice_equals_add_then_increase() {
        let mut twice = CartService::default();
        twice.add_product_to_cart(ORANGE).unwrap();
        twice.add_product_to_cart(ORANGE).unwrap();

        let mut increased = CartService::default();
        increased.add_product_to_cart(ORANGE).unwrap();
        increased.increase_quantity(ORANGE).unwrap();

        assert_eq!(twice.cart(), increased.cart());
        assert_eq!(twice.find_cart_item_by_id(ORANGE).unwrap().quantity(), 2);
    }

    #[test]
    fn decreasing_to_zero_removes_line() {
        let mut service = CartService::default();
        service.add_product_to_cart(CHERRY).unwrap();
        service.increase_quantity(CHERRY).unwrap();

        service.decrease_quantity(CHERRY).unwrap();
        assert_eq!(service.find_cart_item_by_id(CHERRY).unwrap().quantity(), 1);

        service.decrease_quantity(CHERRY).unwrap();
        assert!(service.find_cart_item_by_id(CHERRY).is_none());

        // Further decreases stay no-ops.
        service.decrease_quantity(CHERRY).unwrap();
        assert!(service.cart().is_empty());
    }

    #[test]
    fn remove_only_touches_the_named_product() {
        let mut service = CartService::default();
        service.add_product_to_cart(CHERRY).unwrap();
        service.add_product_to_cart(ORANGE).unwrap();
        service.add_product_to_cart(STRAWBERRY).unwrap();

        service.remove_product_from_cart(ORANGE).unwrap();
        service.remove_product_from_cart(ORANGE).unwrap();

        let ids: Vec<ProductId> = service.cart().iter().map(CartLineItem::product_id).collect();
        assert_eq!(ids, [CHERRY, STRAWBERRY]);
    }

    #[test]
    fn cart_lines_do_not_alias_catalog_entries() {
        let mut service = CartService::default();
        let before = service.catalog().clone();

        service.add_product_to_cart(CHERRY).unwrap();
        service.set_quantity(CHERRY, 7).unwrap();
        service.empty_cart().unwrap();

        assert_eq!(service.catalog(), &before);
    }

    #[test]
    fn set_quantity_validates_and_applies() {
        let mut service = CartService::default();
        service.add_product_to_cart(STRAWBERRY).unwrap();

        let err = service.set_quantity(STRAWBERRY, -2).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(service.find_cart_item_by_id(STRAWBERRY).unwrap().quantity(), 1);

        service.set_quantity(STRAWBERRY, 4).unwrap();
        assert_eq!(service.cart_total().unwrap(), cents(1_200));

        service.set_quantity(STRAWBERRY, 0).unwrap();
        assert!(service.cart().is_empty());

        // Absent line: nothing happens.
        service.set_quantity(CHERRY, 3).unwrap();
        assert!(service.cart().is_empty());
    }

    #[test]
    fn negative_payment_leaves_everything_untouched() {
        let mut service = CartService::default();
        service.add_product_to_cart(CHERRY).unwrap();
        service.pay(cents(50)).unwrap();
        let journal_len = service.journal().len();

        let err = service.pay(cents(-100)).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(service.total_paid(), cents(50));
        assert_eq!(service.cart().len(), 1);
        assert_eq!(service.journal().len(), journal_len);
    }

    #[test]
    fn paying_for_an_empty_cart_returns_the_amount_as_change() {
        let mut service = CartService::default();
        assert_eq!(service.pay(cents(100)).unwrap(), cents(100));
        assert_eq!(service.total_paid(), Money::zero());
    }

    #[test]
    fn empty_cart_is_idempotent() {
        let mut service = CartService::default();
        service.add_product_to_cart(ORANGE).unwrap();
        service.pay(cents(100)).unwrap();

        service.empty_cart().unwrap();
        assert!(service.cart().is_empty());
        assert_eq!(service.total_paid(), Money::zero());
        let journal_len = service.journal().len();

        service.empty_cart().unwrap();
        assert!(service.cart().is_empty());
        assert_eq!(service.total_paid(), Money::zero());
        assert_eq!(service.journal().len(), journal_len);
    }

    #[test]
    fn journal_is_sequenced_and_replayable() {
        let mut service = CartService::default();
        service.add_product_to_cart(CHERRY).unwrap();
        service.add_product_to_cart(ORANGE).unwrap();
        service.increase_quantity(ORANGE).unwrap();
        service.pay(cents(200)).unwrap();

        let journal = service.journal();
        let sequence: Vec<u64> = journal.iter().map(EventEnvelope::sequence_number).collect();
        assert_eq!(sequence, [1, 2, 3, 4]);
        assert!(journal.iter().all(|e| e.aggregate_type() == CART_AGGREGATE_TYPE));

        let types: Vec<&str> = journal.iter().map(|e| e.payload().event_type()).collect();
        assert_eq!(
            types,
            [
                "cart.line_added",
                "cart.line_added",
                "cart.quantity_changed",
                "cart.payment_received",
            ]
        );

        let id = service.session().id_typed();
        let rebuilt = CartSession::replay(id, journal.iter().map(EventEnvelope::payload));
        assert_eq!(&rebuilt, service.session());
        assert_eq!(rebuilt.version(), 4);
    }

    #[test]
    fn taking_the_journal_drains_it_and_numbering_continues() {
        let mut service = CartService::default();
        service.add_product_to_cart(CHERRY).unwrap();
        service.add_product_to_cart(ORANGE).unwrap();

        let taken = service.take_journal();
        assert_eq!(taken.len(), 2);
        assert!(service.journal().is_empty());
        assert!(service.take_journal().is_empty());

        service.increase_quantity(ORANGE).unwrap();
        assert_eq!(service.journal().len(), 1);
        assert_eq!(service.journal()[0].sequence_number(), 3);
    }

    #[test]
    fn totals_beyond_money_range_are_reported_not_clamped() {
        let gold = Product::new(
            ProductId::new(1),
            "Gold",
            "90000000000000000.00".parse().unwrap(),
            "",
        )
        .unwrap();
        let catalog = ProductCatalog::new(vec![gold]).unwrap();
        let mut service = CartService::new(catalog);
        let gold_id = ProductId::new(1);

        service.add_product_to_cart(gold_id).unwrap();
        assert_eq!(service.cart_total().unwrap().cents(), 9_000_000_000_000_000_000);

        service.add_product_to_cart(gold_id).unwrap();
        match service.cart_total().unwrap_err() {
            DomainError::InvariantViolation(msg) if msg.contains("overflows") => {}
            other => panic!("Expected InvariantViolation for cart total, got {other:?}"),
        }

        let journal_len = service.journal().len();
        let err = service.pay(Money::from_cents(i64::MAX)).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(service.find_cart_item_by_id(gold_id).unwrap().quantity(), 2);
        assert_eq!(service.total_paid(), Money::zero());
        assert_eq!(service.journal().len(), journal_len);
    }

    #[test]
    fn injected_session_is_continued() {
        let mut first = CartService::default();
        first.add_product_to_cart(STRAWBERRY).unwrap();
        first.pay(cents(100)).unwrap();
        let session = first.into_session();

        let mut second = CartService::with_session(ProductCatalog::fruit_stand(), session);
        assert_eq!(second.total_paid(), cents(100));
        assert_eq!(second.pay(cents(200)).unwrap(), Money::zero());

        // Journal numbering continues from the session version.
        assert_eq!(second.journal()[0].sequence_number(), 3);
    }
}
