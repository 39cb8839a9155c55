use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fruitcart_core::{Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult, Money};
use fruitcart_events::Event;
use fruitcart_products::ProductId;

use crate::line_item::{CartLineItem, calculate_cart_total};

/// Cart session identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(pub AggregateId);

impl CartId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CartId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: one shopper's cart plus the money tendered toward it.
///
/// Invariants:
/// - at most one line per product id
/// - every line has `quantity >= 1` (a line reaching zero is removed)
/// - `total_paid` resets to zero whenever the cart is emptied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSession {
    id: CartId,
    lines: Vec<CartLineItem>,
    total_paid: Money,
    version: u64,
}

impl CartSession {
    pub fn new(id: CartId) -> Self {
        Self {
            id,
            lines: Vec::new(),
            total_paid: Money::zero(),
            version: 0,
        }
    }

    /// Rebuild a session by applying `events` in order.
    pub fn replay<'a>(id: CartId, events: impl IntoIterator<Item = &'a CartEvent>) -> Self {
        let mut session = Self::new(id);
        for event in events {
            session.apply(event);
        }
        session
    }

    pub fn id_typed(&self) -> CartId {
        self.id
    }

    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    pub fn find_line(&self, product_id: ProductId) -> Option<&CartLineItem> {
        self.lines.iter().find(|l| l.product_id() == product_id)
    }

    pub fn total_paid(&self) -> Money {
        self.total_paid
    }

    /// Sum of `price * quantity` over the lines; `InvariantViolation` on overflow.
    pub fn cart_total(&self) -> DomainResult<Money> {
        calculate_cart_total(&self.lines)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLineItem> {
        self.lines.iter_mut().find(|l| l.product_id() == product_id)
    }
}

impl Default for CartSession {
    fn default() -> Self {
        Self::new(CartId::new(AggregateId::new()))
    }
}

impl AggregateRoot for CartSession {
    type Id = CartId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddProduct.
///
/// `item` is a fresh line built from the catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddProduct {
    pub item: CartLineItem,
    pub occurred_at: DateTime<Utc>,
}

/// Command: IncreaseQuantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncreaseQuantity {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DecreaseQuantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecreaseQuantity {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveProduct {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetQuantity.
///
/// Signed so that a negative request can be rejected rather than being
/// unrepresentable at the call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetQuantity {
    pub product_id: ProductId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pay {
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Command: EmptyCart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyCart {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartCommand {
    AddProduct(AddProduct),
    IncreaseQuantity(IncreaseQuantity),
    DecreaseQuantity(DecreaseQuantity),
    RemoveProduct(RemoveProduct),
    SetQuantity(SetQuantity),
    Pay(Pay),
    EmptyCart(EmptyCart),
}

/// Event: LineAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAdded {
    pub item: CartLineItem,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuantityChanged. `quantity` is the new absolute value (>= 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityChanged {
    pub product_id: ProductId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRemoved {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PaymentReceived.
///
/// `remaining = total_paid - cart_total`: negative means still owed, zero or
/// positive means paid in full (with that much change).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceived {
    pub amount: Money,
    pub total_paid: Money,
    pub cart_total: Money,
    pub remaining: Money,
    pub occurred_at: DateTime<Utc>,
}

impl PaymentReceived {
    pub fn is_settled(&self) -> bool {
        !self.remaining.is_negative()
    }
}

/// Event: CartEmptied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEmptied {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartEvent {
    LineAdded(LineAdded),
    QuantityChanged(QuantityChanged),
    LineRemoved(LineRemoved),
    PaymentReceived(PaymentReceived),
    CartEmptied(CartEmptied),
}

impl Event for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::LineAdded(_) => "cart.line_added",
            CartEvent::QuantityChanged(_) => "cart.quantity_changed",
            CartEvent::LineRemoved(_) => "cart.line_removed",
            CartEvent::PaymentReceived(_) => "cart.payment_received",
            CartEvent::CartEmptied(_) => "cart.emptied",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CartEvent::LineAdded(e) => e.occurred_at,
            CartEvent::QuantityChanged(e) => e.occurred_at,
            CartEvent::LineRemoved(e) => e.occurred_at,
            CartEvent::PaymentReceived(e) => e.occurred_at,
            CartEvent::CartEmptied(e) => e.occurred_at,
        }
    }
}

impl Aggregate for CartSession {
    type Command = CartCommand;
    type Event = CartEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CartEvent::LineAdded(e) => {
                self.lines.push(e.item.clone());
            }
            CartEvent::QuantityChanged(e) => {
                if let Some(line) = self.line_mut(e.product_id) {
                    line.set_quantity(e.quantity);
                }
            }
            CartEvent::LineRemoved(e) => {
                if let Some(idx) = self.lines.iter().position(|l| l.product_id() == e.product_id) {
                    self.lines.remove(idx);
                }
            }
            CartEvent::PaymentReceived(e) => {
                self.total_paid = e.total_paid;
            }
            CartEvent::CartEmptied(_) => {
                self.lines.clear();
                self.total_paid = Money::zero();
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CartCommand::AddProduct(cmd) => self.handle_add_product(cmd),
            CartCommand::IncreaseQuantity(cmd) => self.handle_increase(cmd),
            CartCommand::DecreaseQuantity(cmd) => self.handle_decrease(cmd),
            CartCommand::RemoveProduct(cmd) => self.handle_remove(cmd),
            CartCommand::SetQuantity(cmd) => self.handle_set_quantity(cmd),
            CartCommand::Pay(cmd) => self.handle_pay(cmd),
            CartCommand::EmptyCart(cmd) => self.handle_empty(cmd),
        }
    }
}

impl CartSession {
    fn incremented(&self, line: &CartLineItem) -> Result<u32, DomainError> {
        line.quantity().checked_add(1).ok_or_else(|| {
            DomainError::invariant(format!(
                "quantity of product {} cannot grow further",
                line.product_id()
            ))
        })
    }

    fn handle_add_product(&self, cmd: &AddProduct) -> Result<Vec<CartEvent>, DomainError> {
        let product_id = cmd.item.product_id();

        if let Some(line) = self.find_line(product_id) {
            return Ok(vec![CartEvent::QuantityChanged(QuantityChanged {
                product_id,
                quantity: self.incremented(line)?,
                occurred_at: cmd.occurred_at,
            })]);
        }

        // A new line always starts at one unit, whatever quantity the
        // submitted item carried.
        let mut item = cmd.item.clone();
        item.set_quantity(1);

        Ok(vec![CartEvent::LineAdded(LineAdded {
            item,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_increase(&self, cmd: &IncreaseQuantity) -> Result<Vec<CartEvent>, DomainError> {
        let Some(line) = self.find_line(cmd.product_id) else {
            return Ok(vec![]);
        };

        Ok(vec![CartEvent::QuantityChanged(QuantityChanged {
            product_id: cmd.product_id,
            quantity: self.incremented(line)?,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_decrease(&self, cmd: &DecreaseQuantity) -> Result<Vec<CartEvent>, DomainError> {
        let Some(line) = self.find_line(cmd.product_id) else {
            return Ok(vec![]);
        };

        if line.quantity() <= 1 {
            return Ok(vec![CartEvent::LineRemoved(LineRemoved {
                product_id: cmd.product_id,
                occurred_at: cmd.occurred_at,
            })]);
        }

        Ok(vec![CartEvent::QuantityChanged(QuantityChanged {
            product_id: cmd.product_id,
            quantity: line.quantity() - 1,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(&self, cmd: &RemoveProduct) -> Result<Vec<CartEvent>, DomainError> {
        if self.find_line(cmd.product_id).is_none() {
            return Ok(vec![]);
        }

        Ok(vec![CartEvent::LineRemoved(LineRemoved {
            product_id: cmd.product_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_quantity(&self, cmd: &SetQuantity) -> Result<Vec<CartEvent>, DomainError> {
        if cmd.quantity < 0 {
            return Err(DomainError::invalid_argument(format!(
                "quantity must not be negative (got {})",
                cmd.quantity
            )));
        }
        let quantity = u32::try_from(cmd.quantity).map_err(|_| {
            DomainError::invalid_argument(format!("quantity {} is too large", cmd.quantity))
        })?;

        let Some(line) = self.find_line(cmd.product_id) else {
            return Ok(vec![]);
        };

        if quantity == 0 {
            return Ok(vec![CartEvent::LineRemoved(LineRemoved {
                product_id: cmd.product_id,
                occurred_at: cmd.occurred_at,
            })]);
        }

        if quantity == line.quantity() {
            return Ok(vec![]);
        }

        Ok(vec![CartEvent::QuantityChanged(QuantityChanged {
            product_id: cmd.product_id,
            quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_pay(&self, cmd: &Pay) -> Result<Vec<CartEvent>, DomainError> {
        if cmd.amount.is_negative() {
            return Err(DomainError::invalid_argument(format!(
                "payment amount must not be negative (got {})",
                cmd.amount
            )));
        }

        let total_paid = self.total_paid.checked_add(cmd.amount).ok_or_else(|| {
            DomainError::invariant(format!(
                "paid total overflows ({} already paid, {} tendered)",
                self.total_paid, cmd.amount
            ))
        })?;
        let cart_total = self.cart_total()?;
        let remaining = total_paid.checked_sub(cart_total).ok_or_else(|| {
            DomainError::invariant(format!(
                "remaining balance overflows ({total_paid} paid, {cart_total} due)"
            ))
        })?;
        let received = PaymentReceived {
            amount: cmd.amount,
            total_paid,
            cart_total,
            remaining,
            occurred_at: cmd.occurred_at,
        };

        let settled = received.is_settled();
        let mut events = vec![CartEvent::PaymentReceived(received)];
        if settled {
            events.push(CartEvent::CartEmptied(CartEmptied {
                occurred_at: cmd.occurred_at,
            }));
        }
        Ok(events)
    }

    fn handle_empty(&self, cmd: &EmptyCart) -> Result<Vec<CartEvent>, DomainError> {
        if self.lines.is_empty() && self.total_paid.is_zero() {
            return Ok(vec![]);
        }

        Ok(vec![CartEvent::CartEmptied(CartEmptied {
            occurred_at: cmd.occurred_at,
        })])
    }
}
