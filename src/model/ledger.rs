//! Ledger primitives: the people tasks act on and the deposits they buy.

use std::fmt;

/// Handle to a person registered with a broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PersonId(pub(crate) usize);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "person#{}", self.0)
    }
}

/// Someone a task targets: collected from, lent to, or dunned.
///
/// Debt has no floor. Overpaying a debt leaves it negative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    /// Sales the person has made, the base for collection commissions.
    pub sales_total: f64,

    /// What the person owes.
    pub debt: f64,
}

impl Person {
    pub fn new(sales_total: f64) -> Self {
        Self {
            sales_total,
            debt: 0.0,
        }
    }

    pub fn add_debt(&mut self, amount: f64) {
        self.debt += amount;
    }

    pub fn reduce_debt(&mut self, amount: f64) {
        self.debt -= amount;
    }
}

/// A storage deposit offered for purchase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deposit {
    /// Floor area in square metres.
    pub area: u32,
}

impl Deposit {
    pub fn new(area: u32) -> Self {
        Self { area }
    }
}
