//! Core data model for Vito.
//!
//! The people tasks target, the crews that do them, the personalities that
//! decide who takes what, and the tasks themselves.

mod crew;
mod ledger;
mod personality;
mod task;

pub use crew::{
    BANKRUPTCY_EPSILON, CREW_COMMISSION_RATE, Crew, CrewId, CrewPolicy, Member, MemberId,
};
pub use ledger::{Deposit, Person, PersonId};
pub use personality::{GUILTY_SALES_THRESHOLD, HIGH_PROFILE_THRESHOLD, Personality};
pub use task::{
    BLANK_KEY_MESSAGE, COLLECTION_KEY_MESSAGE, DEFAULT_AREA_VALUE_PER_UNIT,
    DEFAULT_COMMISSION_RATE, DEFAULT_INSTALLMENT_COUNT, Task, TaskId, TaskKind, TaskView,
    amount_to_repay, installment_value, purchase_cost,
};
