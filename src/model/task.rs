//! Tasks: the jobs a broker hands out to crews each period.
//!
//! A task is one of four kinds. Each kind decides its own monetary effect
//! and how much it is worth to a crew, which is what personalities look at
//! when deciding whether to take it. The effect itself is applied by the
//! broker, since it is the only party that can move money between a task's
//! target, the crew and its own funds.

use std::fmt;
use std::rc::Rc;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::notify::Observer;

use super::crew::CrewId;
use super::ledger::{Deposit, Person, PersonId};

/// Share of the target's sales collected by a `CollectMoney` task.
pub const DEFAULT_COMMISSION_RATE: f64 = 0.1;

/// Price per square metre when buying a deposit.
pub const DEFAULT_AREA_VALUE_PER_UNIT: f64 = 100.0;

/// Number of repayments a loan is split into.
pub const DEFAULT_INSTALLMENT_COUNT: u32 = 4;

/// Code phrase sent when a collection is done.
pub const COLLECTION_KEY_MESSAGE: &str = "La puerca está en la posilga";

/// Key message for tasks that have none of their own.
pub const BLANK_KEY_MESSAGE: &str = " ";

/// Handle to a task registered with a broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub(crate) usize);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// What a task does when it is carried out.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskKind {
    /// Collect a commission on the target's sales. The crew gets the money.
    CollectMoney,

    /// Buy a deposit. The broker pays for it.
    OpenDeposit {
        deposit: Deposit,
        area_value_per_unit: f64,
    },

    /// Lend money to the target, who then owes twice as much.
    ///
    /// With no `installment_count`, the broker's configured count applies.
    LendMoney {
        amount_to_lend: f64,
        installment_count: Option<u32>,
    },

    /// Collect part of the target's debt. The crew gets the money.
    CollectDebt { amount_to_collect: f64 },
}

impl TaskKind {
    /// Short kebab-case label, used in reports and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CollectMoney => "collect-money",
            Self::OpenDeposit { .. } => "open-deposit",
            Self::LendMoney { .. } => "lend-money",
            Self::CollectDebt { .. } => "collect-debt",
        }
    }
}

/// A job for a crew, due in a given month.
///
/// Lifecycle: pending and unassigned, pending and assigned (any number of
/// reassignments), then completed. Completion is one-way.
pub struct Task {
    kind: TaskKind,

    /// Commission rate for collections. Ignored by other kinds.
    pub commission_rate: f64,

    /// When the task is due. Only month and year matter.
    pub date: Date,

    completed: bool,
    target: PersonId,
    assigned_crew: Option<CrewId>,
    observers: Vec<Rc<dyn Observer>>,
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("kind", &self.kind)
            .field("commission_rate", &self.commission_rate)
            .field("date", &self.date)
            .field("completed", &self.completed)
            .field("target", &self.target)
            .field("assigned_crew", &self.assigned_crew)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Task {
    /// Creates a pending task dated today.
    pub fn new(kind: TaskKind, target: PersonId) -> Self {
        Self {
            kind,
            commission_rate: DEFAULT_COMMISSION_RATE,
            date: jiff::Zoned::now().date(),
            completed: false,
            target,
            assigned_crew: None,
            observers: Vec::new(),
        }
    }

    pub fn collect_money(target: PersonId) -> Self {
        Self::new(TaskKind::CollectMoney, target)
    }

    pub fn open_deposit(target: PersonId, deposit: Deposit) -> Self {
        Self::new(
            TaskKind::OpenDeposit {
                deposit,
                area_value_per_unit: DEFAULT_AREA_VALUE_PER_UNIT,
            },
            target,
        )
    }

    pub fn lend_money(target: PersonId, amount_to_lend: f64) -> Self {
        Self::new(
            TaskKind::LendMoney {
                amount_to_lend,
                installment_count: None,
            },
            target,
        )
    }

    pub fn collect_debt(target: PersonId, amount_to_collect: f64) -> Self {
        Self::new(TaskKind::CollectDebt { amount_to_collect }, target)
    }

    /// Sets the due date.
    #[must_use]
    pub fn on(mut self, date: Date) -> Self {
        self.date = date;
        self
    }

    #[must_use]
    pub fn with_commission_rate(mut self, rate: f64) -> Self {
        self.commission_rate = rate;
        self
    }

    /// Fixes how many repayments a loan is split into. Other kinds ignore it.
    #[must_use]
    pub fn with_installments(mut self, count: u32) -> Self {
        if let TaskKind::LendMoney {
            installment_count, ..
        } = &mut self.kind
        {
            *installment_count = Some(count);
        }
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Rc<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    pub fn target(&self) -> PersonId {
        self.target
    }

    pub fn assigned_crew(&self) -> Option<CrewId> {
        self.assigned_crew
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn observers(&self) -> &[Rc<dyn Observer>] {
        &self.observers
    }

    pub fn add_observer(&mut self, observer: Rc<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Whether the task still has to be done in the month of `date`.
    ///
    /// The day of the month is ignored.
    pub fn is_pending_for(&self, date: Date) -> bool {
        !self.completed && self.date.year() == date.year() && self.date.month() == date.month()
    }

    /// Hands the task to a crew, replacing any previous assignment.
    pub fn assign_crew(&mut self, crew: CrewId) {
        self.assigned_crew = Some(crew);
    }

    pub(crate) fn mark_completed(&mut self) {
        self.completed = true;
    }

    /// How much a `CollectMoney` task takes from the target.
    pub fn collection_amount(&self, target: &Person) -> f64 {
        target.sales_total * self.commission_rate
    }

    /// How much the task is worth to the crew that does it.
    pub fn money_to_earn(&self, target: &Person) -> f64 {
        match self.kind {
            TaskKind::CollectMoney => self.collection_amount(target),
            TaskKind::CollectDebt { amount_to_collect } => amount_to_collect,
            TaskKind::OpenDeposit { .. } | TaskKind::LendMoney { .. } => 0.0,
        }
    }

    /// Whole amount reported when the task is done.
    #[allow(clippy::cast_possible_truncation)]
    pub fn amount(&self, target: &Person) -> i64 {
        match self.kind {
            TaskKind::CollectMoney => self.collection_amount(target) as i64,
            TaskKind::OpenDeposit {
                deposit,
                area_value_per_unit,
            } => purchase_cost(deposit, area_value_per_unit) as i64,
            TaskKind::LendMoney { .. } | TaskKind::CollectDebt { .. } => 0,
        }
    }

    pub fn key_message(&self) -> &'static str {
        match self.kind {
            TaskKind::CollectMoney => COLLECTION_KEY_MESSAGE,
            _ => BLANK_KEY_MESSAGE,
        }
    }
}

/// What the broker pays for a deposit.
pub fn purchase_cost(deposit: Deposit, area_value_per_unit: f64) -> f64 {
    area_value_per_unit * f64::from(deposit.area)
}

/// Total a borrower owes back for a loan.
pub fn amount_to_repay(amount_to_lend: f64) -> f64 {
    amount_to_lend * 2.0
}

/// Value of one repayment when a loan is split into `installment_count` parts.
pub fn installment_value(amount_to_lend: f64, installment_count: u32) -> f64 {
    amount_to_repay(amount_to_lend) / f64::from(installment_count)
}

/// A task read together with the person it targets.
///
/// Everything that judges a task (personalities, crews, observers) needs
/// both, so they travel as a pair.
#[derive(Debug, Clone, Copy)]
pub struct TaskView<'a> {
    task: &'a Task,
    target: &'a Person,
}

impl<'a> TaskView<'a> {
    pub fn new(task: &'a Task, target: &'a Person) -> Self {
        Self { task, target }
    }

    pub fn task(&self) -> &'a Task {
        self.task
    }

    pub fn target(&self) -> &'a Person {
        self.target
    }

    pub fn date(&self) -> Date {
        self.task.date
    }

    pub fn money_to_earn(&self) -> f64 {
        self.task.money_to_earn(self.target)
    }

    pub fn amount(&self) -> i64 {
        self.task.amount(self.target)
    }

    pub fn key_message(&self) -> &'static str {
        self.task.key_message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    fn someone() -> PersonId {
        PersonId(0)
    }

    #[test]
    fn pending_matches_month_and_year_only() {
        let task = Task::collect_money(someone()).on(date(2024, 6, 15));

        assert!(task.is_pending_for(date(2024, 6, 1)));
        assert!(task.is_pending_for(date(2024, 6, 30)));
        assert!(!task.is_pending_for(date(2024, 7, 15)));
        assert!(!task.is_pending_for(date(2023, 6, 15)));
    }

    #[test]
    fn pending_is_stable_until_completed() {
        let mut task = Task::collect_money(someone()).on(date(2024, 6, 15));
        let day = date(2024, 6, 20);

        assert_eq!(task.is_pending_for(day), task.is_pending_for(day));
        assert!(task.is_pending_for(day));

        task.mark_completed();
        assert!(!task.is_pending_for(day));
        assert!(!task.is_pending_for(day));
    }

    #[test]
    fn reassignment_overwrites() {
        let mut task = Task::collect_money(someone());
        assert_eq!(task.assigned_crew(), None);

        task.assign_crew(CrewId(0));
        task.assign_crew(CrewId(3));
        assert_eq!(task.assigned_crew(), Some(CrewId(3)));
    }

    #[test]
    fn collection_is_worth_its_commission() {
        let person = Person::new(10_000.0);
        let task = Task::collect_money(someone()).with_commission_rate(0.1);

        assert_eq!(task.money_to_earn(&person), 1000.0);
        assert_eq!(task.amount(&person), 1000);
        assert_eq!(task.key_message(), COLLECTION_KEY_MESSAGE);
    }

    #[test]
    fn collection_amount_is_truncated() {
        let person = Person::new(1_239.0);
        let task = Task::collect_money(someone());

        assert_eq!(task.amount(&person), 123);
    }

    #[test]
    fn deposit_amount_is_its_cost() {
        let person = Person::default();
        let task = Task::open_deposit(someone(), Deposit::new(30));

        assert_eq!(task.money_to_earn(&person), 0.0);
        assert_eq!(task.amount(&person), 3000);
        assert_eq!(task.key_message(), BLANK_KEY_MESSAGE);
    }

    #[test]
    fn loans_and_debts_report_no_amount() {
        let person = Person::default();
        let loan = Task::lend_money(someone(), 500.0);
        let debt = Task::collect_debt(someone(), 1500.0);

        assert_eq!(loan.money_to_earn(&person), 0.0);
        assert_eq!(loan.amount(&person), 0);
        assert_eq!(debt.money_to_earn(&person), 1500.0);
        assert_eq!(debt.amount(&person), 0);
    }

    #[test]
    fn loans_take_an_installment_count_only_when_given() {
        let loan = Task::lend_money(someone(), 500.0);
        assert_eq!(
            *loan.kind(),
            TaskKind::LendMoney {
                amount_to_lend: 500.0,
                installment_count: None,
            }
        );

        let loan = loan.with_installments(2);
        assert_eq!(
            *loan.kind(),
            TaskKind::LendMoney {
                amount_to_lend: 500.0,
                installment_count: Some(2),
            }
        );

        let debt = Task::collect_debt(someone(), 10.0).with_installments(2);
        assert_eq!(
            *debt.kind(),
            TaskKind::CollectDebt {
                amount_to_collect: 10.0
            }
        );
    }

    #[test]
    fn loan_installments_split_the_repayment() {
        assert_eq!(amount_to_repay(500.0), 1000.0);
        assert_eq!(installment_value(500.0, DEFAULT_INSTALLMENT_COUNT), 250.0);
    }
}
