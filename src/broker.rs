//! The broker: hands out each period's tasks and keeps the books.
//!
//! A broker owns every person, crew and task in a run. Each period it
//! picks the tasks due that month, gives each to the first crew (in
//! registration order) that is solvent and willing, and then carries them
//! out. It is the only party that pays money out, and it receives whatever
//! crews do not keep of their collections.
//!
//! Everything here is single-threaded. Observers are shared with `Rc`, so a
//! broker never leaves the thread that built it.

use jiff::ToSpan;
use jiff::civil::Date;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::model::{
    Crew, CrewId, Person, PersonId, Task, TaskId, TaskKind, TaskView, amount_to_repay,
    installment_value, purchase_cost,
};
use crate::notify::TransportError;

/// Errors that can occur while running a period.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("no crew can take {task} pending on {date}")]
    NoEligibleCrew { task: TaskId, date: Date },

    #[error("{0} has no crew assigned")]
    Unassigned(TaskId),

    #[error("unknown task: {0}")]
    UnknownTask(TaskId),

    #[error("unknown crew: {0}")]
    UnknownCrew(CrewId),

    #[error("unknown person: {0}")]
    UnknownPerson(PersonId),

    #[error("notification failed: {0}")]
    Transport(#[from] TransportError),

    #[error("date arithmetic failed: {0}")]
    Date(#[from] jiff::Error),
}

pub type Result<T> = core::result::Result<T, BrokerError>;

/// What happened in one period.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub date: Date,
    pub assignments: Vec<Assignment>,
    pub executed: usize,
    pub total_funds: f64,
    pub crews: Vec<CrewBalance>,
}

/// A task and the crew it went to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub task: TaskId,
    pub kind: &'static str,
    pub crew: CrewId,
}

/// A crew's purse at the end of a period.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewBalance {
    pub crew: CrewId,
    pub name: String,
    pub accumulated: f64,
    pub bankrupt: bool,
}

/// Registry of persons, crews and tasks, and the funds that tie them together.
#[derive(Debug, Default)]
pub struct Broker {
    persons: Vec<Person>,
    crews: Vec<Crew>,
    tasks: Vec<Task>,
    total_funds: f64,
    config: Config,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ── Registries ──

    pub fn register_person(&mut self, person: Person) -> PersonId {
        self.persons.push(person);
        PersonId(self.persons.len() - 1)
    }

    pub fn register_crew(&mut self, crew: Crew) -> CrewId {
        self.crews.push(crew);
        let id = CrewId(self.crews.len() - 1);
        debug!(crew = %id, "crew registered");
        id
    }

    /// Adds a task. No checks: the same work can be registered twice.
    pub fn register_task(&mut self, task: Task) -> TaskId {
        self.tasks.push(task);
        let id = TaskId(self.tasks.len() - 1);
        debug!(task = %id, "task registered");
        id
    }

    pub fn person(&self, id: PersonId) -> Result<&Person> {
        self.persons.get(id.0).ok_or(BrokerError::UnknownPerson(id))
    }

    pub fn person_mut(&mut self, id: PersonId) -> Result<&mut Person> {
        self.persons
            .get_mut(id.0)
            .ok_or(BrokerError::UnknownPerson(id))
    }

    pub fn crew(&self, id: CrewId) -> Result<&Crew> {
        self.crews.get(id.0).ok_or(BrokerError::UnknownCrew(id))
    }

    pub fn crew_mut(&mut self, id: CrewId) -> Result<&mut Crew> {
        self.crews.get_mut(id.0).ok_or(BrokerError::UnknownCrew(id))
    }

    pub fn task(&self, id: TaskId) -> Result<&Task> {
        self.tasks.get(id.0).ok_or(BrokerError::UnknownTask(id))
    }

    pub fn task_mut(&mut self, id: TaskId) -> Result<&mut Task> {
        self.tasks.get_mut(id.0).ok_or(BrokerError::UnknownTask(id))
    }

    pub fn crews(&self) -> impl Iterator<Item = (CrewId, &Crew)> {
        self.crews.iter().enumerate().map(|(i, c)| (CrewId(i), c))
    }

    pub fn tasks(&self) -> impl Iterator<Item = (TaskId, &Task)> {
        self.tasks.iter().enumerate().map(|(i, t)| (TaskId(i), t))
    }

    /// A task together with the person it targets.
    pub fn view(&self, id: TaskId) -> Result<TaskView<'_>> {
        let task = self.task(id)?;
        let target = self.person(task.target())?;
        Ok(TaskView::new(task, target))
    }

    // ── Funds ──

    pub fn total_funds(&self) -> f64 {
        self.total_funds
    }

    /// Pays money out. The broker may go into deficit.
    pub fn pay(&mut self, amount: f64) {
        self.total_funds -= amount;
        debug!(amount, total_funds = self.total_funds, "broker paid");
        if self.total_funds < 0.0 {
            warn!(total_funds = self.total_funds, "broker funds in deficit");
        }
    }

    pub fn receive_funds(&mut self, amount: f64) {
        self.total_funds += amount;
        debug!(amount, total_funds = self.total_funds, "broker received");
    }

    // ── Periods ──

    /// Tasks due in the month of `date` and not yet done, in registration order.
    pub fn pending_tasks_for(&self, date: Date) -> Vec<TaskId> {
        self.tasks()
            .filter(|(_, task)| task.is_pending_for(date))
            .map(|(id, _)| id)
            .collect()
    }

    /// The first crew, in registration order, that can take the task.
    pub fn first_eligible_crew(&self, id: TaskId) -> Result<Option<CrewId>> {
        let view = self.view(id)?;
        Ok(self
            .crews()
            .find(|(_, crew)| crew.can_perform(&view))
            .map(|(crew_id, _)| crew_id))
    }

    /// Gives every pending task to the first crew that can take it.
    ///
    /// Stops at the first task nobody can take. Tasks before it keep the
    /// crew they were just given.
    pub fn assign_tasks(&mut self, date: Date) -> Result<()> {
        for id in self.pending_tasks_for(date) {
            let crew = self
                .first_eligible_crew(id)?
                .ok_or(BrokerError::NoEligibleCrew { task: id, date })?;
            self.task_mut(id)?.assign_crew(crew);
            info!(task = %id, crew = %crew, "task assigned");
        }
        Ok(())
    }

    /// Carries out every task still pending for `date`.
    ///
    /// Returns how many tasks were carried out.
    pub fn execute_tasks(&mut self, date: Date) -> Result<usize> {
        let mut executed = 0;
        for id in self.pending_tasks_for(date) {
            if self.execute(id)? {
                executed += 1;
            }
        }
        Ok(executed)
    }

    /// Carries out a task: apply its effect, mark it done, tell its observers.
    ///
    /// A task that is already done is left alone and `false` is returned.
    /// If an observer fails, the effect and the completion stand and the
    /// error is returned; later observers are not called.
    pub fn execute(&mut self, id: TaskId) -> Result<bool> {
        if self.task(id)?.is_completed() {
            debug!(task = %id, "task already completed, skipping");
            return Ok(false);
        }

        self.perform_effect(id)?;
        self.task_mut(id)?.mark_completed();
        info!(task = %id, "task completed");

        self.notify_observers(id)?;
        Ok(true)
    }

    /// Assigns and carries out everything due in the month of `date`.
    pub fn run_period(&mut self, date: Date) -> Result<PeriodReport> {
        let pending = self.pending_tasks_for(date);
        self.assign_tasks(date)?;

        let mut assignments = Vec::with_capacity(pending.len());
        for id in pending {
            let task = self.task(id)?;
            let crew = task.assigned_crew().ok_or(BrokerError::Unassigned(id))?;
            assignments.push(Assignment {
                task: id,
                kind: task.kind().label(),
                crew,
            });
        }

        let executed = self.execute_tasks(date)?;

        Ok(PeriodReport {
            date,
            assignments,
            executed,
            total_funds: self.total_funds,
            crews: self
                .crews()
                .map(|(id, crew)| CrewBalance {
                    crew: id,
                    name: crew.name.clone(),
                    accumulated: crew.accumulated(),
                    bankrupt: crew.is_bankrupt(),
                })
                .collect(),
        })
    }

    fn perform_effect(&mut self, id: TaskId) -> Result<()> {
        let view = self.view(id)?;
        let task = view.task();
        let target = task.target();
        let crew = task.assigned_crew();
        let date = task.date;
        let collection = task.collection_amount(view.target());
        let kind = task.kind().clone();

        match kind {
            TaskKind::CollectMoney => {
                let crew = crew.ok_or(BrokerError::Unassigned(id))?;
                self.collect(crew, collection)?;
            }
            TaskKind::OpenDeposit {
                deposit,
                area_value_per_unit,
            } => {
                self.pay(purchase_cost(deposit, area_value_per_unit));
            }
            TaskKind::LendMoney {
                amount_to_lend,
                installment_count,
            } => {
                self.pay(amount_to_lend);
                self.person_mut(target)?
                    .add_debt(amount_to_repay(amount_to_lend));
                if self.config.generate_installments {
                    let count = installment_count.unwrap_or(self.config.installment_count);
                    self.schedule_installments(target, date, amount_to_lend, count)?;
                }
            }
            TaskKind::CollectDebt { amount_to_collect } => {
                let crew = crew.ok_or(BrokerError::Unassigned(id))?;
                self.collect(crew, amount_to_collect)?;
                self.person_mut(target)?.reduce_debt(amount_to_collect);
            }
        }
        Ok(())
    }

    /// Routes a collection through a crew: it keeps its cut, the rest comes here.
    fn collect(&mut self, crew: CrewId, amount: f64) -> Result<()> {
        let broker_share = self.crew_mut(crew)?.receive_collection(amount);
        debug!(crew = %crew, amount, broker_share, "collection split");
        self.receive_funds(broker_share);
        Ok(())
    }

    /// Registers one debt collection per repayment, a month apart, starting
    /// the month after the loan.
    fn schedule_installments(
        &mut self,
        target: PersonId,
        loan_date: Date,
        amount_to_lend: f64,
        installment_count: u32,
    ) -> Result<()> {
        if installment_count == 0 {
            return Ok(());
        }
        let value = installment_value(amount_to_lend, installment_count);
        for n in 1..=installment_count {
            let due = loan_date.checked_add(i64::from(n).months())?;
            let id = self.register_task(Task::collect_debt(target, value).on(due));
            debug!(task = %id, %due, value, "installment scheduled");
        }
        Ok(())
    }

    fn notify_observers(&self, id: TaskId) -> Result<()> {
        let view = self.view(id)?;
        for observer in view.task().observers() {
            observer.notify(&view)?;
        }
        Ok(())
    }
}
