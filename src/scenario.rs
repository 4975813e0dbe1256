//! Scenario files: a TOML description of people, crews and tasks.
//!
//! A scenario is only ever read. It seeds a broker for a run:
//!
//! ```toml
//! [[person]]
//! name = "tony"
//! sales = 10000
//!
//! [[crew]]
//! name = "north side"
//! policy = "typical"
//! funds = 50
//! leader = { kind = "high-profile" }
//! members = [{ kind = "guilty" }]
//!
//! [[task]]
//! kind = "collect-money"
//! person = "tony"
//! date = "2024-06-15"
//! notify = true
//! ```
//!
//! Dates are quoted strings. Amounts and rates left out fall back to the
//! loaded [`Config`].

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use jiff::civil::Date;
use serde::Deserialize;

use crate::broker::Broker;
use crate::config::Config;
use crate::model::{
    Crew, CrewPolicy, Deposit, Member, Person, PersonId, Personality, Task, TaskKind,
};
use crate::notify::Observer;

/// Errors that can occur while loading a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid scenario: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("person '{0}' is declared twice")]
    DuplicatePerson(String),

    #[error("task refers to unknown person '{0}'")]
    UnknownPerson(String),
}

pub type Result<T> = core::result::Result<T, ScenarioError>;

/// People, crews and tasks to load into a broker.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Scenario {
    #[serde(default, rename = "person")]
    pub persons: Vec<PersonEntry>,

    #[serde(default, rename = "crew")]
    pub crews: Vec<CrewEntry>,

    #[serde(default, rename = "task")]
    pub tasks: Vec<TaskEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PersonEntry {
    pub name: String,
    #[serde(default)]
    pub sales: f64,
    #[serde(default)]
    pub debt: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrewEntry {
    pub name: String,
    pub policy: CrewPolicy,
    #[serde(default)]
    pub funds: f64,
    pub leader: Personality,
    #[serde(default)]
    pub members: Vec<Personality>,
    pub commission_rate: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TaskEntry {
    /// Name of the person the task targets.
    pub person: String,
    pub date: Date,
    /// Attach the completion notice observer.
    #[serde(default)]
    pub notify: bool,
    pub commission_rate: Option<f64>,
    #[serde(flatten)]
    pub details: TaskDetails,
}

/// Kind-specific task fields, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "kebab-case")]
pub enum TaskDetails {
    CollectMoney,
    OpenDeposit {
        area: u32,
        area_value_per_unit: Option<f64>,
    },
    LendMoney {
        amount: f64,
        installments: Option<u32>,
    },
    CollectDebt {
        amount: f64,
    },
}

impl TaskDetails {
    fn to_kind(&self, config: &Config) -> TaskKind {
        match *self {
            Self::CollectMoney => TaskKind::CollectMoney,
            Self::OpenDeposit {
                area,
                area_value_per_unit,
            } => TaskKind::OpenDeposit {
                deposit: Deposit::new(area),
                area_value_per_unit: area_value_per_unit.unwrap_or(config.area_value_per_unit),
            },
            Self::LendMoney {
                amount,
                installments,
            } => TaskKind::LendMoney {
                amount_to_lend: amount,
                installment_count: installments,
            },
            Self::CollectDebt { amount } => TaskKind::CollectDebt {
                amount_to_collect: amount,
            },
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        contents.parse()
    }

    /// Builds a broker holding everything in the scenario.
    ///
    /// Tasks marked `notify` get `observer` attached.
    pub fn build(&self, config: &Config, observer: &Rc<dyn Observer>) -> Result<Broker> {
        let mut broker = Broker::with_config(config.clone());

        let mut people: HashMap<&str, PersonId> = HashMap::new();
        for entry in &self.persons {
            let person = Person {
                sales_total: entry.sales,
                debt: entry.debt,
            };
            let id = broker.register_person(person);
            if people.insert(entry.name.as_str(), id).is_some() {
                return Err(ScenarioError::DuplicatePerson(entry.name.clone()));
            }
        }

        for entry in &self.crews {
            let mut crew = Crew::new(entry.policy, Member::new(entry.leader.clone()))
                .with_name(&entry.name)
                .with_funds(entry.funds)
                .with_commission_rate(entry.commission_rate.unwrap_or(config.crew_commission_rate));
            for personality in &entry.members {
                crew.add_member(Member::new(personality.clone()));
            }
            broker.register_crew(crew);
        }

        for entry in &self.tasks {
            let target = *people
                .get(entry.person.as_str())
                .ok_or_else(|| ScenarioError::UnknownPerson(entry.person.clone()))?;
            let mut task = Task::new(entry.details.to_kind(config), target)
                .on(entry.date)
                .with_commission_rate(
                    entry
                        .commission_rate
                        .unwrap_or(config.collection_commission_rate),
                );
            if entry.notify {
                task.add_observer(Rc::clone(observer));
            }
            broker.register_task(task);
        }

        Ok(broker)
    }
}

impl std::str::FromStr for Scenario {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
