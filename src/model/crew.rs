//! Crews: the groups that carry out tasks and keep a cut of what they collect.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::personality::Personality;
use super::task::TaskView;

/// Share of every collection a crew keeps for itself.
pub const CREW_COMMISSION_RATE: f64 = 0.2;

/// Below this a crew's balance counts as nothing collected.
pub const BANKRUPTCY_EPSILON: f64 = 1e-9;

/// Handle to a crew registered with a broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrewId(pub(crate) usize);

impl fmt::Display for CrewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "crew#{}", self.0)
    }
}

/// Identity of a crew member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(Uuid);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// A crew member. Its personality can be swapped at any time.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    id: MemberId,
    pub personality: Personality,
}

impl Member {
    pub fn new(personality: Personality) -> Self {
        Self {
            id: MemberId(Uuid::new_v4()),
            personality,
        }
    }

    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn wants(&self, task: &TaskView<'_>) -> bool {
        self.personality.wants(task)
    }
}

/// Who in a crew gets a say on taking a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrewPolicy {
    /// Any member can sign the crew up.
    Outlaw,

    /// Only the leader decides.
    Typical,
}

/// A group of members with a leader and a common purse.
#[derive(Debug, Clone)]
pub struct Crew {
    pub name: String,
    policy: CrewPolicy,
    accumulated: f64,
    commission_rate: f64,
    members: Vec<Member>,
    leader: Member,
}

impl Crew {
    /// Creates an empty-handed crew. The leader is not added as a member.
    pub fn new(policy: CrewPolicy, leader: Member) -> Self {
        Self {
            name: String::new(),
            policy,
            accumulated: 0.0,
            commission_rate: CREW_COMMISSION_RATE,
            members: Vec::new(),
            leader,
        }
    }

    pub fn outlaw(leader: Member) -> Self {
        Self::new(CrewPolicy::Outlaw, leader)
    }

    pub fn typical(leader: Member) -> Self {
        Self::new(CrewPolicy::Typical, leader)
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Starts the crew with money already in its purse.
    #[must_use]
    pub fn with_funds(mut self, funds: f64) -> Self {
        self.accumulated = funds;
        self
    }

    #[must_use]
    pub fn with_commission_rate(mut self, rate: f64) -> Self {
        self.commission_rate = rate;
        self
    }

    #[must_use]
    pub fn with_member(mut self, member: Member) -> Self {
        self.add_member(member);
        self
    }

    pub fn policy(&self) -> CrewPolicy {
        self.policy
    }

    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    pub fn commission_rate(&self) -> f64 {
        self.commission_rate
    }

    pub fn leader(&self) -> &Member {
        &self.leader
    }

    pub fn leader_mut(&mut self) -> &mut Member {
        &mut self.leader
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member_mut(&mut self, id: MemberId) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.id == id)
    }

    /// Adds a member. Returns `false` if they were already in the crew.
    pub fn add_member(&mut self, member: Member) -> bool {
        if self.members.iter().any(|m| m.id == member.id) {
            return false;
        }
        self.members.push(member);
        true
    }

    pub fn remove_member(&mut self, id: MemberId) -> Option<Member> {
        let index = self.members.iter().position(|m| m.id == id)?;
        Some(self.members.remove(index))
    }

    /// A crew that has never collected anything is bankrupt.
    pub fn is_bankrupt(&self) -> bool {
        self.accumulated.abs() < BANKRUPTCY_EPSILON
    }

    pub fn is_willing(&self, task: &TaskView<'_>) -> bool {
        match self.policy {
            CrewPolicy::Outlaw => self.members.iter().any(|m| m.wants(task)),
            CrewPolicy::Typical => self.leader.wants(task),
        }
    }

    pub fn can_perform(&self, task: &TaskView<'_>) -> bool {
        !self.is_bankrupt() && self.is_willing(task)
    }

    /// The part of `amount` the crew keeps.
    pub fn crew_share(&self, amount: f64) -> f64 {
        amount * self.commission_rate
    }

    /// Keeps the crew's cut of a collection and returns what is left for the broker.
    pub(crate) fn receive_collection(&mut self, amount: f64) -> f64 {
        let share = self.crew_share(amount);
        self.accumulated += share;
        amount - share
    }
}
