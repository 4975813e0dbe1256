//! Personalities: whether a crew member is willing to take a task.

use serde::{Deserialize, Serialize};

use super::task::TaskView;

/// A high-profile member takes tasks worth at least this much.
pub const HIGH_PROFILE_THRESHOLD: f64 = 1000.0;

/// A guilty member takes tasks against people who sold more than this.
pub const GUILTY_SALES_THRESHOLD: f64 = 5000.0;

/// How a crew member decides whether to take a task.
///
/// Evaluation is pure and never cached: the same task may be judged
/// differently once its target's sales or its date change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Personality {
    /// Only takes tasks that pay well.
    HighProfile,

    /// Only goes after people who sell a lot.
    Guilty,

    /// Guilty in even months, high-profile in odd ones.
    Alternating,

    /// Takes a task only if every part agrees. No parts means yes.
    Combined { parts: Vec<Personality> },
}

impl Personality {
    pub fn combined(parts: impl IntoIterator<Item = Personality>) -> Self {
        Self::Combined {
            parts: parts.into_iter().collect(),
        }
    }

    pub fn wants(&self, task: &TaskView<'_>) -> bool {
        match self {
            Self::HighProfile => task.money_to_earn() >= HIGH_PROFILE_THRESHOLD,
            Self::Guilty => task.target().sales_total > GUILTY_SALES_THRESHOLD,
            Self::Alternating => Self::alternate_for(task).wants(task),
            Self::Combined { parts } => parts.iter().all(|part| part.wants(task)),
        }
    }

    /// The personality an alternating member shows for this task's month.
    fn alternate_for(task: &TaskView<'_>) -> Self {
        if task.date().month() % 2 == 0 {
            Self::Guilty
        } else {
            Self::HighProfile
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    use crate::model::{Person, PersonId, Task};

    fn collection(sales: f64) -> (Task, Person) {
        (Task::collect_money(PersonId(0)), Person::new(sales))
    }

    #[test]
    fn high_profile_needs_a_thousand() {
        let (task, rich) = collection(10_000.0);
        assert!(Personality::HighProfile.wants(&TaskView::new(&task, &rich)));

        let (task, poor) = collection(9_999.0);
        assert!(!Personality::HighProfile.wants(&TaskView::new(&task, &poor)));
    }

    #[test]
    fn guilty_needs_sales_above_five_thousand() {
        let (task, seller) = collection(5_001.0);
        assert!(Personality::Guilty.wants(&TaskView::new(&task, &seller)));

        let (task, borderline) = collection(5_000.0);
        assert!(!Personality::Guilty.wants(&TaskView::new(&task, &borderline)));
    }

    #[test]
    fn alternating_switches_with_the_month() {
        // Worth 600, target sold 6000: guilty yes, high-profile no.
        let seller = Person::new(6_000.0);
        let even = Task::collect_money(PersonId(0)).on(date(2024, 6, 10));
        let odd = Task::collect_money(PersonId(0)).on(date(2024, 7, 10));

        assert!(Personality::Alternating.wants(&TaskView::new(&even, &seller)));
        assert!(!Personality::Alternating.wants(&TaskView::new(&odd, &seller)));

        // Worth 2000, target sold nothing: guilty no, high-profile yes.
        let nobody = Person::new(0.0);
        let even = Task::collect_debt(PersonId(0), 2_000.0).on(date(2024, 2, 1));
        let odd = Task::collect_debt(PersonId(0), 2_000.0).on(date(2024, 3, 1));

        assert!(!Personality::Alternating.wants(&TaskView::new(&even, &nobody)));
        assert!(Personality::Alternating.wants(&TaskView::new(&odd, &nobody)));
    }

    #[test]
    fn combined_without_parts_wants_anything() {
        let (task, nobody) = collection(0.0);
        let view = TaskView::new(&task, &nobody);

        assert!(Personality::combined([]).wants(&view));
    }

    #[test]
    fn combined_needs_every_part() {
        let picky = Personality::combined([Personality::HighProfile, Personality::Guilty]);

        let (task, rich) = collection(10_000.0);
        assert!(picky.wants(&TaskView::new(&task, &rich)));

        let (task, middling) = collection(6_000.0);
        assert!(!picky.wants(&TaskView::new(&task, &middling)));
    }

    #[test]
    fn deserializes_nested_parts() {
        let personality: Personality = serde_json::from_str(
            r#"{"kind":"combined","parts":[{"kind":"guilty"},{"kind":"alternating"}]}"#,
        )
        .unwrap();

        assert_eq!(
            personality,
            Personality::combined([Personality::Guilty, Personality::Alternating])
        );
    }
}
