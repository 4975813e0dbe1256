//! Output formatting for CLI display.

use vito::broker::{PeriodReport, Result as BrokerResult};
use vito::model::{CrewId, TaskId};
use vito::Broker;

fn crew_name(broker: &Broker, id: CrewId) -> &str {
    broker.crew(id).map_or("?", |c| c.name.as_str())
}

/// Format a period report for human-readable display.
pub(super) fn format_report(broker: &Broker, report: &PeriodReport) -> String {
    let mut lines = vec![format!(
        "{}: {} task(s) carried out",
        report.date.strftime("%Y-%m"),
        report.executed
    )];

    lines.extend(report.assignments.iter().map(|a| {
        format!(
            "  {:<8} {:<14} → {} ({})",
            a.task.to_string(),
            a.kind,
            a.crew,
            crew_name(broker, a.crew)
        )
    }));

    lines.push("Crews:".to_string());
    lines.extend(report.crews.iter().map(|c| {
        let flag = if c.bankrupt { "  [bankrupt]" } else { "" };
        format!(
            "  {:<8} {:<16} {:>12.2}{flag}",
            c.crew.to_string(),
            c.name,
            c.accumulated
        )
    }));

    lines.push(format!("Broker funds: {:.2}", report.total_funds));
    lines.join("\n") + "\n"
}

/// Format the tasks due in a period and the crew that would take each.
pub(super) fn format_pending(broker: &Broker, pending: &[TaskId]) -> BrokerResult<String> {
    let mut out = String::new();
    for &id in pending {
        let view = broker.view(id)?;
        let taker = match broker.first_eligible_crew(id)? {
            Some(crew) => format!("{crew} ({})", crew_name(broker, crew)),
            None => "no eligible crew".to_string(),
        };
        out.push_str(&format!(
            "  {:<8} {:<14} worth {:>10.2}  → {taker}\n",
            id.to_string(),
            view.task().kind().label(),
            view.money_to_earn()
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;
    use vito::model::{Crew, Member, Person, Personality, Task};

    fn broker_with_one_collection() -> Broker {
        let mut broker = Broker::new();
        let person = broker.register_person(Person::new(10_000.0));
        broker.register_crew(
            Crew::typical(Member::new(Personality::HighProfile))
                .with_name("docks")
                .with_funds(10.0),
        );
        broker.register_task(Task::collect_money(person).on(date(2024, 6, 3)));
        broker
    }

    #[test]
    fn pending_names_the_taker() {
        let broker = broker_with_one_collection();
        let pending = broker.pending_tasks_for(date(2024, 6, 1));

        let out = format_pending(&broker, &pending).unwrap();
        assert!(out.contains("collect-money"));
        assert!(out.contains("crew#0 (docks)"));
    }

    #[test]
    fn report_lists_balances_and_funds() {
        let mut broker = broker_with_one_collection();
        let report = broker.run_period(date(2024, 6, 1)).unwrap();

        let out = format_report(&broker, &report);
        assert!(out.starts_with("2024-06: 1 task(s) carried out"));
        assert!(out.contains("210.00"));
        assert!(out.contains("Broker funds: 800.00"));
    }

    #[test]
    fn report_has_one_line_per_entry() {
        let mut broker = broker_with_one_collection();
        broker.register_crew(
            Crew::typical(Member::new(Personality::Guilty)).with_name("broke"),
        );
        let report = broker.run_period(date(2024, 6, 1)).unwrap();

        let out = format_report(&broker, &report);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[1].contains("→ crew#0 (docks)"));
        assert_eq!(lines[2], "Crews:");
        assert!(lines[4].ends_with("[bankrupt]"));
        assert!(out.ends_with("Broker funds: 800.00\n"));
    }

    #[test]
    fn pending_without_a_taker_says_so() {
        let mut broker = Broker::new();
        let person = broker.register_person(Person::new(10_000.0));
        broker.register_task(Task::collect_money(person).on(date(2024, 6, 3)));
        let pending = broker.pending_tasks_for(date(2024, 6, 1));

        let out = format_pending(&broker, &pending).unwrap();
        assert_eq!(out.lines().count(), 1);
        assert!(out.ends_with("→ no eligible crew\n"));
    }
}
