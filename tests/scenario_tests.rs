//! Every canned scenario runs and reports its phases.

use mazerl::scenarios::{ScenarioKind, run_scenario};

#[test]
fn every_scenario_runs() {
    colored::control::set_override(false);

    for kind in ScenarioKind::ALL {
        let report = run_scenario(kind, 15, Some(21), false).unwrap();
        let expected_phases = if kind == ScenarioKind::Random { 1 } else { 2 };
        assert_eq!(report.phases.len(), expected_phases, "scenario {kind}");

        for phase in &report.phases {
            assert_eq!(phase.result.episodes, 15);
            assert_eq!(phase.episodes, 15);
            assert!(!phase.tables.is_empty());
        }
        assert!(report.to_string().contains(&report.phases[0].title()));
    }
}

#[test]
fn learners_keep_their_tables_across_phases() {
    let report = run_scenario(ScenarioKind::C, 200, Some(4), false).unwrap();
    let [first, second] = report.phases.as_slice() else {
        panic!("expected two phases");
    };
    assert_eq!(first.learner, second.learner);
    assert_eq!(first.gamma, 1.0);
    assert_eq!(second.gamma, 0.9);
    assert_eq!(second.epsilon, Some(0.1));
}

#[test]
fn seeded_scenarios_are_reproducible() {
    let a = run_scenario(ScenarioKind::D, 30, Some(8), false).unwrap();
    let b = run_scenario(ScenarioKind::D, 30, Some(8), false).unwrap();
    for (x, y) in a.phases.iter().zip(&b.phases) {
        assert_eq!(x.result, y.result);
    }
}
