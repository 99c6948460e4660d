//! Canned experiments on the assignment maze
//!
//! | Scenario | Maze | Learner |
//! |----------|------|---------|
//! | `a` | bounded | TD(0) evaluation of a hard-coded optimal policy |
//! | `b` | bounded | SARSA |
//! | `c` | bounded | Q-learning |
//! | `d` | stochastic, slip 0.1 | Q-learning |
//! | `e` | bounded | double Q-learning |
//! | `random` | random 5×7, stochastic | Q-learning |
//!
//! Every scenario except `random` trains the same agent twice: first with
//! γ = 1, then with a smaller discount (0.5 for `a`, 0.9 otherwise).

use std::{fmt, str::FromStr};

use colored::Colorize;
use rand::Rng;

use crate::{
    Error, Result,
    agents::{
        DoubleQAgent, LearningParams, QLearningAgent, SarsaAgent, TemporalDifferenceAgent,
        build_rng,
    },
    maze::{Coordinate, Maze, MazeKind},
    pipeline::{ProgressObserver, TrainingConfig, TrainingPipeline, TrainingResult},
    policy::HardcodedPolicy,
    ports::Learner,
    render,
    types::UnitInterval,
};

/// Assignment maze rewards, `rewards[x][y]`.
pub const ASSIGNMENT_REWARDS: [[f64; 4]; 4] = [
    [10.0, -1.0, -1.0, -1.0],
    [-2.0, -1.0, -1.0, -1.0],
    [-1.0, -1.0, -10.0, -1.0],
    [-1.0, -1.0, -10.0, 40.0],
];

pub const ASSIGNMENT_TERMINALS: [Coordinate; 2] = [Coordinate::new(0, 0), Coordinate::new(3, 3)];

pub const ASSIGNMENT_START: Coordinate = Coordinate::new(2, 0);

/// Optimal policy for the assignment maze, top row first.
pub const ASSIGNMENT_POLICY: [&str; 4] = ["RRRX", "UUUU", "UULL", "XUUU"];

pub const RANDOM_WIDTH: usize = 5;
pub const RANDOM_HEIGHT: usize = 7;
pub const RANDOM_TERMINALS: [Coordinate; 2] = [Coordinate::new(0, 0), Coordinate::new(2, 6)];
pub const RANDOM_START: Coordinate = Coordinate::new(4, 0);

const ALPHA: f64 = 0.1;
const EPSILON: f64 = 0.1;
const SLIP: f64 = 0.1;

/// The 4×4 maze used by scenarios `a` to `e`.
pub fn assignment_maze(kind: MazeKind) -> Result<Maze> {
    let rewards: Vec<Vec<f64>> = ASSIGNMENT_REWARDS.iter().map(|c| c.to_vec()).collect();
    let mut maze = Maze::new(4, 4, &rewards, kind)?;
    for terminal in ASSIGNMENT_TERMINALS {
        maze.set_terminal(terminal)?;
    }
    Ok(maze)
}

/// A 5×7 stochastic maze with integer rewards drawn from `[-10, 10)`.
pub fn random_maze(seed: Option<u64>) -> Result<Maze> {
    let mut rng = build_rng(seed);
    let rewards: Vec<Vec<f64>> = (0..RANDOM_WIDTH)
        .map(|_| {
            (0..RANDOM_HEIGHT)
                .map(|_| f64::from(rng.random_range(-10i32..10)))
                .collect()
        })
        .collect();
    let kind = MazeKind::Stochastic {
        slip: UnitInterval::new("slip", SLIP)?,
    };
    let mut maze = Maze::new(RANDOM_WIDTH, RANDOM_HEIGHT, &rewards, kind)?;
    for terminal in RANDOM_TERMINALS {
        maze.set_terminal(terminal)?;
    }
    Ok(maze)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioKind {
    A,
    B,
    C,
    D,
    E,
    Random,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 6] = [
        ScenarioKind::A,
        ScenarioKind::B,
        ScenarioKind::C,
        ScenarioKind::D,
        ScenarioKind::E,
        ScenarioKind::Random,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::A => "a",
            ScenarioKind::B => "b",
            ScenarioKind::C => "c",
            ScenarioKind::D => "d",
            ScenarioKind::E => "e",
            ScenarioKind::Random => "random",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScenarioKind::A => "TD(0) evaluation of the optimal policy",
            ScenarioKind::B => "SARSA",
            ScenarioKind::C => "Q-learning",
            ScenarioKind::D => "Q-learning in a stochastic maze",
            ScenarioKind::E => "Double Q-learning",
            ScenarioKind::Random => "Q-learning in a random stochastic maze",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScenarioKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        ScenarioKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| Error::UnknownScenario {
                input: s.to_string(),
                expected: ScenarioKind::ALL
                    .iter()
                    .map(|k| k.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// A rendered table with a heading.
#[derive(Debug, Clone)]
pub struct NamedTable {
    pub title: String,
    pub body: String,
}

impl NamedTable {
    fn new(title: impl Into<String>, body: impl fmt::Display) -> Self {
        Self {
            title: title.into(),
            body: body.to_string(),
        }
    }
}

/// One training phase of a scenario.
#[derive(Debug, Clone)]
pub struct PhaseReport {
    pub learner: String,
    pub alpha: f64,
    pub gamma: f64,
    /// `None` for learners that do not explore
    pub epsilon: Option<f64>,
    pub episodes: usize,
    pub result: TrainingResult,
    pub tables: Vec<NamedTable>,
}

impl PhaseReport {
    pub fn title(&self) -> String {
        let epsilon = self
            .epsilon
            .map(|e| format!(" ε={e}"))
            .unwrap_or_default();
        format!(
            "{}, α={}{} γ={} episodes={}",
            self.learner, self.alpha, epsilon, self.gamma, self.episodes
        )
    }
}

/// Everything a scenario run produced.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub kind: ScenarioKind,
    /// Layout and, where relevant, the policy being evaluated
    pub preamble: Vec<NamedTable>,
    pub phases: Vec<PhaseReport>,
}

fn banner(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    let rule = "─".repeat(title.chars().count() + 16);
    writeln!(f, "{}", rule.green())?;
    writeln!(f, "{}", format!("        {title}").green())?;
    writeln!(f, "{}", rule.green())
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for table in &self.preamble {
            banner(f, &table.title)?;
            writeln!(f, "{}", table.body)?;
        }
        for phase in &self.phases {
            banner(f, &phase.title())?;
            let r = &phase.result;
            writeln!(
                f,
                "mean return {:.3} | mean steps {:.2} | terminal rate {:.1}% | truncated {}",
                r.mean_return,
                r.mean_steps,
                r.terminal_rate * 100.0,
                r.truncated
            )?;
            for table in &phase.tables {
                writeln!(f, "{}", table.title.bold())?;
                writeln!(f, "{}", table.body)?;
            }
        }
        Ok(())
    }
}

/// A learner that a scenario can retrain with a new discount factor and
/// render afterwards.
trait PhasedLearner: Learner {
    fn as_learner(&mut self) -> &mut dyn Learner;
    fn set_discount(&mut self, gamma: f64) -> Result<()>;
    fn epsilon(&self) -> Option<f64>;
    fn tables(&self, maze: &Maze) -> Vec<NamedTable>;
}

impl PhasedLearner for TemporalDifferenceAgent {
    fn as_learner(&mut self) -> &mut dyn Learner {
        self
    }

    fn set_discount(&mut self, gamma: f64) -> Result<()> {
        self.set_params(self.alpha(), gamma)
    }

    fn epsilon(&self) -> Option<f64> {
        None
    }

    fn tables(&self, maze: &Maze) -> Vec<NamedTable> {
        vec![NamedTable::new(
            "Value matrix",
            render::value_table(maze, |c| self.value(c)),
        )]
    }
}

fn q_tables(maze: &Maze, table: &crate::agents::ActionValueTable) -> Vec<NamedTable> {
    let policy = table.derive_policy(maze);
    vec![
        NamedTable::new(
            "Q-value matrix",
            render::action_value_table(maze, |c| table.get(c), 2),
        ),
        policy_named("Policy derived from Q", maze, &policy),
    ]
}

fn policy_named(title: &str, maze: &Maze, policy: &HardcodedPolicy) -> NamedTable {
    NamedTable::new(
        title,
        render::policy_table(maze, |c| policy.get(c).flatten()),
    )
}

impl PhasedLearner for SarsaAgent {
    fn as_learner(&mut self) -> &mut dyn Learner {
        self
    }

    fn set_discount(&mut self, gamma: f64) -> Result<()> {
        self.set_gamma(gamma)
    }

    fn epsilon(&self) -> Option<f64> {
        Some(SarsaAgent::epsilon(self))
    }

    fn tables(&self, maze: &Maze) -> Vec<NamedTable> {
        q_tables(maze, self.table())
    }
}

impl PhasedLearner for QLearningAgent {
    fn as_learner(&mut self) -> &mut dyn Learner {
        self
    }

    fn set_discount(&mut self, gamma: f64) -> Result<()> {
        self.set_gamma(gamma)
    }

    fn epsilon(&self) -> Option<f64> {
        Some(QLearningAgent::epsilon(self))
    }

    fn tables(&self, maze: &Maze) -> Vec<NamedTable> {
        q_tables(maze, self.table())
    }
}

impl PhasedLearner for DoubleQAgent {
    fn as_learner(&mut self) -> &mut dyn Learner {
        self
    }

    fn set_discount(&mut self, gamma: f64) -> Result<()> {
        self.set_gamma(gamma)
    }

    fn epsilon(&self) -> Option<f64> {
        Some(DoubleQAgent::epsilon(self))
    }

    fn tables(&self, maze: &Maze) -> Vec<NamedTable> {
        let combined = self.combined();
        vec![
            NamedTable::new(
                "Q₁-value matrix",
                render::action_value_table(maze, |c| self.first().get(c), 2),
            ),
            NamedTable::new(
                "Q₂-value matrix",
                render::action_value_table(maze, |c| self.second().get(c), 2),
            ),
            policy_named(
                "Policy derived from Q₁ + Q₂",
                maze,
                &combined.derive_policy(maze),
            ),
        ]
    }
}

struct Runner {
    episodes: usize,
    seed: Option<u64>,
    show_progress: bool,
    start: Coordinate,
}

impl Runner {
    fn phase(
        &self,
        index: u64,
        learner: &mut dyn PhasedLearner,
        maze: &Maze,
        alpha: f64,
        gamma: f64,
    ) -> Result<PhaseReport> {
        learner.set_discount(gamma)?;
        let config = TrainingConfig {
            episodes: self.episodes,
            // Phases draw from distinct streams
            seed: self.seed.map(|s| s.wrapping_add(2 * index)),
            start: self.start,
            ..TrainingConfig::default()
        };

        let mut pipeline = TrainingPipeline::new(config);
        if self.show_progress {
            pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
        }

        tracing::info!(learner = learner.name(), gamma, "training phase");
        let result = pipeline.run(learner.as_learner(), maze)?;

        Ok(PhaseReport {
            learner: learner.name().to_string(),
            alpha,
            gamma,
            epsilon: learner.epsilon(),
            episodes: self.episodes,
            result,
            tables: learner.tables(maze),
        })
    }

    fn phases(
        &self,
        learner: &mut dyn PhasedLearner,
        maze: &Maze,
        gammas: &[f64],
    ) -> Result<Vec<PhaseReport>> {
        let mut reports = Vec::with_capacity(gammas.len());
        for (i, &gamma) in gammas.iter().enumerate() {
            reports.push(self.phase(i as u64, learner, maze, ALPHA, gamma)?);
        }
        Ok(reports)
    }
}

/// Run a scenario with `episodes` episodes per phase.
pub fn run_scenario(
    kind: ScenarioKind,
    episodes: usize,
    seed: Option<u64>,
    show_progress: bool,
) -> Result<ScenarioReport> {
    let mut runner = Runner {
        episodes,
        seed,
        show_progress,
        start: ASSIGNMENT_START,
    };
    let params = LearningParams::new(ALPHA, 1.0, EPSILON)?;
    let bounded = || assignment_maze(MazeKind::Bounded);
    let layout = |maze: &Maze, start: Coordinate| {
        NamedTable::new("Maze layout", render::maze_table(maze, Some(start)))
    };

    let (maze, preamble, phases) = match kind {
        ScenarioKind::A => {
            let maze = bounded()?;
            let policy = HardcodedPolicy::from_rows(&ASSIGNMENT_POLICY)?;
            let preamble = vec![
                layout(&maze, ASSIGNMENT_START),
                policy_named("Optimal policy", &maze, &policy),
            ];
            let mut agent = TemporalDifferenceAgent::new(Box::new(policy), ALPHA, 1.0)?;
            let phases = runner.phases(&mut agent, &maze, &[1.0, 0.5])?;
            (maze, preamble, phases)
        }
        ScenarioKind::B => {
            let maze = bounded()?;
            let mut agent = SarsaAgent::new(params);
            let phases = runner.phases(&mut agent, &maze, &[1.0, 0.9])?;
            (maze, Vec::new(), phases)
        }
        ScenarioKind::C => {
            let maze = bounded()?;
            let mut agent = QLearningAgent::new(params);
            let phases = runner.phases(&mut agent, &maze, &[1.0, 0.9])?;
            (maze, Vec::new(), phases)
        }
        ScenarioKind::D => {
            let maze = assignment_maze(MazeKind::Stochastic {
                slip: UnitInterval::new("slip", SLIP)?,
            })?;
            let mut agent = QLearningAgent::new(params);
            let phases = runner.phases(&mut agent, &maze, &[1.0, 0.9])?;
            (maze, Vec::new(), phases)
        }
        ScenarioKind::E => {
            let maze = bounded()?;
            let mut agent = DoubleQAgent::new(params);
            let phases = runner.phases(&mut agent, &maze, &[1.0, 0.9])?;
            (maze, Vec::new(), phases)
        }
        ScenarioKind::Random => {
            let maze = random_maze(seed)?;
            runner.start = RANDOM_START;
            let mut agent = QLearningAgent::new(params);
            let phases = runner.phases(&mut agent, &maze, &[1.0])?;
            (maze, Vec::new(), phases)
        }
    };

    let mut preamble = preamble;
    if preamble.is_empty() {
        preamble.push(layout(&maze, runner.start));
    }

    Ok(ScenarioReport {
        kind,
        preamble,
        phases,
    })
}
