//! Advisor strategies: the `{prioritize, analyze}` capability seam.
//!
//! A hosted model (or any other strategy) plugs in behind [`TaskAdvisor`].
//! [`DeterministicAdvisor`] is the local engine; [`FallbackAdvisor`] wraps an
//! advisor that may be unavailable and answers with the local engine
//! whenever it errors or returns something that breaks the contract.

use crate::analyzer::{Analyzer, ProductivityAnalysis};
use crate::error::Result;
use crate::prioritizer::{is_permutation_of, prioritize};
use crate::task::Task;

pub trait TaskAdvisor {
    fn name(&self) -> &str;

    /// Must return a permutation of `tasks`.
    fn prioritize(&self, tasks: &[Task]) -> Result<Vec<Task>>;

    fn analyze(&self, completed: &[Task]) -> Result<ProductivityAnalysis>;
}

/// The local engine. Never fails.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeterministicAdvisor {
    analyzer: Analyzer,
}

impl DeterministicAdvisor {
    pub fn new(analyzer: Analyzer) -> Self {
        Self { analyzer }
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }
}

impl TaskAdvisor for DeterministicAdvisor {
    fn name(&self) -> &str {
        "deterministic"
    }

    fn prioritize(&self, tasks: &[Task]) -> Result<Vec<Task>> {
        Ok(prioritize(tasks))
    }

    fn analyze(&self, completed: &[Task]) -> Result<ProductivityAnalysis> {
        Ok(self.analyzer.analyze(completed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdviceSource {
    Primary,
    Fallback,
}

/// A result tagged with the advisor that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Advised<T> {
    pub value: T,
    pub source: AdviceSource,
    pub advisor: String,
}

#[derive(Debug, Clone)]
pub struct FallbackAdvisor<A: TaskAdvisor> {
    primary: A,
    fallback: DeterministicAdvisor,
}

impl<A: TaskAdvisor> FallbackAdvisor<A> {
    pub fn new(primary: A, fallback: DeterministicAdvisor) -> Self {
        Self { primary, fallback }
    }

    pub fn prioritize_advised(&self, tasks: &[Task]) -> Advised<Vec<Task>> {
        match self.primary.prioritize(tasks) {
            Ok(order) if is_permutation_of(tasks, &order) => {
                return self.from_primary(order);
            }
            Ok(order) => tracing::warn!(
                advisor = self.primary.name(),
                expected = tasks.len(),
                returned = order.len(),
                "advisor ordering is not a permutation of its input; using local engine"
            ),
            Err(e) => tracing::warn!(
                advisor = self.primary.name(),
                error = %e,
                "advisor prioritize failed; using local engine"
            ),
        }
        self.from_fallback(prioritize(tasks))
    }

    pub fn analyze_advised(&self, completed: &[Task]) -> Advised<ProductivityAnalysis> {
        match self.primary.analyze(completed) {
            Ok(analysis) if honours_contract(&analysis, completed) => {
                return self.from_primary(analysis);
            }
            Ok(analysis) => tracing::warn!(
                advisor = self.primary.name(),
                score = analysis.score,
                "advisor analysis breaks the output contract; using local engine"
            ),
            Err(e) => tracing::warn!(
                advisor = self.primary.name(),
                error = %e,
                "advisor analyze failed; using local engine"
            ),
        }
        self.from_fallback(self.fallback.analyzer().analyze(completed))
    }

    fn from_primary<T>(&self, value: T) -> Advised<T> {
        Advised {
            value,
            source: AdviceSource::Primary,
            advisor: self.primary.name().to_string(),
        }
    }

    fn from_fallback<T>(&self, value: T) -> Advised<T> {
        Advised {
            value,
            source: AdviceSource::Fallback,
            advisor: self.fallback.name().to_string(),
        }
    }
}

impl<A: TaskAdvisor> TaskAdvisor for FallbackAdvisor<A> {
    fn name(&self) -> &str {
        self.primary.name()
    }

    fn prioritize(&self, tasks: &[Task]) -> Result<Vec<Task>> {
        Ok(self.prioritize_advised(tasks).value)
    }

    fn analyze(&self, completed: &[Task]) -> Result<ProductivityAnalysis> {
        Ok(self.analyze_advised(completed).value)
    }
}

fn honours_contract(analysis: &ProductivityAnalysis, completed: &[Task]) -> bool {
    let in_range = analysis.score <= 100 && (!completed.is_empty() || analysis.score == 0);
    in_range && !analysis.insights.is_empty() && !analysis.recommendations.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::task::Priority;
    use chrono::{TimeZone, Utc};

    /// Stands in for a hosted model that is offline.
    struct Offline;

    impl TaskAdvisor for Offline {
        fn name(&self) -> &str {
            "hosted"
        }
        fn prioritize(&self, _tasks: &[Task]) -> Result<Vec<Task>> {
            Err(EngineError::AdvisorUnavailable {
                advisor: "hosted".into(),
                reason: "no network".into(),
            })
        }
        fn analyze(&self, _completed: &[Task]) -> Result<ProductivityAnalysis> {
            Err(EngineError::AdvisorUnavailable {
                advisor: "hosted".into(),
                reason: "no network".into(),
            })
        }
    }

    /// Returns the input reversed and a fixed analysis.
    struct Reverser {
        drop_last: bool,
        score: u8,
    }

    impl TaskAdvisor for Reverser {
        fn name(&self) -> &str {
            "reverser"
        }
        fn prioritize(&self, tasks: &[Task]) -> Result<Vec<Task>> {
            let mut out: Vec<Task> = tasks.iter().rev().cloned().collect();
            if self.drop_last {
                out.pop();
            }
            Ok(out)
        }
        fn analyze(&self, _completed: &[Task]) -> Result<ProductivityAnalysis> {
            Ok(ProductivityAnalysis {
                score: self.score,
                insights: vec!["from the model".into()],
                recommendations: vec!["rest".into()],
            })
        }
    }

    fn tasks() -> Vec<Task> {
        vec![
            Task::new("low", "low").with_priority(Priority::Low),
            Task::new("urgent", "urgent").with_priority(Priority::Urgent),
        ]
    }

    fn done() -> Vec<Task> {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        vec![Task::new("d", "d").with_priority(Priority::High).completed_at(at)]
    }

    #[test]
    fn deterministic_advisor_matches_free_functions() {
        let adv = DeterministicAdvisor::default();
        assert_eq!(adv.prioritize(&tasks()).unwrap(), prioritize(&tasks()));
        assert_eq!(adv.analyze(&done()).unwrap(), crate::analyzer::analyze(&done()));
    }

    #[test]
    fn offline_primary_falls_back() {
        let adv = FallbackAdvisor::new(Offline, DeterministicAdvisor::default());

        let order = adv.prioritize_advised(&tasks());
        assert_eq!(order.source, AdviceSource::Fallback);
        assert_eq!(order.advisor, "deterministic");
        assert_eq!(order.value[0].id, "urgent");

        let analysis = adv.analyze_advised(&done());
        assert_eq!(analysis.source, AdviceSource::Fallback);
        assert!(analysis.value.score > 0);
    }

    #[test]
    fn healthy_primary_is_used() {
        let adv = FallbackAdvisor::new(
            Reverser { drop_last: false, score: 70 },
            DeterministicAdvisor::default(),
        );
        let order = adv.prioritize_advised(&tasks());
        assert_eq!(order.source, AdviceSource::Primary);
        assert_eq!(order.value[0].id, "urgent");

        let analysis = adv.analyze_advised(&done());
        assert_eq!(analysis.source, AdviceSource::Primary);
        assert_eq!(analysis.value.score, 70);
    }

    #[test]
    fn contract_breaking_primary_falls_back() {
        let adv = FallbackAdvisor::new(
            Reverser { drop_last: true, score: 150 },
            DeterministicAdvisor::default(),
        );
        let order = adv.prioritize_advised(&tasks());
        assert_eq!(order.source, AdviceSource::Fallback);
        assert_eq!(order.value.len(), 2);

        let analysis = adv.analyze_advised(&done());
        assert_eq!(analysis.source, AdviceSource::Fallback);
        assert!(analysis.value.score <= 100);
    }

    #[test]
    fn nonzero_score_for_empty_input_is_rejected() {
        let adv = FallbackAdvisor::new(
            Reverser { drop_last: false, score: 40 },
            DeterministicAdvisor::default(),
        );
        let analysis = adv.analyze_advised(&[]);
        assert_eq!(analysis.source, AdviceSource::Fallback);
        assert_eq!(analysis.value.score, 0);
    }

    #[test]
    fn fallback_advisor_is_itself_an_advisor() {
        let adv: Box<dyn TaskAdvisor> =
            Box::new(FallbackAdvisor::new(Offline, DeterministicAdvisor::default()));
        assert_eq!(adv.name(), "hosted");
        assert!(adv.prioritize(&tasks()).is_ok());
    }
}
