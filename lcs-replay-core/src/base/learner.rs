//! Learner.
use super::Transition;
use anyhow::Result;

/// The update entry point of a learner, invoked once per replayed transition.
///
/// Implementations range from a gradient step on a value-function approximator
/// to a matching, anticipatory-learning, reinforcement and genetic-algorithm
/// cascade over a classifier population. The caller never inspects which kind
/// it holds.
///
/// A learner must tolerate being called repeatedly, with the same transition
/// several times in one batch, and in any order.
pub trait Learner<O, A> {
    /// Applies one learning update given a sampled transition.
    ///
    /// Errors are propagated to the caller unchanged.
    fn replay_update(&mut self, tr: &Transition<O, A>) -> Result<()>;

    /// Replays a whole trial, one transition at a time in stored order.
    ///
    /// Used when a buffer stores trials rather than single transitions.
    fn replay_trial(&mut self, trial: &[Transition<O, A>]) -> Result<()> {
        for tr in trial.iter() {
            self.replay_update(tr)?;
        }
        Ok(())
    }
}
