//! Transition record.

/// One observed interaction step `(o_t, a_t, r_t, o_t+1, done_t)`.
///
/// A transition is never modified after it has been created. Buffers hand out
/// shared references only, and staging buffers move (not alias) their items into
/// the replay buffer they are drained into.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition<O, A> {
    /// Observation before the action, `o_t`.
    pub obs: O,

    /// Action, `a_t`.
    pub act: A,

    /// Reward, `r_t`.
    pub reward: f32,

    /// Observation after the action, `o_t+1`.
    pub next_obs: O,

    /// Flag denoting if the episode terminated with this step.
    pub is_terminated: bool,

    /// Step counter of the learner when this transition was observed.
    pub time: usize,
}

impl<O, A> Transition<O, A> {
    /// Constructs a transition.
    pub fn new(obs: O, act: A, reward: f32, next_obs: O, is_terminated: bool, time: usize) -> Self {
        Self {
            obs,
            act,
            reward,
            next_obs,
            is_terminated,
            time,
        }
    }
}
