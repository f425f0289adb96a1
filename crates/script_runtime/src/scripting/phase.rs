//! Invocation phases and script callbacks

use std::fmt;

/// Per-frame invocation passes, in the order the host runs them within a frame
///
/// Fixed update may run zero or more times per frame; update and late update
/// run exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Variable-step frame update
    Update = 0,
    /// Fixed-step update, driven by the host's fixed clock
    FixedUpdate = 1,
    /// Runs after every script has seen the frame update
    LateUpdate = 2,
}

impl Phase {
    /// All phases in frame order
    pub const ALL: [Phase; 3] = [Phase::Update, Phase::FixedUpdate, Phase::LateUpdate];

    /// The script callback this phase invokes
    pub fn callback(self) -> Callback {
        match self {
            Phase::Update => Callback::Update,
            Phase::FixedUpdate => Callback::FixedUpdate,
            Phase::LateUpdate => Callback::LateUpdate,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Update => "update",
            Phase::FixedUpdate => "fixed update",
            Phase::LateUpdate => "late update",
        };
        f.write_str(name)
    }
}

/// Every hook a script component can receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Callback {
    /// `on_create`
    Create,
    /// `on_enable`
    Enable,
    /// `on_start`
    Start,
    /// `on_disable`
    Disable,
    /// `on_destroy`
    Destroy,
    /// `on_update`
    Update,
    /// `on_fixed_update`
    FixedUpdate,
    /// `on_late_update`
    LateUpdate,
}

impl Callback {
    /// Name of the trait method
    pub fn method_name(self) -> &'static str {
        match self {
            Callback::Create => "on_create",
            Callback::Enable => "on_enable",
            Callback::Start => "on_start",
            Callback::Disable => "on_disable",
            Callback::Destroy => "on_destroy",
            Callback::Update => "on_update",
            Callback::FixedUpdate => "on_fixed_update",
            Callback::LateUpdate => "on_late_update",
        }
    }
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order() {
        let mut phases = vec![Phase::LateUpdate, Phase::Update, Phase::FixedUpdate];
        phases.sort();
        assert_eq!(phases, Phase::ALL.to_vec());
    }

    #[test]
    fn test_phase_callbacks() {
        assert_eq!(Phase::Update.callback(), Callback::Update);
        assert_eq!(Phase::FixedUpdate.callback(), Callback::FixedUpdate);
        assert_eq!(Phase::LateUpdate.callback(), Callback::LateUpdate);
        assert_eq!(Callback::Destroy.to_string(), "on_destroy");
    }
}
