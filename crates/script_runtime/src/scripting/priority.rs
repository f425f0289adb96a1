//! Script type priority table

use std::collections::HashMap;

use super::component::ScriptType;
use crate::core::config::ScriptingConfig;

/// Priority used for script types without an explicit entry
pub const DEFAULT_PRIORITY: i32 = 100;

/// Maps script types to their update priority
///
/// Lower priorities are visited first. The table is plain lookup configuration;
/// changing it affects scripts registered afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityTable {
    default_priority: i32,
    priorities: HashMap<String, i32>,
}

impl PriorityTable {
    /// Create an empty table using [`DEFAULT_PRIORITY`]
    pub fn new() -> Self {
        Self::with_default(DEFAULT_PRIORITY)
    }

    /// Create an empty table with a custom fallback priority
    pub fn with_default(default_priority: i32) -> Self {
        Self {
            default_priority,
            priorities: HashMap::new(),
        }
    }

    /// Build a table from configuration
    pub fn from_config(config: &ScriptingConfig) -> Self {
        let mut table = Self::with_default(config.default_priority);
        for (name, &priority) in &config.priorities {
            table.priorities.insert(name.clone(), priority);
        }
        table
    }

    /// Set or replace the priority for a script type
    pub fn set(&mut self, script_type: ScriptType, priority: i32) -> Option<i32> {
        self.priorities.insert(script_type.name().to_string(), priority)
    }

    /// Priority for a script type, falling back to the default
    pub fn priority_of(&self, script_type: ScriptType) -> i32 {
        self.priorities
            .get(script_type.name())
            .copied()
            .unwrap_or(self.default_priority)
    }

    /// Fallback priority for unmapped types
    pub fn default_priority(&self) -> i32 {
        self.default_priority
    }

    /// Number of explicit entries
    pub fn len(&self) -> usize {
        self.priorities.len()
    }

    /// Whether there are no explicit entries
    pub fn is_empty(&self) -> bool {
        self.priorities.is_empty()
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self::new()
    }
}
