//! Script component update scheduler
//!
//! Keeps the active scripts in priority order and runs the per-frame passes
//! over them. Scripts may register or unregister scripts (themselves included)
//! while a pass is running:
//!
//! - additions during a pass go to a pending queue and are inserted once the
//!   pass ends
//! - removals during a pass tombstone the matching entries in place; the
//!   tombstones are compacted once the pass ends
//!
//! The entry list therefore never changes length or order while it is being
//! iterated.

use std::ops::{Deref, DerefMut};

use log::debug;
use thiserror::Error;

use super::component::{ScriptError, ScriptHandle, ScriptType};
use super::phase::Phase;
use super::priority::PriorityTable;
use crate::core::config::ScriptingConfig;
use crate::foundation::collections::{stable_sort_by_key, Key};
use crate::foundation::logging::SCRIPTING_TARGET;

/// Runs one phase callback for one script on behalf of the manager
///
/// The manager only knows handles; the dispatcher owns (or can reach) the
/// script objects. It receives the manager back so the callback can add and
/// remove scripts mid-pass.
pub trait PhaseDispatch {
    /// Invoke the callback for `phase` on `script`
    fn dispatch(
        &mut self,
        script: ScriptHandle,
        phase: Phase,
        scheduler: &mut ScriptComponentManager,
    ) -> Result<(), ScriptError>;
}

impl<F> PhaseDispatch for F
where
    F: FnMut(ScriptHandle, Phase, &mut ScriptComponentManager) -> Result<(), ScriptError>,
{
    fn dispatch(
        &mut self,
        script: ScriptHandle,
        phase: Phase,
        scheduler: &mut ScriptComponentManager,
    ) -> Result<(), ScriptError> {
        self(script, phase, scheduler)
    }
}

/// Scheduler misuse errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// `clear` was called from inside a pass
    #[error("cannot clear the script scheduler while a pass is running")]
    ClearDuringInvocation,

    /// A pass was started from inside another pass
    #[error("cannot start a {0} pass while another pass is running")]
    NestedInvocation(Phase),
}

/// One slot of the ordered list; `script == None` is a tombstone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    script: Option<ScriptHandle>,
    priority: i32,
}

#[derive(Debug, Clone, Copy)]
struct PendingAdd {
    script: ScriptHandle,
    script_type: ScriptType,
}

/// Priority-ordered registry of active scripts
///
/// Entries are sorted by ascending priority; equal priorities keep insertion
/// order. Each entry's priority is snapshotted when it is inserted, so
/// [`set_priority`](Self::set_priority) only affects later insertions.
///
/// Adding the same script twice creates two entries and the script is visited
/// twice per pass. [`remove`](Self::remove) always removes every entry for a
/// script.
#[derive(Debug, Default)]
pub struct ScriptComponentManager {
    entries: Vec<Entry>,
    pending_add: Vec<PendingAdd>,
    priorities: PriorityTable,
    is_invoking: bool,
    has_tombstones: bool,
}

impl ScriptComponentManager {
    /// Create an empty manager with the default priority table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty manager with the given priority table
    pub fn with_priorities(priorities: PriorityTable) -> Self {
        Self {
            priorities,
            ..Self::default()
        }
    }

    /// Create an empty manager from configuration
    pub fn from_config(config: &ScriptingConfig) -> Self {
        Self::with_priorities(PriorityTable::from_config(config))
    }

    /// Register a script
    ///
    /// Outside a pass the script is inserted and the list re-sorted right away.
    /// During a pass it is queued and becomes visible from the next pass on.
    /// A null handle is ignored.
    pub fn add(&mut self, script: ScriptHandle, script_type: ScriptType) {
        if script.is_null() {
            return;
        }

        if self.is_invoking {
            debug!(
                target: SCRIPTING_TARGET,
                "Deferring registration of {script:?} ({script_type})"
            );
            self.pending_add.push(PendingAdd { script, script_type });
        } else {
            self.push_entry(script, script_type);
            self.resort();
        }
    }

    /// Unregister every entry for a script
    ///
    /// Outside a pass the entries are removed right away. During a pass they
    /// are tombstoned in place and compacted when the pass ends; a tombstoned
    /// script is not visited again in the current pass. A null handle is
    /// ignored.
    ///
    /// Registrations of the script still queued by [`add`](Self::add) are
    /// cancelled as well, so a script added and then removed within the same
    /// pass is never inserted, not even once the pass ends. Removal always
    /// wins over an earlier add.
    pub fn remove(&mut self, script: ScriptHandle) {
        if script.is_null() {
            return;
        }

        self.pending_add.retain(|pending| pending.script != script);

        if self.is_invoking {
            for entry in self.entries.iter_mut().filter(|entry| entry.script == Some(script)) {
                entry.script = None;
                self.has_tombstones = true;
            }
        } else {
            self.entries.retain(|entry| entry.script != Some(script));
        }
    }

    /// Run the update pass
    pub fn invoke_update<D: PhaseDispatch + ?Sized>(
        &mut self,
        dispatcher: &mut D,
    ) -> Result<(), ScriptError> {
        self.invoke(Phase::Update, dispatcher)
    }

    /// Run the fixed update pass
    pub fn invoke_fixed_update<D: PhaseDispatch + ?Sized>(
        &mut self,
        dispatcher: &mut D,
    ) -> Result<(), ScriptError> {
        self.invoke(Phase::FixedUpdate, dispatcher)
    }

    /// Run the late update pass
    pub fn invoke_late_update<D: PhaseDispatch + ?Sized>(
        &mut self,
        dispatcher: &mut D,
    ) -> Result<(), ScriptError> {
        self.invoke(Phase::LateUpdate, dispatcher)
    }

    /// Run one pass, visiting every live entry in order
    ///
    /// The first dispatch error stops the pass and is returned; the remaining
    /// entries are not visited this time. Whether the pass finishes, fails or
    /// unwinds, the manager leaves it with no tombstones and with every queued
    /// registration inserted.
    pub fn invoke<D: PhaseDispatch + ?Sized>(
        &mut self,
        phase: Phase,
        dispatcher: &mut D,
    ) -> Result<(), ScriptError> {
        if self.is_invoking {
            return Err(SchedulerError::NestedInvocation(phase).into());
        }

        let mut pass = InvocationPass::begin(self);
        let mut index = 0;
        // Length is stable for the whole pass: additions are queued and
        // removals only tombstone
        while index < pass.entries.len() {
            if let Some(script) = pass.entries[index].script {
                if let Err(err) = dispatcher.dispatch(script, phase, &mut pass) {
                    debug!(
                        target: SCRIPTING_TARGET,
                        "{phase} pass aborted at entry {index} of {}",
                        pass.entries.len()
                    );
                    return Err(err);
                }
            }
            index += 1;
        }

        Ok(())
    }

    /// Set the priority for a script type
    ///
    /// Already registered scripts keep the priority they were inserted with;
    /// re-register them to pick up the new value.
    pub fn set_priority(&mut self, script_type: ScriptType, priority: i32) {
        self.priorities.set(script_type, priority);
    }

    /// Priority a script of this type would be inserted with
    pub fn priority_of(&self, script_type: ScriptType) -> i32 {
        self.priorities.priority_of(script_type)
    }

    /// The priority table
    pub fn priorities(&self) -> &PriorityTable {
        &self.priorities
    }

    /// Drop every entry and queued registration
    ///
    /// Used for full teardown such as a scene unload. Fails if a pass is
    /// running.
    pub fn clear(&mut self) -> Result<(), SchedulerError> {
        if self.is_invoking {
            return Err(SchedulerError::ClearDuringInvocation);
        }

        self.entries.clear();
        self.pending_add.clear();
        self.has_tombstones = false;
        Ok(())
    }

    /// Whether a pass is running
    pub fn is_invoking(&self) -> bool {
        self.is_invoking
    }

    /// Number of entries, tombstones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of registrations waiting for the current pass to end
    pub fn pending_len(&self) -> usize {
        self.pending_add.len()
    }

    /// Number of tombstoned entries (only non-zero during a pass)
    pub fn tombstone_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.script.is_none()).count()
    }

    /// Whether the script has at least one live entry
    pub fn contains(&self, script: ScriptHandle) -> bool {
        self.entries.iter().any(|entry| entry.script == Some(script))
    }

    /// Live scripts in visitation order
    pub fn iter_active(&self) -> impl Iterator<Item = ScriptHandle> + '_ {
        self.entries.iter().filter_map(|entry| entry.script)
    }

    /// Live scripts with their snapshotted priorities, in visitation order
    pub fn iter_with_priority(&self) -> impl Iterator<Item = (ScriptHandle, i32)> + '_ {
        self.entries
            .iter()
            .filter_map(|entry| entry.script.map(|script| (script, entry.priority)))
    }

    fn push_entry(&mut self, script: ScriptHandle, script_type: ScriptType) {
        let priority = self.priorities.priority_of(script_type);
        debug!(
            target: SCRIPTING_TARGET,
            "Registering {script:?} ({script_type}) at priority {priority}"
        );
        self.entries.push(Entry {
            script: Some(script),
            priority,
        });
    }

    fn resort(&mut self) {
        stable_sort_by_key(&mut self.entries, |entry| entry.priority);
    }

    /// End-of-pass bookkeeping: compact tombstones, then flush queued additions
    fn settle(&mut self) {
        self.is_invoking = false;

        if self.has_tombstones {
            self.entries.retain(|entry| entry.script.is_some());
            self.has_tombstones = false;
        }

        if !self.pending_add.is_empty() {
            let pending = std::mem::take(&mut self.pending_add);
            for PendingAdd { script, script_type } in pending {
                self.push_entry(script, script_type);
            }
            self.resort();
        }
    }
}

/// Scope guard for one pass; settles the manager when dropped, including on unwind
struct InvocationPass<'a> {
    manager: &'a mut ScriptComponentManager,
}

impl<'a> InvocationPass<'a> {
    fn begin(manager: &'a mut ScriptComponentManager) -> Self {
        manager.is_invoking = true;
        Self { manager }
    }
}

impl Deref for InvocationPass<'_> {
    type Target = ScriptComponentManager;

    fn deref(&self) -> &Self::Target {
        self.manager
    }
}

impl DerefMut for InvocationPass<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.manager
    }
}

impl Drop for InvocationPass<'_> {
    fn drop(&mut self) {
        self.manager.settle();
    }
}
