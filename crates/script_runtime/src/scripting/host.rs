//! Script arena and lifecycle routing
//!
//! The host owns every script instance and translates lifecycle signals into
//! scheduler registration:
//!
//! | signal    | scheduler effect                    | hook          |
//! |-----------|-------------------------------------|---------------|
//! | `create`  | none                                | `on_create`   |
//! | `enable`  | `add` if the script already started | `on_enable`   |
//! | `start`   | `add` (only while enabled)          | `on_start`    |
//! | `disable` | `remove`                            | `on_disable`  |
//! | `destroy` | `remove`, then drop the instance    | `on_destroy`  |
//!
//! While a hook runs its script is checked out of the arena. Signals aimed at a
//! checked-out script still update its state and the scheduler right away, but
//! its hooks wait in a queue that drains as soon as the script is checked back in.

use std::collections::VecDeque;

use log::{debug, error, trace, warn};

use super::component::{ScriptComponent, ScriptError, ScriptHandle, ScriptResult, ScriptType};
use super::context::ScriptContext;
use super::manager::{PhaseDispatch, ScriptComponentManager};
use super::phase::{Callback, Phase};
use crate::foundation::collections::SlotMap;
use crate::foundation::logging::SCRIPTING_TARGET;
use crate::foundation::time::Time;

/// Lifecycle flags of one script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptState {
    /// `on_create` has been requested
    pub created: bool,
    /// The script is enabled
    pub enabled: bool,
    /// `on_start` has been requested
    pub started: bool,
    /// The script is being destroyed and accepts no further signals
    pub destroyed: bool,
}

impl ScriptState {
    /// Whether the script should currently be registered with the scheduler
    pub fn is_active(&self) -> bool {
        self.enabled && self.started && !self.destroyed
    }
}

struct ScriptSlot {
    /// `None` while checked out
    script: Option<Box<dyn ScriptComponent>>,
    script_type: ScriptType,
    state: ScriptState,
    deferred: VecDeque<Callback>,
}

/// Owner of all script instances
#[derive(Default)]
pub struct ScriptHost {
    slots: SlotMap<ScriptHandle, ScriptSlot>,
}

impl ScriptHost {
    /// Create an empty host
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a script in the arena without running any hook
    pub fn insert<S: ScriptComponent>(&mut self, script: S) -> ScriptHandle {
        self.insert_boxed(Box::new(script))
    }

    /// Place an already boxed script in the arena without running any hook
    pub fn insert_boxed(&mut self, script: Box<dyn ScriptComponent>) -> ScriptHandle {
        let script_type = script.script_type();
        let handle = self.slots.insert(ScriptSlot {
            script: Some(script),
            script_type,
            state: ScriptState::default(),
            deferred: VecDeque::new(),
        });
        trace!(target: SCRIPTING_TARGET, "Inserted {script_type} as {handle:?}");
        handle
    }

    /// Insert, create, enable and start a script
    pub fn spawn<S: ScriptComponent>(
        &mut self,
        scheduler: &mut ScriptComponentManager,
        time: &Time,
        script: S,
    ) -> Result<ScriptHandle, ScriptError> {
        let handle = self.insert(script);
        self.create(scheduler, time, handle)?;
        self.enable(scheduler, time, handle)?;
        self.start(scheduler, time, handle)?;
        Ok(handle)
    }

    /// Run `on_create`; only the first call has an effect
    pub fn create(
        &mut self,
        scheduler: &mut ScriptComponentManager,
        time: &Time,
        handle: ScriptHandle,
    ) -> ScriptResult {
        let slot = self.live_slot_mut(handle)?;
        if slot.state.created {
            return Ok(());
        }
        slot.state.created = true;
        self.call(scheduler, time, handle, Callback::Create)
    }

    /// Enable a script, registering it if it has already started
    pub fn enable(
        &mut self,
        scheduler: &mut ScriptComponentManager,
        time: &Time,
        handle: ScriptHandle,
    ) -> ScriptResult {
        let slot = self.live_slot_mut(handle)?;
        if slot.state.enabled {
            return Ok(());
        }
        slot.state.enabled = true;
        if slot.state.started {
            scheduler.add(handle, slot.script_type);
        }
        self.call(scheduler, time, handle, Callback::Enable)
    }

    /// Start a script and register it
    ///
    /// Ignored if the script already started or is disabled; a disabled script
    /// can be started after it is enabled again.
    pub fn start(
        &mut self,
        scheduler: &mut ScriptComponentManager,
        time: &Time,
        handle: ScriptHandle,
    ) -> ScriptResult {
        let slot = self.live_slot_mut(handle)?;
        if slot.state.started || !slot.state.enabled {
            return Ok(());
        }
        slot.state.started = true;
        scheduler.add(handle, slot.script_type);
        self.call(scheduler, time, handle, Callback::Start)
    }

    /// Disable a script and unregister it
    pub fn disable(
        &mut self,
        scheduler: &mut ScriptComponentManager,
        time: &Time,
        handle: ScriptHandle,
    ) -> ScriptResult {
        let slot = self.live_slot_mut(handle)?;
        if !slot.state.enabled {
            return Ok(());
        }
        slot.state.enabled = false;
        scheduler.remove(handle);
        self.call(scheduler, time, handle, Callback::Disable)
    }

    /// Unregister a script, run `on_destroy` and drop it
    ///
    /// A script destroyed from inside one of its own hooks is dropped after
    /// that hook returns and its queued hooks have run.
    pub fn destroy(
        &mut self,
        scheduler: &mut ScriptComponentManager,
        time: &Time,
        handle: ScriptHandle,
    ) -> ScriptResult {
        let slot = self.live_slot_mut(handle)?;
        slot.state.destroyed = true;
        scheduler.remove(handle);
        self.call(scheduler, time, handle, Callback::Destroy)
    }

    /// Destroy every live script
    ///
    /// Keeps going when a hook fails and returns the first failure.
    pub fn destroy_all(
        &mut self,
        scheduler: &mut ScriptComponentManager,
        time: &Time,
    ) -> ScriptResult {
        let handles: Vec<_> = self.handles().collect();
        let mut first_error = None;

        for handle in handles {
            // An earlier on_destroy may have destroyed this one already
            if !self.is_alive(handle) {
                continue;
            }
            if let Err(err) = self.destroy(scheduler, time, handle) {
                first_error.get_or_insert(err);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Run the per-frame callback for one scheduled script
    ///
    /// A handle with no script behind it is skipped with a warning and
    /// unregistered.
    pub fn run_phase(
        &mut self,
        scheduler: &mut ScriptComponentManager,
        time: &Time,
        handle: ScriptHandle,
        phase: Phase,
    ) -> ScriptResult {
        let Some(slot) = self.slots.get(handle) else {
            warn!(
                target: SCRIPTING_TARGET,
                "Skipping {phase} for stale handle {handle:?} and unregistering it"
            );
            scheduler.remove(handle);
            return Ok(());
        };
        if slot.script.is_none() {
            warn!(
                target: SCRIPTING_TARGET,
                "Skipping {phase} for {} {handle:?}: script is busy",
                slot.script_type
            );
            return Ok(());
        }

        self.call(scheduler, time, handle, phase.callback())
    }

    /// Dispatcher that routes scheduler passes to this host
    pub fn dispatcher<'a>(&'a mut self, time: &'a Time) -> HostDispatch<'a> {
        HostDispatch { host: self, time }
    }

    /// Whether the handle refers to a script that is not destroyed
    pub fn is_alive(&self, handle: ScriptHandle) -> bool {
        self.slots.get(handle).is_some_and(|slot| !slot.state.destroyed)
    }

    /// Type tag of a script, including one that is currently checked out
    pub fn script_type(&self, handle: ScriptHandle) -> Option<ScriptType> {
        self.slots.get(handle).map(|slot| slot.script_type)
    }

    /// Lifecycle flags of a script
    pub fn state(&self, handle: ScriptHandle) -> Option<ScriptState> {
        self.slots.get(handle).map(|slot| slot.state)
    }

    /// Handles of every script in the arena
    pub fn handles(&self) -> impl Iterator<Item = ScriptHandle> + '_ {
        self.slots.keys()
    }

    /// Number of scripts in the arena
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn live_slot_mut(&mut self, handle: ScriptHandle) -> Result<&mut ScriptSlot, ScriptError> {
        self.slots
            .get_mut(handle)
            .filter(|slot| !slot.state.destroyed)
            .ok_or(ScriptError::StaleHandle(handle))
    }

    /// Run one hook, or queue it if the script is checked out
    fn call(
        &mut self,
        scheduler: &mut ScriptComponentManager,
        time: &Time,
        handle: ScriptHandle,
        callback: Callback,
    ) -> ScriptResult {
        let slot = self
            .slots
            .get_mut(handle)
            .ok_or(ScriptError::StaleHandle(handle))?;
        let Some(script) = slot.script.take() else {
            trace!(
                target: SCRIPTING_TARGET,
                "Queueing {callback} for busy {}",
                slot.script_type
            );
            slot.deferred.push_back(callback);
            return Ok(());
        };
        let script_type = slot.script_type;

        let mut checkout = CheckedOut {
            host: self,
            handle,
            script_type,
            script: Some(script),
        };
        let result = checkout.run(scheduler, time, callback);
        let drained = checkout.drain(scheduler, time);
        drop(checkout);

        result.and(drained)
    }

    /// Return a script to its slot, or drop it if it was destroyed while out
    ///
    /// Hooks still queued at this point belong to a hook that unwound; they
    /// are discarded.
    fn check_in(&mut self, handle: ScriptHandle, script: Box<dyn ScriptComponent>) {
        let Some(slot) = self.slots.get_mut(handle) else {
            return;
        };
        if !slot.deferred.is_empty() {
            warn!(
                target: SCRIPTING_TARGET,
                "Discarding {} queued hooks for {} {handle:?}",
                slot.deferred.len(),
                slot.script_type
            );
            slot.deferred.clear();
        }

        if slot.state.destroyed {
            self.slots.remove(handle);
            debug!(target: SCRIPTING_TARGET, "Dropped {} {handle:?}", script.script_type());
        } else {
            slot.script = Some(script);
        }
    }
}

/// A script taken out of its slot while its hooks run
///
/// Dropping it checks the script back in, so a hook that panics leaves the
/// script usable (or dropped, if it was destroyed) instead of stuck out.
struct CheckedOut<'a> {
    host: &'a mut ScriptHost,
    handle: ScriptHandle,
    script_type: ScriptType,
    script: Option<Box<dyn ScriptComponent>>,
}

impl CheckedOut<'_> {
    fn run(
        &mut self,
        scheduler: &mut ScriptComponentManager,
        time: &Time,
        callback: Callback,
    ) -> ScriptResult {
        let Some(script) = self.script.as_mut() else {
            return Ok(());
        };
        let script_type = self.script_type;

        let mut ctx = ScriptContext::new(self.handle, script_type, scheduler, self.host, time);
        let result = run_callback(script.as_mut(), callback, &mut ctx);
        if let Err(err) = &result {
            error!(target: SCRIPTING_TARGET, "{script_type}::{callback} failed: {err}");
        }
        result
    }

    /// Run hooks queued while the script was out; the first failure is
    /// returned once the queue is empty
    fn drain(&mut self, scheduler: &mut ScriptComponentManager, time: &Time) -> ScriptResult {
        let mut first_error = None;

        while let Some(callback) = self
            .host
            .slots
            .get_mut(self.handle)
            .and_then(|slot| slot.deferred.pop_front())
        {
            if let Err(err) = self.run(scheduler, time, callback) {
                first_error.get_or_insert(err);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for CheckedOut<'_> {
    fn drop(&mut self) {
        if let Some(script) = self.script.take() {
            self.host.check_in(self.handle, script);
        }
    }
}

fn run_callback(
    script: &mut dyn ScriptComponent,
    callback: Callback,
    ctx: &mut ScriptContext<'_>,
) -> ScriptResult {
    match callback {
        Callback::Create => script.on_create(ctx),
        Callback::Enable => script.on_enable(ctx),
        Callback::Start => script.on_start(ctx),
        Callback::Disable => script.on_disable(ctx),
        Callback::Destroy => script.on_destroy(ctx),
        Callback::Update => script.on_update(ctx),
        Callback::FixedUpdate => script.on_fixed_update(ctx),
        Callback::LateUpdate => script.on_late_update(ctx),
    }
}

/// [`PhaseDispatch`] implementation backed by a [`ScriptHost`]
pub struct HostDispatch<'a> {
    host: &'a mut ScriptHost,
    time: &'a Time,
}

impl PhaseDispatch for HostDispatch<'_> {
    fn dispatch(
        &mut self,
        script: ScriptHandle,
        phase: Phase,
        scheduler: &mut ScriptComponentManager,
    ) -> Result<(), ScriptError> {
        self.host.run_phase(scheduler, self.time, script, phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    const RECORDER: ScriptType = ScriptType::new("Recorder");

    /// Records every hook it receives
    struct Recorder {
        log: Log,
    }

    impl ScriptComponent for Recorder {
        fn script_type(&self) -> ScriptType {
            RECORDER
        }

        fn on_create(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
            self.log.borrow_mut().push("create");
            Ok(())
        }

        fn on_enable(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
            self.log.borrow_mut().push("enable");
            Ok(())
        }

        fn on_start(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
            self.log.borrow_mut().push("start");
            Ok(())
        }

        fn on_disable(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
            self.log.borrow_mut().push("disable");
            Ok(())
        }

        fn on_destroy(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
            self.log.borrow_mut().push("destroy");
            Ok(())
        }
    }

    fn recorder() -> (Recorder, Log) {
        let log = Log::default();
        (Recorder { log: log.clone() }, log)
    }

    #[test]
    fn test_spawn_runs_hooks_in_order_and_registers() {
        let mut host = ScriptHost::new();
        let mut scheduler = ScriptComponentManager::new();
        let time = Time::default();
        let (script, log) = recorder();

        let handle = host.spawn(&mut scheduler, &time, script).unwrap();

        assert_eq!(*log.borrow(), vec!["create", "enable", "start"]);
        assert!(scheduler.contains(handle));
        assert!(host.state(handle).unwrap().is_active());
    }

    #[test]
    fn test_start_is_ignored_while_disabled() {
        let mut host = ScriptHost::new();
        let mut scheduler = ScriptComponentManager::new();
        let time = Time::default();
        let (script, log) = recorder();

        let handle = host.insert(script);
        host.create(&mut scheduler, &time, handle).unwrap();
        host.start(&mut scheduler, &time, handle).unwrap();
        assert!(!scheduler.contains(handle));
        assert!(!host.state(handle).unwrap().started);

        host.enable(&mut scheduler, &time, handle).unwrap();
        assert!(!scheduler.contains(handle));
        host.start(&mut scheduler, &time, handle).unwrap();
        host.start(&mut scheduler, &time, handle).unwrap();

        assert_eq!(*log.borrow(), vec!["create", "enable", "start"]);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_disable_enable_cycle() {
        let mut host = ScriptHost::new();
        let mut scheduler = ScriptComponentManager::new();
        let time = Time::default();
        let (script, log) = recorder();
        let handle = host.spawn(&mut scheduler, &time, script).unwrap();

        host.disable(&mut scheduler, &time, handle).unwrap();
        host.disable(&mut scheduler, &time, handle).unwrap();
        assert!(!scheduler.contains(handle));

        host.enable(&mut scheduler, &time, handle).unwrap();
        host.enable(&mut scheduler, &time, handle).unwrap();
        assert_eq!(scheduler.len(), 1);

        assert_eq!(*log.borrow(), vec!["create", "enable", "start", "disable", "enable"]);
    }

    #[test]
    fn test_destroy_drops_script_and_stales_handle() {
        let mut host = ScriptHost::new();
        let mut scheduler = ScriptComponentManager::new();
        let time = Time::default();
        let (script, log) = recorder();
        let handle = host.spawn(&mut scheduler, &time, script).unwrap();

        host.destroy(&mut scheduler, &time, handle).unwrap();

        assert!(host.is_empty());
        assert!(!host.is_alive(handle));
        assert!(scheduler.is_empty());
        assert_eq!(log.borrow().last(), Some(&"destroy"));
        assert!(matches!(
            host.enable(&mut scheduler, &time, handle),
            Err(ScriptError::StaleHandle(h)) if h == handle
        ));
    }

    #[test]
    fn test_destroy_all() {
        let mut host = ScriptHost::new();
        let mut scheduler = ScriptComponentManager::new();
        let time = Time::default();
        let (first, first_log) = recorder();
        let (second, second_log) = recorder();
        host.spawn(&mut scheduler, &time, first).unwrap();
        host.insert(second);

        host.destroy_all(&mut scheduler, &time).unwrap();

        assert!(host.is_empty());
        assert!(scheduler.is_empty());
        assert_eq!(first_log.borrow().last(), Some(&"destroy"));
        assert_eq!(*second_log.borrow(), vec!["destroy"]);
    }

    #[test]
    fn test_run_phase_skips_stale_handle() {
        let mut host = ScriptHost::new();
        let mut scheduler = ScriptComponentManager::new();
        let time = Time::default();
        let (script, _log) = recorder();
        let handle = host.insert(script);
        host.destroy(&mut scheduler, &time, handle).unwrap();
        scheduler.add(handle, RECORDER);

        assert!(host.run_phase(&mut scheduler, &time, handle, Phase::Update).is_ok());
        assert!(!scheduler.contains(handle));
        assert!(scheduler.is_empty());
    }

    /// Disables and destroys itself from inside `on_update`
    struct SelfDestruct {
        log: Log,
    }

    impl ScriptComponent for SelfDestruct {
        fn script_type(&self) -> ScriptType {
            ScriptType::new("SelfDestruct")
        }

        fn on_update(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
            self.log.borrow_mut().push("update");
            let me = ctx.handle();
            ctx.disable(me)?;
            ctx.destroy(me)?;
            // Hooks are queued, not run, while this one is on the stack
            self.log.borrow_mut().push("update done");
            assert!(!ctx.is_alive(me));
            assert!(!ctx.scheduler().contains(me));
            Ok(())
        }

        fn on_disable(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
            self.log.borrow_mut().push("disable");
            Ok(())
        }

        fn on_destroy(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
            self.log.borrow_mut().push("destroy");
            Ok(())
        }
    }

    #[test]
    fn test_self_destroy_queues_hooks_until_check_in() {
        let mut host = ScriptHost::new();
        let mut scheduler = ScriptComponentManager::new();
        let time = Time::default();
        let log = Log::default();
        let handle = host
            .spawn(&mut scheduler, &time, SelfDestruct { log: log.clone() })
            .unwrap();

        scheduler.invoke_update(&mut host.dispatcher(&time)).unwrap();

        assert_eq!(*log.borrow(), vec!["update", "update done", "disable", "destroy"]);
        assert!(host.is_empty());
        assert!(scheduler.is_empty());
        assert!(host.state(handle).is_none());
    }

    /// Panics the first time it updates
    struct Fragile {
        log: Log,
        tripped: bool,
    }

    impl ScriptComponent for Fragile {
        fn script_type(&self) -> ScriptType {
            ScriptType::new("Fragile")
        }

        fn on_update(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
            if !self.tripped {
                self.tripped = true;
                panic!("update blew up");
            }
            self.log.borrow_mut().push("update");
            Ok(())
        }

        fn on_destroy(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
            self.log.borrow_mut().push("destroy");
            Ok(())
        }
    }

    #[test]
    fn test_script_is_checked_back_in_after_hook_panics() {
        use std::panic::{catch_unwind, AssertUnwindSafe};

        let mut host = ScriptHost::new();
        let mut scheduler = ScriptComponentManager::new();
        let time = Time::default();
        let log = Log::default();
        let script = Fragile {
            log: log.clone(),
            tripped: false,
        };
        let handle = host.spawn(&mut scheduler, &time, script).unwrap();

        let unwound = catch_unwind(AssertUnwindSafe(|| {
            scheduler.invoke_update(&mut host.dispatcher(&time))
        }));
        assert!(unwound.is_err());
        assert!(host.is_alive(handle));

        scheduler.invoke_update(&mut host.dispatcher(&time)).unwrap();
        assert_eq!(*log.borrow(), vec!["update"]);

        host.destroy(&mut scheduler, &time, handle).unwrap();
        assert_eq!(*log.borrow(), vec!["update", "destroy"]);
        assert!(host.is_empty());
        assert!(scheduler.is_empty());
    }
}
