//! Lifecycle signals routed into the scheduler, including from inside callbacks

use std::cell::RefCell;
use std::rc::Rc;

use crate::scripting::{
    ScriptComponent, ScriptContext, ScriptError, ScriptHandle, ScriptResult, ScriptType,
};
use crate::system::SystemManager;

type Events = Rc<RefCell<Vec<String>>>;

/// Logs every hook as `name.hook`
struct Tracked {
    name: &'static str,
    events: Events,
}

impl Tracked {
    fn new(name: &'static str, events: &Events) -> Self {
        Self {
            name,
            events: events.clone(),
        }
    }

    fn log(&self, hook: &str) {
        self.events.borrow_mut().push(format!("{}.{hook}", self.name));
    }
}

impl ScriptComponent for Tracked {
    fn script_type(&self) -> ScriptType {
        ScriptType::new("Tracked")
    }

    fn on_create(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        self.log("create");
        Ok(())
    }

    fn on_enable(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        self.log("enable");
        Ok(())
    }

    fn on_start(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        self.log("start");
        Ok(())
    }

    fn on_disable(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        self.log("disable");
        Ok(())
    }

    fn on_destroy(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        self.log("destroy");
        Ok(())
    }

    fn on_update(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        self.log("update");
        Ok(())
    }
}

/// Destroys its target on the first update
struct Killer {
    target: ScriptHandle,
    events: Events,
}

impl ScriptComponent for Killer {
    fn script_type(&self) -> ScriptType {
        ScriptType::new("Killer")
    }

    fn on_update(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        self.events.borrow_mut().push("killer.update".to_string());
        if ctx.is_alive(self.target) {
            ctx.destroy(self.target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn take(events: &Events) -> Vec<String> {
        std::mem::take(&mut *events.borrow_mut())
    }

    #[test]
    fn test_start_registers_and_disable_unregisters() {
        let events = Events::default();
        let mut system = SystemManager::new();
        let handle = system.insert(Tracked::new("t", &events));

        system.create(handle).unwrap();
        system.enable(handle).unwrap();
        assert!(!system.scheduler().contains(handle));

        system.start(handle).unwrap();
        assert!(system.scheduler().contains(handle));

        system.on_frame_update(0.016, 1.0, 1).unwrap();
        system.disable(handle).unwrap();
        system.on_frame_update(0.016, 1.0, 2).unwrap();

        assert_eq!(take(&events), vec!["t.create", "t.enable", "t.start", "t.update", "t.disable"]);
    }

    #[test]
    fn test_destroying_a_later_script_mid_pass() {
        let events = Events::default();
        let mut system = SystemManager::new();
        system.set_priority(ScriptType::new("Killer"), 0);
        let victim = system.spawn(Tracked::new("victim", &events)).unwrap();
        system
            .spawn(Killer {
                target: victim,
                events: events.clone(),
            })
            .unwrap();
        take(&events);

        system.on_frame_update(0.016, 1.0, 1).unwrap();

        assert_eq!(take(&events), vec!["killer.update", "victim.destroy"]);
        assert!(!system.host().is_alive(victim));
        assert_eq!(system.scheduler().len(), 1);
        assert_eq!(system.host().len(), 1);
    }

    #[test]
    fn test_destroying_an_earlier_script_mid_pass() {
        let events = Events::default();
        let mut system = SystemManager::new();
        system.set_priority(ScriptType::new("Killer"), 1000);
        let victim = system.spawn(Tracked::new("victim", &events)).unwrap();
        system
            .spawn(Killer {
                target: victim,
                events: events.clone(),
            })
            .unwrap();
        take(&events);

        system.on_frame_update(0.016, 1.0, 1).unwrap();
        assert_eq!(take(&events), vec!["victim.update", "killer.update", "victim.destroy"]);

        system.on_frame_update(0.016, 1.0, 2).unwrap();
        assert_eq!(take(&events), vec!["killer.update"]);
    }

    #[test]
    fn test_spawn_during_start_hook() {
        /// Spawns a tracked child when it starts
        struct Parent {
            events: Events,
        }

        impl ScriptComponent for Parent {
            fn script_type(&self) -> ScriptType {
                ScriptType::new("Parent")
            }

            fn on_start(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
                ctx.spawn(Tracked::new("child", &self.events))?;
                Ok(())
            }
        }

        let events = Events::default();
        let mut system = SystemManager::new();
        system.spawn(Parent { events: events.clone() }).unwrap();

        assert_eq!(take(&events), vec!["child.create", "child.enable", "child.start"]);
        assert_eq!(system.scheduler().len(), 2);
        assert_eq!(system.host().len(), 2);

        system.on_frame_update(0.016, 1.0, 1).unwrap();
        assert_eq!(take(&events), vec!["child.update"]);
    }

    #[test]
    fn test_reenable_during_disable_hook_is_deferred() {
        /// Re-enables itself from `on_disable`
        struct Stubborn {
            events: Events,
        }

        impl ScriptComponent for Stubborn {
            fn script_type(&self) -> ScriptType {
                ScriptType::new("Stubborn")
            }

            fn on_enable(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
                self.events.borrow_mut().push("enable".to_string());
                Ok(())
            }

            fn on_disable(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
                self.events.borrow_mut().push("disable".to_string());
                let me = ctx.handle();
                ctx.enable(me)?;
                // on_enable is queued behind this hook
                self.events.borrow_mut().push("disable done".to_string());
                Ok(())
            }
        }

        let events = Events::default();
        let mut system = SystemManager::new();
        let handle = system.spawn(Stubborn { events: events.clone() }).unwrap();
        take(&events);

        system.disable(handle).unwrap();

        assert_eq!(take(&events), vec!["disable", "disable done", "enable"]);
        assert!(system.scheduler().contains(handle));
        assert!(system.host().state(handle).is_some_and(|state| state.is_active()));
    }

    #[test]
    fn test_stale_handle_from_script() {
        /// Tries to enable a script that no longer exists
        struct Necromancer {
            target: ScriptHandle,
        }

        impl ScriptComponent for Necromancer {
            fn script_type(&self) -> ScriptType {
                ScriptType::new("Necromancer")
            }

            fn on_update(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
                ctx.enable(self.target)
            }
        }

        let events = Events::default();
        let mut system = SystemManager::new();
        let dead = system.spawn(Tracked::new("dead", &events)).unwrap();
        system.destroy(dead).unwrap();
        system.spawn(Necromancer { target: dead }).unwrap();

        let result = system.on_frame_update(0.016, 1.0, 1);
        assert!(matches!(result, Err(ScriptError::StaleHandle(handle)) if handle == dead));
    }

    #[test]
    fn test_destroyed_script_cannot_register_itself_again() {
        /// Destroys itself, then tries to stay scheduled
        struct Lingerer {
            events: Events,
        }

        impl ScriptComponent for Lingerer {
            fn script_type(&self) -> ScriptType {
                ScriptType::new("Lingerer")
            }

            fn on_update(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
                let me = ctx.handle();
                ctx.destroy(me)?;
                let readded = ctx.add(me);
                assert!(matches!(readded, Err(ScriptError::StaleHandle(handle)) if handle == me));
                self.events.borrow_mut().push("lingerer.update".to_string());
                Ok(())
            }
        }

        let events = Events::default();
        let mut system = SystemManager::new();
        let handle = system.spawn(Lingerer { events: events.clone() }).unwrap();

        for frame in 1..=4 {
            system.on_frame_update(0.016, 1.0, frame).unwrap();
        }

        assert_eq!(take(&events), vec!["lingerer.update"]);
        assert!(!system.host().is_alive(handle));
        assert!(!system.scheduler().contains(handle));
        assert!(system.scheduler().is_empty());
        assert!(system.host().is_empty());
    }

    #[test]
    fn test_failing_lifecycle_hook_still_updates_scheduler() {
        /// Fails in `on_start`
        struct BadStart;

        impl ScriptComponent for BadStart {
            fn script_type(&self) -> ScriptType {
                ScriptType::new("BadStart")
            }

            fn on_start(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
                Err(ScriptError::fault("no start"))
            }
        }

        let mut system = SystemManager::new();
        let result = system.spawn(BadStart);

        assert!(matches!(result, Err(ScriptError::Fault(_))));
        assert_eq!(system.scheduler().len(), 1);
        assert_eq!(system.host().len(), 1);
    }
}
