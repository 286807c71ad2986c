use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::form::{FieldId, Form};

/// Host events a form and its fields raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEventKind {
    Input,
    Change,
    Blur,
    Submit,
}

impl HostEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Change => "change",
            Self::Blur => "blur",
            Self::Submit => "submit",
        }
    }
}

impl fmt::Display for HostEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Form,
    Field(FieldId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEvent {
    kind: HostEventKind,
    target: EventTarget,
    cancelable: bool,
    default_prevented: bool,
}

impl HostEvent {
    pub fn new(kind: HostEventKind, target: EventTarget) -> Self {
        Self {
            kind,
            target,
            cancelable: matches!(kind, HostEventKind::Submit),
            default_prevented: false,
        }
    }

    /// A cancelable `submit` event aimed at the form.
    pub fn submit() -> Self {
        Self::new(HostEventKind::Submit, EventTarget::Form)
    }

    pub fn kind(&self) -> HostEventKind {
        self.kind
    }

    pub fn target(&self) -> EventTarget {
        self.target
    }

    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

pub type HostListener = Rc<dyn Fn(&mut Form, &mut HostEvent)>;

#[derive(Clone, Default)]
pub(crate) struct ListenerStore {
    map: HashMap<EventTarget, HashMap<HostEventKind, Vec<HostListener>>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, target: EventTarget, kind: HostEventKind, listener: HostListener) {
        let listeners = self
            .map
            .entry(target)
            .or_default()
            .entry(kind)
            .or_default();

        // Dedupe only when the very same callback is registered again;
        // distinct closures with equal behavior all stay.
        if listeners
            .iter()
            .any(|existing| Rc::ptr_eq(existing, &listener))
        {
            return;
        }

        listeners.push(listener);
    }

    pub(crate) fn remove(
        &mut self,
        target: EventTarget,
        kind: HostEventKind,
        listener: &HostListener,
    ) -> bool {
        let Some(events) = self.map.get_mut(&target) else {
            return false;
        };
        let Some(listeners) = events.get_mut(&kind) else {
            return false;
        };

        if let Some(pos) = listeners
            .iter()
            .position(|existing| Rc::ptr_eq(existing, listener))
        {
            listeners.remove(pos);
            if listeners.is_empty() {
                events.remove(&kind);
            }
            if events.is_empty() {
                self.map.remove(&target);
            }
            return true;
        }

        false
    }

    /// Snapshot of the listeners for `target`/`kind`; dispatch iterates the
    /// snapshot so listeners may register or remove listeners.
    pub(crate) fn get(&self, target: EventTarget, kind: HostEventKind) -> Vec<HostListener> {
        self.map
            .get(&target)
            .and_then(|events| events.get(&kind))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, target: EventTarget, kind: HostEventKind) -> usize {
        self.map
            .get(&target)
            .and_then(|events| events.get(&kind))
            .map_or(0, Vec::len)
    }
}

impl fmt::Debug for ListenerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (target, events) in &self.map {
            for (kind, listeners) in events {
                map.entry(&(target, kind), &listeners.len());
            }
        }
        map.finish()
    }
}
