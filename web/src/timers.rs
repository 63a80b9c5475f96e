use std::collections::BTreeMap;

use gauntlet_core::Deferred;
use gloo::timers::callback::Timeout;
use yew::html::Scope;
use yew::prelude::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct TimerId(u32);

/// Pending timeouts of one component.
///
/// Every fired timeout comes back as a component message carrying its
/// [`TimerId`], so the component's `update` stays the only place game state
/// changes. Dropping the bank (with its component) drops whatever handle is
/// still pending, which is how a stage transition cancels the old stage's timers.
pub(crate) struct TimerBank<H = Timeout> {
    next_id: u32,
    pending: BTreeMap<TimerId, H>,
}

impl<H> Default for TimerBank<H> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<H> TimerBank<H> {
    /// Keeps the handle built for a fresh id until it fires or is cancelled.
    fn arm(&mut self, make: impl FnOnce(TimerId) -> H) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.insert(id, make(id));
        id
    }

    /// Releases the handle of a timeout that has fired.
    pub(crate) fn fired(&mut self, id: TimerId) {
        self.pending.remove(&id);
    }

    pub(crate) fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("cancelling {} pending timers", self.pending.len());
        }
        self.pending.clear();
    }
}

impl TimerBank {
    pub(crate) fn schedule<C, T, F>(&mut self, link: &Scope<C>, deferred: Deferred<T>, to_msg: F)
    where
        C: Component,
        T: 'static,
        F: FnOnce(TimerId, T) -> C::Message + 'static,
    {
        let Deferred { after_ms, tick } = deferred;
        let link = link.clone();
        self.arm(|id| Timeout::new(after_ms, move || link.send_message(to_msg(id, tick))));
    }
}

impl<H> Drop for TimerBank<H> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
