//! Ownership of the live rendering instance behind one surface.
//!
//! A surface holds at most one [`RenderHandle`]. Starting a new load disposes
//! the current one and issues a [`LoadTicket`]; a handle that arrives with a
//! superseded ticket is disposed immediately instead of being installed.

use log::debug;

use super::RenderHandle;

/// Proof of which load a finished mount belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Default)]
pub struct SurfaceSlot {
	generation: u64,
	live: Option<Box<dyn RenderHandle>>,
}

impl SurfaceSlot {
	pub fn new() -> Self {
		Self::default()
	}

	/// Tears down the live instance and invalidates every earlier ticket.
	pub fn begin(&mut self) -> LoadTicket {
		self.generation += 1;
		self.dispose_live();
		LoadTicket(self.generation)
	}

	pub fn is_current(&self, ticket: LoadTicket) -> bool {
		ticket.0 == self.generation
	}

	/// Installs `handle` if `ticket` is still current, otherwise disposes it.
	/// Returns whether the handle was installed.
	pub fn install(&mut self, ticket: LoadTicket, handle: Box<dyn RenderHandle>) -> bool {
		if !self.is_current(ticket) {
			debug!("toile: discarding stale surface from load {}", ticket.0);
			handle.dispose();
			return false;
		}
		self.dispose_live();
		self.live = Some(handle);
		true
	}

	pub fn is_live(&self) -> bool {
		self.live.is_some()
	}

	pub fn resize(&self) {
		if let Some(handle) = &self.live {
			handle.resize();
		}
	}

	/// Disposes the live instance and cancels any load in flight.
	pub fn clear(&mut self) {
		self.generation += 1;
		self.dispose_live();
	}

	fn dispose_live(&mut self) {
		if let Some(handle) = self.live.take() {
			handle.dispose();
		}
	}
}

impl Drop for SurfaceSlot {
	fn drop(&mut self) {
		self.dispose_live();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::Cell;
	use std::rc::Rc;

	#[derive(Default)]
	struct Counters {
		disposed: Cell<usize>,
		resized: Cell<usize>,
	}

	struct MockHandle(Rc<Counters>);

	impl RenderHandle for MockHandle {
		fn resize(&self) {
			self.0.resized.set(self.0.resized.get() + 1);
		}

		fn dispose(self: Box<Self>) {
			self.0.disposed.set(self.0.disposed.get() + 1);
		}
	}

	fn handle(counters: &Rc<Counters>) -> Box<dyn RenderHandle> {
		Box::new(MockHandle(counters.clone()))
	}

	#[test]
	fn new_load_disposes_previous_instance() {
		let counters = Rc::new(Counters::default());
		let mut slot = SurfaceSlot::new();

		let first = slot.begin();
		assert!(slot.install(first, handle(&counters)));
		slot.resize();
		assert_eq!(counters.resized.get(), 1);

		let second = slot.begin();
		assert_eq!(counters.disposed.get(), 1);
		assert!(!slot.is_live());
		assert!(slot.install(second, handle(&counters)));
		assert!(slot.is_live());
	}

	#[test]
	fn stale_mount_is_disposed_not_installed() {
		let counters = Rc::new(Counters::default());
		let mut slot = SurfaceSlot::new();

		let stale = slot.begin();
		let fresh = slot.begin();
		assert!(!slot.is_current(stale));

		assert!(!slot.install(stale, handle(&counters)));
		assert_eq!(counters.disposed.get(), 1);
		assert!(!slot.is_live());

		assert!(slot.install(fresh, handle(&counters)));
		assert_eq!(counters.disposed.get(), 1);
	}

	#[test]
	fn clear_cancels_in_flight_loads() {
		let counters = Rc::new(Counters::default());
		let mut slot = SurfaceSlot::new();
		let ticket = slot.begin();
		slot.clear();
		assert!(!slot.install(ticket, handle(&counters)));
		assert_eq!(counters.disposed.get(), 1);
	}

	#[test]
	fn dropping_the_slot_disposes_the_live_instance() {
		let counters = Rc::new(Counters::default());
		{
			let mut slot = SurfaceSlot::new();
			let ticket = slot.begin();
			slot.install(ticket, handle(&counters));
		}
		assert_eq!(counters.disposed.get(), 1);
	}
}
