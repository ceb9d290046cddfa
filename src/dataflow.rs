//! Generic dataflow algorithm framework.

use std::hash::{ Hash };
use std::collections::{ VecDeque, HashSet };

// ------------------------------------------------------------------------------------------------
// JoinSemiLattice
// ------------------------------------------------------------------------------------------------

/// From rustc! `join` makes `self` the least upper bound of `self` and `other`, and returns `true`
/// if that changed `self`.
pub trait JoinSemiLattice: Eq {
	fn join(&mut self, other: &Self) -> bool;
}

// ------------------------------------------------------------------------------------------------
// WorkQueue
// ------------------------------------------------------------------------------------------------

/// Shamelessly ripped from `rustc_data_structures::WorkQueue`.
pub struct WorkQueue<T> {
	list: VecDeque<T>,
	// the set is here to avoid enqueueing items which are already in the queue.
	set:  HashSet<T>,
}

impl<T: Eq + Hash + Clone + Copy> WorkQueue<T> {
	pub fn new(cap: usize) -> Self {
		Self {
			list: VecDeque::with_capacity(cap),
			set: HashSet::with_capacity(cap),
		}
	}

	/// Adds `item` to the back, unless it's already waiting in the queue.
	pub fn enqueue(&mut self, item: T) {
		if self.set.insert(item) {
			self.list.push_back(item);
		}
	}

	pub fn dequeue(&mut self) -> Option<T> {
		if let Some(item) = self.list.pop_front() {
			self.set.remove(&item);
			Some(item)
		} else {
			None
		}
	}

	pub fn is_empty(&self) -> bool {
		self.list.is_empty()
	}
}

// ------------------------------------------------------------------------------------------------
// DataflowAlgorithm
// ------------------------------------------------------------------------------------------------

/// Trait for an abstract worklist dataflow algorithm. This implements the "boring" parts of
/// dataflow so that all you have to do is implement the interesting bits.
///
/// Nodes needn't be CFG blocks. It works just as well over instructions with edges going from
/// users to the definitions of their operands, which is how backward value-graph analyses (like
/// liveness) are done.
pub trait DataflowAlgorithm {
	/// Associated type used to uniquely identify each node.
	type ID: Eq + Hash + Clone + Copy;

	/// The main method you need to implement. Visits a node, performing the transfer function
	/// across it. For every node whose state grew as a result, call `changed` with it, and it'll be
	/// enqueued to be visited in the future.
	fn visit(&mut self, id: Self::ID, changed: &mut dyn FnMut(Self::ID));

	/// Runs the dataflow algorithm to fixpoint, starting from `seeds` (in that order). Returns how
	/// many visits it took. It's assumed that you'll look at your own state after the fact to
	/// determine the results.
	///
	/// This only terminates if states live in a lattice of finite height and only ever go up.
	fn run(&mut self, seeds: impl IntoIterator<Item = Self::ID>) -> usize {
		let mut work = WorkQueue::<Self::ID>::new(64);
		let mut visits = 0;

		for id in seeds {
			work.enqueue(id);
		}

		while let Some(id) = work.dequeue() {
			visits += 1;
			self.visit(id, &mut |next| work.enqueue(next));
		}

		visits
	}
}
