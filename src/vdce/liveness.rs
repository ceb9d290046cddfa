
use std::collections::{ HashMap, HashSet };

use crate::dataflow::{ DataflowAlgorithm, JoinSemiLattice };
use crate::ir::*;
use super::lanes::*;
use super::transfer::*;

// ------------------------------------------------------------------------------------------------
// ValueLanes
// ------------------------------------------------------------------------------------------------

/// [`LaneQuery`] over one function's values and the module's globals.
pub struct ValueLanes<'a> {
	types:   &'a TypeTable,
	globals: &'a Globals,
	local:   HashMap<ValueId, TypeId>,
}

impl<'a> ValueLanes<'a> {
	pub fn new(types: &'a TypeTable, globals: &'a Globals, func: &Function) -> Self {
		let local = func.insts()
			.filter_map(|(_, inst)| inst.result().zip(inst.ty()))
			.collect();

		Self { types, globals, local }
	}
}

impl<'a> LaneQuery for ValueLanes<'a> {
	fn vector_lanes(&self, v: ValueId) -> Option<u32> {
		let ty = self.local.get(&v).copied().or_else(|| self.globals.ty(v))?;
		self.types.lanes(ty)
	}
}

// ------------------------------------------------------------------------------------------------
// LaneLiveness
// ------------------------------------------------------------------------------------------------

/// The result of the analysis: the live lanes of every value.
#[derive(Debug, Default)]
pub struct LaneLiveness {
	live:   HashMap<ValueId, LaneSet>,
	visits: usize,
}

impl LaneLiveness {
	/// Live lanes of `v`. Values nothing ever demanded are empty.
	pub fn live(&self, v: ValueId) -> LaneSet {
		self.live.get(&v).copied().unwrap_or_default()
	}

	/// How many instruction visits it took to reach the fixpoint.
	pub fn visits(&self) -> usize {
		self.visits
	}

	/// Every value with a nonempty live set, in no particular order.
	pub fn iter(&self) -> impl Iterator<Item = (ValueId, LaneSet)> + '_ {
		self.live.iter().filter(|(_, s)| !s.is_empty()).map(|(v, s)| (*v, *s))
	}
}

/// Finds the least fixpoint of lane demands over `func`, working backwards from the roots (see
/// [`is_root`]). Monotone and bounded, so loops through phis terminate.
pub fn analyze_function(func: &Function, du: &DefUse, q: &impl LaneQuery) -> LaneLiveness {
	let mut transfers = HashMap::new();
	let mut roots = HashSet::new();
	let mut seeds = Vec::new();
	let mut live = HashMap::new();

	for (id, inst) in func.insts() {
		let transfer = Transfer::of(inst, q);
		let has_uses = inst.result().map(|r| du.use_count(r) > 0).unwrap_or(false);

		if is_root(inst, &transfer, has_uses) {
			roots.insert(id);
			seeds.push(id);

			// a root's own result is entirely live, too.
			if let Some(r) = inst.result().filter(|&r| q.tracked_lanes(r).is_some()) {
				live.insert(r, LaneSet::All);
			}
		}

		transfers.insert(id, transfer);
	}

	log::trace!("{}: {} roots", func.name(), seeds.len());

	let mut solver = Solver {
		func,
		du,
		q,
		transfers,
		roots,
		live,
	};

	let visits = solver.run(seeds);
	log::trace!("{}: fixpoint after {} visits", func.name(), visits);

	LaneLiveness { live: solver.live, visits }
}

// ------------------------------------------------------------------------------------------------
// Solver
// ------------------------------------------------------------------------------------------------

struct Solver<'a, Q> {
	func:      &'a Function,
	du:        &'a DefUse,
	q:         &'a Q,
	transfers: HashMap<InstId, Transfer>,
	roots:     HashSet<InstId>,
	live:      HashMap<ValueId, LaneSet>,
}

impl<'a, Q: LaneQuery> DataflowAlgorithm for Solver<'a, Q> {
	type ID = InstId;

	fn visit(&mut self, id: InstId, changed: &mut dyn FnMut(InstId)) {
		let Self { func, du, q, transfers, roots, live } = self;

		let (inst, transfer) = match (func.inst(id), transfers.get(&id)) {
			(Some(inst), Some(transfer)) => (inst, transfer),
			_                            => return,
		};

		let demand = if roots.contains(&id) {
			LaneSet::All
		} else {
			inst.result().and_then(|r| live.get(&r).copied()).unwrap_or_default()
		};

		transfer.demands(demand, |v, lanes| {
			let lanes = lanes.normalized(q.tracked_lanes(v));

			if lanes.is_empty() {
				return;
			}

			let entry = live.entry(v).or_default();

			if entry.join(&lanes) {
				*entry = entry.normalized(q.tracked_lanes(v));
				log::trace!("  {:?} <- {:?} (from {:?})", v, *entry, inst.opcode());

				if let Some(def) = du.def(v) {
					changed(def);
				}
			}
		});
	}
}
