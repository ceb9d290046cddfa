
use std::collections::{ HashMap };
use super::*;

// ------------------------------------------------------------------------------------------------
// Use
// ------------------------------------------------------------------------------------------------

/// One use of a value: which instruction uses it, and in which operand slot.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Use {
	pub inst:    InstId,
	pub operand: usize,
}

// ------------------------------------------------------------------------------------------------
// DefUse
// ------------------------------------------------------------------------------------------------

/// Def-use index for one function. Maps each value to the instruction that defines it (globals have
/// none) and to every operand slot that uses it.
///
/// The index is only kept in sync by editing the function *through* it, with
/// [`replace_all_uses`](Self::replace_all_uses) and [`erase`](Self::erase).
#[derive(Default)]
pub struct DefUse {
	defs: HashMap<ValueId, InstId>,
	uses: HashMap<ValueId, Vec<Use>>,
}

impl DefUse {
	/// Builds the index. Linear time in the number of operands.
	pub fn build(func: &Function) -> Self {
		let mut ret = Self::default();

		for (id, inst) in func.insts() {
			if let Some(v) = inst.result() {
				ret.defs.insert(v, id);
			}

			for (operand, v) in inst.value_operands() {
				ret.uses.entry(v).or_default().push(Use { inst: id, operand });
			}
		}

		ret
	}

	/// The instruction defining `v`. `None` for globals and values this function doesn't define.
	pub fn def(&self, v: ValueId) -> Option<InstId> {
		self.defs.get(&v).copied()
	}

	/// Every use of `v`, in no particular order.
	pub fn uses(&self, v: ValueId) -> &[Use] {
		self.uses.get(&v).map(|u| &u[..]).unwrap_or(&[])
	}

	pub fn use_count(&self, v: ValueId) -> usize {
		self.uses(v).len()
	}

	/// Instructions using `v`, each listed once, in no particular order.
	pub fn users(&self, v: ValueId) -> impl Iterator<Item = InstId> + '_ {
		let uses = self.uses(v);
		uses.iter()
			.enumerate()
			.filter(move |&(i, u)| !uses[..i].iter().any(|prev| prev.inst == u.inst))
			.map(|(_, u)| u.inst)
	}

	/// Uses of `v` by instructions other than `id` (e.g. other than a phi feeding itself).
	pub fn use_count_excluding(&self, v: ValueId, id: InstId) -> usize {
		self.uses(v).iter().filter(|u| u.inst != id).count()
	}

	/// Rewrites every use of `old` into a use of `new`. Returns how many operands changed.
	pub fn replace_all_uses(&mut self, func: &mut Function, old: ValueId, new: ValueId) -> usize {
		if old == new {
			return 0;
		}

		let moved = self.uses.remove(&old).unwrap_or_default();

		for u in moved.iter() {
			// safe, since erase() removes an instruction's uses along with it.
			let inst = func.inst_mut(u.inst).unwrap();
			inst.set_operand(u.operand, Operand::Value(new));
		}

		let n = moved.len();

		if n > 0 {
			self.uses.entry(new).or_default().extend(moved);
		}

		n
	}

	/// Erases an instruction from `func`, dropping its operand uses and its result def from the
	/// index. Anything still using its result is left dangling, so callers should make sure there
	/// is nothing. Returns `None` if it was already gone.
	pub fn erase(&mut self, func: &mut Function, id: InstId) -> Option<Inst> {
		let inst = func.erase_inst(id)?;

		for (_, v) in inst.value_operands() {
			if let Some(uses) = self.uses.get_mut(&v) {
				uses.retain(|u| u.inst != id);

				if uses.is_empty() {
					self.uses.remove(&v);
				}
			}
		}

		if let Some(v) = inst.result() {
			self.defs.remove(&v);
		}

		Some(inst)
	}
}
