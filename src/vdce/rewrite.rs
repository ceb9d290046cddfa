
use std::collections::{ HashSet };

use crate::dataflow::WorkQueue;
use crate::ir::*;
use super::liveness::*;
use super::transfer::*;

// ------------------------------------------------------------------------------------------------
// Rewriting
// ------------------------------------------------------------------------------------------------

/// Applies `liveness` to `func`:
///
/// 1. every insert whose lane is dead has its uses redirected to its base;
/// 2. if `delete_dead`, those inserts and every pure instruction producing a tracked vector with
///    no live lanes are erased, as long as nothing outside that group still uses them;
/// 3. then pure instructions left without uses by those erasures are erased too.
///
/// `du` must be up to date with `func`, and stays so. Returns whether anything changed.
pub fn apply_liveness(
	func:        &mut Function,
	du:          &mut DefUse,
	q:           &impl LaneQuery,
	liveness:    &LaneLiveness,
	delete_dead: bool,
) -> bool {
	let mut changed = false;
	let dead_inserts = find_dead_inserts(func, q, liveness);

	for &(id, result) in dead_inserts.iter() {
		// bases are read now rather than during analysis, since an earlier elision in this same
		// loop may have rewired this insert's base.
		let base = match func.inst(id).and_then(Inst::as_insert) {
			Some((_, base, _)) => base,
			None               => continue,
		};

		let n = du.replace_all_uses(func, result, base);

		if n > 0 {
			log::debug!("{}: dead insert {:?}, {} use(s) now use {:?}", func.name(), result, n, base);
			changed = true;
		}
	}

	if delete_dead {
		let candidates = dead_inserts.iter()
			.map(|&(id, _)| id)
			.chain(find_empty_vectors(func, q, liveness))
			.collect();

		changed |= erase_unused_group(func, du, candidates);
	}

	changed
}

/// `(inst, result)` for every insert whose written lane isn't live, in program order.
fn find_dead_inserts(func: &Function, q: &impl LaneQuery, liveness: &LaneLiveness)
-> Vec<(InstId, ValueId)> {
	let mut ret = Vec::new();

	for (id, inst) in func.insts() {
		if inst.opcode() != Opcode::CompositeInsert {
			continue;
		}

		if let Some(result) = inst.result() {
			if Transfer::of(inst, q).is_dead_insert(liveness.live(result)) {
				ret.push((id, result));
			}
		}
	}

	ret
}

/// Pure instructions producing a tracked vector with no live lanes.
fn find_empty_vectors<'f>(func: &'f Function, q: &'f impl LaneQuery, liveness: &'f LaneLiveness)
-> impl Iterator<Item = InstId> + 'f {
	func.insts().filter_map(move |(id, inst)| {
		let result = inst.result()?;

		if inst.opcode().is_pure()
		&& q.tracked_lanes(result).is_some()
		&& liveness.live(result).is_empty() {
			Some(id)
		} else {
			None
		}
	})
}

/// Erases the members of `candidates` that are only used by other members, then cascades into
/// operands. Returns `true` if anything was erased.
fn erase_unused_group(func: &mut Function, du: &mut DefUse, candidates: Vec<InstId>) -> bool {
	let mut group = candidates.into_iter().collect::<HashSet<_>>();

	// drop anything with an outside user until nothing else drops out.
	loop {
		let before = group.len();

		let keep = group.iter()
			.copied()
			.filter(|&id| {
				func.inst(id)
					.and_then(Inst::result)
					.map(|r| du.uses(r).iter().all(|u| group.contains(&u.inst)))
					.unwrap_or(false)
			})
			.collect::<HashSet<_>>();

		group = keep;

		if group.len() == before {
			break;
		}
	}

	if group.is_empty() {
		return false;
	}

	let mut operands = WorkQueue::new(group.len());

	// program order, so the log reads top to bottom.
	let order = func.inst_ids().filter(|id| group.contains(id)).collect::<Vec<_>>();

	for id in order {
		if let Some(inst) = du.erase(func, id) {
			log::debug!("{}: erased {:?}", func.name(), inst);

			for (_, v) in inst.value_operands() {
				operands.enqueue(v);
			}
		}
	}

	while let Some(v) = operands.dequeue() {
		let def = match du.def(v) {
			Some(def) => def,
			None      => continue,
		};

		let erasable = func.inst(def)
			.map(|inst| inst.opcode().is_pure() && du.use_count_excluding(v, def) == 0)
			.unwrap_or(false);

		if erasable {
			if let Some(inst) = du.erase(func, def) {
				log::debug!("{}: erased {:?} (no uses left)", func.name(), inst);

				for (_, op) in inst.value_operands() {
					operands.enqueue(op);
				}
			}
		}
	}

	true
}
