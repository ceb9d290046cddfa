
use smallvec::{ SmallVec };

use crate::ir::*;
use super::lanes::*;

// ------------------------------------------------------------------------------------------------
// LaneQuery
// ------------------------------------------------------------------------------------------------

/// Answers "how many lanes does this value have?" during the analysis.
pub trait LaneQuery {
	/// Lane count if `v` is a vector of any width, `None` otherwise.
	fn vector_lanes(&self, v: ValueId) -> Option<u32>;

	/// Lane count if `v` is a vector tracked per-lane.
	fn tracked_lanes(&self, v: ValueId) -> Option<u32> {
		self.vector_lanes(v).filter(|&n| n <= MAX_TRACKED_LANES)
	}
}

// ------------------------------------------------------------------------------------------------
// Transfer
// ------------------------------------------------------------------------------------------------

/// How demand on an instruction's result turns into demand on its operands.
///
/// Every arm but `Fallback` is exact about lanes, and is only chosen when the result (or for
/// `Extract`, the source) is a tracked vector. Everything else gets `Fallback`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Transfer {
	/// `result = base` with `lane` replaced by `obj`.
	Insert    { obj: ValueId, base: ValueId, lane: u32, lanes: u32 },
	/// `result = src[lane]`.
	Extract   { src: ValueId, lane: u32 },
	/// Each part covers `width` consecutive lanes of the result.
	Construct { parts: SmallVec<[(ValueId, u32); 4]> },
	/// Output lane `c` comes from `(a ++ b)[sels[c]]`.
	Shuffle   { a: ValueId, b: ValueId, a_lanes: u32, sels: SmallVec<[u32; 4]> },
	/// Same demand on every incoming value.
	Phi       { incoming: SmallVec<[ValueId; 4]> },
	/// Undef and constants. No operands worth demanding anything of.
	Terminal,
	/// Anything else: every value operand is entirely live if the result is.
	Fallback  { operands: SmallVec<[ValueId; 4]> },
}

impl Transfer {
	/// Picks the arm for `inst`.
	pub fn of(inst: &Inst, q: &impl LaneQuery) -> Self {
		let tracked_result = inst.result().and_then(|r| q.tracked_lanes(r));

		let exact = match (inst.opcode(), tracked_result) {
			(Opcode::Undef, _) | (Opcode::Constant, _) | (Opcode::ConstantComposite, _) =>
				Some(Transfer::Terminal),

			(Opcode::CompositeInsert, Some(lanes)) => inst.as_insert()
				.map(|(obj, base, lane)| Transfer::Insert { obj, base, lane, lanes }),

			(Opcode::CompositeExtract, _) => inst.as_extract()
				.filter(|&(src, _)| q.tracked_lanes(src).is_some())
				.map(|(src, lane)| Transfer::Extract { src, lane }),

			(Opcode::CompositeConstruct, Some(_)) => Some(Transfer::Construct {
				parts: inst.value_operands()
					.map(|(_, v)| (v, q.vector_lanes(v).unwrap_or(1)))
					.collect(),
			}),

			(Opcode::VectorShuffle, Some(_)) => inst.as_shuffle().and_then(|(a, b, sels)| {
				q.vector_lanes(a).map(|a_lanes| Transfer::Shuffle { a, b, a_lanes, sels })
			}),

			(Opcode::Phi, Some(_)) => Some(Transfer::Phi {
				incoming: inst.phi_incoming().map(|(v, _)| v).collect(),
			}),

			_ => None,
		};

		exact.unwrap_or_else(|| Transfer::Fallback {
			operands: inst.value_operands().map(|(_, v)| v).collect(),
		})
	}

	/// `true` for the arms that track lanes exactly.
	pub fn is_exact(&self) -> bool {
		!matches!(self, Transfer::Fallback { .. })
	}

	/// For a `CompositeInsert`, whether its write is dead given the live lanes of its result.
	pub fn is_dead_insert(&self, live: LaneSet) -> bool {
		match self {
			Transfer::Insert { lane, .. } => !live.contains(*lane),
			_                             => false,
		}
	}

	/// Calls `demand(operand, lanes)` with what each operand must provide so that the `live`
	/// lanes of the result are right. Demands aren't normalized, and an operand may be named more
	/// than once.
	pub fn demands(&self, live: LaneSet, mut demand: impl FnMut(ValueId, LaneSet)) {
		if live.is_empty() {
			return;
		}

		match self {
			Transfer::Insert { obj, base, lane, lanes } => {
				if live.contains(*lane) {
					demand(*obj, LaneSet::All);
					demand(*base, live.without(*lane, *lanes));
				} else {
					demand(*base, live);
				}
			}

			Transfer::Extract { src, lane } => demand(*src, LaneSet::single(*lane)),

			Transfer::Construct { parts } => {
				let mut offset = 0;

				for &(part, width) in parts.iter() {
					demand(part, live.slice(offset, width));
					offset += width;
				}
			}

			Transfer::Shuffle { a, b, a_lanes, sels } => {
				let mut from_a = LaneSet::EMPTY;
				let mut from_b = LaneSet::EMPTY;

				for (c, &sel) in sels.iter().enumerate() {
					if sel == Opcode::SHUFFLE_UNDEF || !live.contains(c as u32) {
						continue;
					}

					if sel < *a_lanes {
						from_a = from_a.union(LaneSet::single(sel));
					} else {
						from_b = from_b.union(LaneSet::single(sel - a_lanes));
					}
				}

				demand(*a, from_a);
				demand(*b, from_b);
			}

			Transfer::Phi { incoming } => {
				for &v in incoming.iter() {
					demand(v, live);
				}
			}

			Transfer::Terminal => {}

			Transfer::Fallback { operands } => {
				for &v in operands.iter() {
					demand(v, LaneSet::All);
				}
			}
		}
	}
}

/// Whether `inst` makes its operands live on its own account, regardless of any demand on its
/// result. Only fallback instructions can be roots; they are as soon as they have a side effect,
/// end a block, produce no result, or have any use at all.
pub fn is_root(inst: &Inst, transfer: &Transfer, has_uses: bool) -> bool {
	let opcode = inst.opcode();

	!transfer.is_exact() &&
		(opcode.has_side_effect() || opcode.is_terminator() || inst.result().is_none() || has_uses)
}
