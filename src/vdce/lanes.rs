
use std::fmt::{ Debug, Formatter, Result as FmtResult };

use crate::dataflow::JoinSemiLattice;

// ------------------------------------------------------------------------------------------------
// LaneSet
// ------------------------------------------------------------------------------------------------

/// Vectors with more lanes than this aren't tracked per-lane; they're either entirely live or not.
pub const MAX_TRACKED_LANES: u32 = 64;

/// The set of live lanes of a value. Ordered by inclusion, with `All` on top.
///
/// A value that isn't a tracked vector only ever holds the empty set or `All`. For a tracked
/// vector, a set covering every lane is always stored as `All` (see [`normalized`]), so each value
/// can be in at most N+1 different states.
///
/// [`normalized`]: LaneSet::normalized
#[derive(PartialEq, Eq, Clone, Copy)]
pub enum LaneSet {
	/// Bit `i` set means lane `i` is live.
	Lanes(u64),
	/// Every lane (or the whole value, for non-vectors).
	All,
}

impl Default for LaneSet {
	fn default() -> Self {
		LaneSet::EMPTY
	}
}

impl Debug for LaneSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			LaneSet::All => write!(f, "ALL"),
			LaneSet::Lanes(mask) => {
				let lanes = (0 .. MAX_TRACKED_LANES).filter(|i| *mask & (1u64 << i) != 0);
				f.debug_set().entries(lanes).finish()
			}
		}
	}
}

/// Mask with the low `n` bits set.
fn mask(n: u32) -> u64 {
	if n >= 64 { !0 } else { (1u64 << n) - 1 }
}

impl LaneSet {
	pub const EMPTY: LaneSet = LaneSet::Lanes(0);

	/// Just `lane`.
	pub fn single(lane: u32) -> Self {
		if lane < MAX_TRACKED_LANES {
			LaneSet::Lanes(1 << lane)
		} else {
			LaneSet::All
		}
	}

	pub fn is_empty(&self) -> bool {
		*self == LaneSet::EMPTY
	}

	pub fn is_all(&self) -> bool {
		*self == LaneSet::All
	}

	pub fn contains(&self, lane: u32) -> bool {
		match self {
			LaneSet::All         => true,
			LaneSet::Lanes(mask) => lane < MAX_TRACKED_LANES && *mask & (1u64 << lane) != 0,
		}
	}

	/// `self ∪ other`.
	pub fn union(self, other: LaneSet) -> LaneSet {
		match (self, other) {
			(LaneSet::Lanes(a), LaneSet::Lanes(b)) => LaneSet::Lanes(a | b),
			_                                      => LaneSet::All,
		}
	}

	/// `self \ {lane}`, for a vector of `lanes` lanes.
	pub fn without(self, lane: u32, lanes: u32) -> LaneSet {
		let bits = match self {
			LaneSet::All         => mask(lanes),
			LaneSet::Lanes(bits) => bits,
		};

		if lane < MAX_TRACKED_LANES {
			LaneSet::Lanes(bits & !(1u64 << lane))
		} else {
			LaneSet::Lanes(bits)
		}
	}

	/// The lanes in `offset .. offset + width`, shifted down to start at 0. For the part of a
	/// vector that one operand of a construct covers.
	pub fn slice(self, offset: u32, width: u32) -> LaneSet {
		match self {
			LaneSet::All => LaneSet::All,
			LaneSet::Lanes(_) if offset >= MAX_TRACKED_LANES => LaneSet::EMPTY,
			LaneSet::Lanes(bits) => LaneSet::Lanes((bits >> offset) & mask(width)),
		}
	}

	/// Puts the set in canonical form for a value with `lanes` lanes, or for a value that isn't a
	/// tracked vector if `lanes` is `None`. Lanes past the end are dropped; a full set becomes
	/// `All`; any nonempty set on an untracked value becomes `All`.
	pub fn normalized(self, lanes: Option<u32>) -> LaneSet {
		match (self, lanes) {
			(LaneSet::All, _) => LaneSet::All,
			(LaneSet::Lanes(bits), Some(n)) if n <= MAX_TRACKED_LANES => {
				let full = mask(n);

				match bits & full {
					b if b == full => LaneSet::All,
					b              => LaneSet::Lanes(b),
				}
			}
			(LaneSet::Lanes(0), _) => LaneSet::EMPTY,
			(LaneSet::Lanes(_), _) => LaneSet::All,
		}
	}

	/// The live lanes of a vector with `lanes` lanes, in ascending order.
	pub fn iter(self, lanes: u32) -> impl Iterator<Item = u32> {
		(0 .. lanes).filter(move |&i| self.contains(i))
	}
}

impl JoinSemiLattice for LaneSet {
	fn join(&mut self, other: &Self) -> bool {
		let joined = self.union(*other);

		if joined != *self {
			*self = joined;
			true
		} else {
			false
		}
	}
}
