
use bitflags::bitflags;
use parse_display::Display;
use smallvec::{ SmallVec };

use super::*;

// ------------------------------------------------------------------------------------------------
// OpFlags
// ------------------------------------------------------------------------------------------------

bitflags! {
	/// Properties of an [`Opcode`] which analyses care about.
	pub struct OpFlags: u8 {
		/// Does something observable besides producing its result.
		const SIDE_EFFECT = 0b001;
		/// Ends a basic block.
		const TERMINATOR  = 0b010;
		/// Never produces a result.
		const NO_RESULT   = 0b100;
	}
}

// ------------------------------------------------------------------------------------------------
// Opcode
// ------------------------------------------------------------------------------------------------

/// Instruction opcodes.
#[derive(Debug, Display, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Opcode {
	#[display("undef")]        Undef,             // r = undefined
	#[display("const")]        Constant,          // r = literal bits
	#[display("constcomp")]    ConstantComposite, // r = { consts... }

	#[display("load")]         Load,              // r = *ptr
	#[display("store")]        Store,             // *ptr = val
	#[display("accesschain")]  AccessChain,       // r = &base[idx...]
	#[display("copy")]         CopyObject,        // r = val

	#[display("fadd")]         FAdd,
	#[display("fsub")]         FSub,
	#[display("fmul")]         FMul,
	#[display("iadd")]         IAdd,
	#[display("isub")]         ISub,
	#[display("imul")]         IMul,
	#[display("islt")]         SLessThan,
	#[display("ine")]          INotEqual,
	#[display("vtimess")]      VectorTimesScalar,
	#[display("dot")]          Dot,
	// extended instructions are math library functions, so they're assumed to be pure.
	#[display("extinst")]      ExtInst,           // r = extended_set[lit](args...)

	#[display("insert")]       CompositeInsert,   // r = base with [lane] = obj
	#[display("extract")]      CompositeExtract,  // r = src[lane]
	#[display("construct")]    CompositeConstruct,// r = { parts... }
	#[display("shuffle")]      VectorShuffle,     // r = { (a ++ b)[sel]... }
	#[display("phi")]          Phi,               // r = φ(val, pred, ...)

	#[display("call")]         FunctionCall,
	#[display("br")]           Branch,
	#[display("brc")]          BranchConditional,
	#[display("ret")]          Return,
	#[display("retv")]         ReturnValue,
	#[display("unreachable")]  Unreachable,
}

impl Opcode {
	/// Don't-care selector for `VectorShuffle`; that output lane is undefined.
	pub const SHUFFLE_UNDEF: u32 = 0xFFFF_FFFF;

	pub fn flags(self) -> OpFlags {
		use Opcode::*;

		match self {
			Store                       => OpFlags::SIDE_EFFECT | OpFlags::NO_RESULT,
			FunctionCall                => OpFlags::SIDE_EFFECT,
			Branch
			| BranchConditional
			| Return
			| ReturnValue
			| Unreachable               => OpFlags::TERMINATOR | OpFlags::NO_RESULT,
			_                           => OpFlags::empty(),
		}
	}

	#[inline]
	pub fn has_side_effect(self) -> bool {
		self.flags().contains(OpFlags::SIDE_EFFECT)
	}

	#[inline]
	pub fn is_terminator(self) -> bool {
		self.flags().contains(OpFlags::TERMINATOR)
	}

	/// `true` if removing an unused instruction with this opcode can't change the program.
	#[inline]
	pub fn is_pure(self) -> bool {
		!self.flags().intersects(OpFlags::SIDE_EFFECT | OpFlags::TERMINATOR)
	}
}

// ------------------------------------------------------------------------------------------------
// Operand
// ------------------------------------------------------------------------------------------------

/// One operand of an instruction.
#[derive(PartialEq, Eq, Clone, Copy, Hash)]
pub enum Operand {
	Value(ValueId),
	Block(BlockId),
	Literal(u32),
}

impl Debug for Operand {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Operand::Value(v)   => write!(f, "{:?}", v),
			Operand::Block(b)   => write!(f, "{:?}", b),
			Operand::Literal(l) => write!(f, "{}", l),
		}
	}
}

impl Operand {
	pub fn value(&self) -> Option<ValueId> {
		match self {
			Operand::Value(v) => Some(*v),
			_                 => None,
		}
	}

	pub fn block(&self) -> Option<BlockId> {
		match self {
			Operand::Block(b) => Some(*b),
			_                 => None,
		}
	}

	pub fn literal(&self) -> Option<u32> {
		match self {
			Operand::Literal(l) => Some(*l),
			_                   => None,
		}
	}
}

impl From<ValueId> for Operand {
	fn from(v: ValueId) -> Self {
		Operand::Value(v)
	}
}

impl From<BlockId> for Operand {
	fn from(b: BlockId) -> Self {
		Operand::Block(b)
	}
}

/// Most instructions have few operands.
pub type Operands = SmallVec<[Operand; 4]>;

// ------------------------------------------------------------------------------------------------
// Inst
// ------------------------------------------------------------------------------------------------

/// A single instruction. Operand layout per opcode:
///
/// - `CompositeInsert`: object value, base value, lane literal
/// - `CompositeExtract`: source value, lane literal
/// - `VectorShuffle`: vector a, vector b, one selector literal per result lane
/// - `Phi`: (value, predecessor block) pairs
/// - `Constant`: literal bits; `ExtInst`: instruction number literal, then values
/// - terminators: their successor blocks (after the condition, for `BranchConditional`)
#[derive(PartialEq, Eq, Clone)]
pub struct Inst {
	opcode:   Opcode,
	result:   Option<ValueId>,
	ty:       Option<TypeId>,
	operands: Operands,
}

impl Debug for Inst {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		if let Some(result) = self.result {
			write!(f, "{:?} = ", result)?;
		}

		write!(f, "{}", self.opcode)?;

		if let Some(ty) = self.ty {
			write!(f, " {:?}", ty)?;
		}

		for op in self.operands.iter() {
			write!(f, " {:?}", op)?;
		}

		Ok(())
	}
}

impl Inst {
	/// Constructor. `result` and `ty` must be both present or both absent.
	pub fn new(
		opcode:   Opcode,
		result:   Option<(ValueId, TypeId)>,
		operands: impl IntoIterator<Item = Operand>,
	) -> Self {
		Self {
			opcode,
			result: result.map(|(v, _)| v),
			ty: result.map(|(_, t)| t),
			operands: operands.into_iter().collect(),
		}
	}

	#[inline] pub fn opcode(&self) -> Opcode { self.opcode }
	#[inline] pub fn result(&self) -> Option<ValueId> { self.result }
	#[inline] pub fn ty(&self) -> Option<TypeId> { self.ty }
	#[inline] pub fn operands(&self) -> &[Operand] { &self.operands }

	/// Iterator over `(operand position, value)` for every value operand.
	pub fn value_operands(&self) -> impl Iterator<Item = (usize, ValueId)> + '_ {
		self.operands.iter().enumerate().filter_map(|(i, op)| op.value().map(|v| (i, v)))
	}

	/// Literal operands, in order.
	pub fn literals(&self) -> impl Iterator<Item = u32> + '_ {
		self.operands.iter().filter_map(Operand::literal)
	}

	/// Overwrites operand `i`. Only the def-use index should do this, so that it stays in sync.
	pub(crate) fn set_operand(&mut self, i: usize, op: Operand) {
		self.operands[i] = op;
	}

	/// Appends an operand. Used to fill in phis whose incoming values are defined later.
	pub(crate) fn push_operand(&mut self, op: Operand) {
		self.operands.push(op);
	}

	/// Successor blocks, if this is a terminator.
	pub fn successors(&self) -> impl Iterator<Item = BlockId> + '_ {
		let is_term = self.opcode.is_terminator();
		self.operands.iter().filter_map(move |op| if is_term { op.block() } else { None })
	}

	// --------------------------------------------------------------------------------------------
	// Typed views of the composite opcodes

	/// `(object, base, lane)` if this is a well-formed `CompositeInsert`.
	pub fn as_insert(&self) -> Option<(ValueId, ValueId, u32)> {
		match (self.opcode, &self.operands[..]) {
			(Opcode::CompositeInsert,
				[Operand::Value(obj), Operand::Value(base), Operand::Literal(lane)]) =>
				Some((*obj, *base, *lane)),
			_ => None,
		}
	}

	/// `(source, lane)` if this is a well-formed `CompositeExtract`.
	pub fn as_extract(&self) -> Option<(ValueId, u32)> {
		match (self.opcode, &self.operands[..]) {
			(Opcode::CompositeExtract, [Operand::Value(src), Operand::Literal(lane)]) =>
				Some((*src, *lane)),
			_ => None,
		}
	}

	/// `(a, b, selectors)` if this is a well-formed `VectorShuffle`.
	pub fn as_shuffle(&self) -> Option<(ValueId, ValueId, SmallVec<[u32; 4]>)> {
		match (self.opcode, &self.operands[..]) {
			(Opcode::VectorShuffle, [Operand::Value(a), Operand::Value(b), sels @ ..]) => {
				let sels = sels.iter().map(Operand::literal).collect::<Option<SmallVec<_>>>()?;
				Some((*a, *b, sels))
			}
			_ => None,
		}
	}

	/// Incoming `(value, predecessor)` pairs if this is a `Phi`.
	pub fn phi_incoming(&self) -> impl Iterator<Item = (ValueId, BlockId)> + '_ {
		let pairs: &[Operand] = if self.opcode == Opcode::Phi { &self.operands } else { &[] };

		pairs.chunks(2).filter_map(|pair| match pair {
			[Operand::Value(v), Operand::Block(b)] => Some((*v, *b)),
			_                                      => None,
		})
	}
}
