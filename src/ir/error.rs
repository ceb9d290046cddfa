use std::error::Error;

use parse_display::Display;

use crate::ir::{ BlockId, ValueId };

// ------------------------------------------------------------------------------------------------
// IrErrorKind
// ------------------------------------------------------------------------------------------------

/// The kinds of malformed IR the verifier can find.
#[derive(Debug, Display, PartialEq, Eq, Clone)]
pub enum IrErrorKind {
	/// An operand refers to a value which is neither a global nor defined in the function.
	#[display("use of undefined value %{0}")]
	UndefinedValue(u32),

	/// Two instructions (or an instruction and a global) define the same value.
	#[display("value %{0} is defined more than once")]
	Redefined(u32),

	/// A block doesn't end in a terminator.
	#[display("block bb{0} has no terminator")]
	MissingTerminator(u32),

	/// A terminator appears somewhere other than the end of its block.
	#[display("block bb{0} has a terminator before its end")]
	EarlyTerminator(u32),

	/// An operand or phi names a block that doesn't exist.
	#[display("reference to nonexistent block bb{0}")]
	UnknownBlock(u32),

	/// A phi's incoming blocks don't match its block's CFG predecessors.
	#[display("phi %{value} in bb{block} doesn't match the block's predecessors")]
	PhiPredecessors { value: u32, block: u32 },

	/// A phi appears after a non-phi instruction.
	#[display("phi %{0} is not at the start of its block")]
	MisplacedPhi(u32),

	/// An insert/extract lane is past the end of the vector.
	#[display("lane {lane} is out of range for %{value} ({lanes} lanes)")]
	LaneOutOfRange { value: u32, lane: u32, lanes: u32 },

	/// A shuffle selector indexes past both input vectors.
	#[display("shuffle %{value} selector {sel} is out of range")]
	BadSelector { value: u32, sel: u32 },

	/// Wrong number or kind of operands for the opcode.
	#[display("malformed operands for {opcode} (result {result})")]
	BadOperands { opcode: String, result: String },

	/// An operand or result has the wrong type for the opcode.
	#[display("type mismatch in {opcode} (result {result})")]
	TypeMismatch { opcode: String, result: String },

	/// Result and result type must come together, and only on opcodes that have results.
	#[display("bad result for {opcode}")]
	BadResult { opcode: String },
}

// ------------------------------------------------------------------------------------------------
// IrError
// ------------------------------------------------------------------------------------------------

/// The IR error type.
#[derive(Debug, Display, PartialEq, Eq, Clone)]
#[display("malformed IR in function '{func}': {kind}")]
pub struct IrError {
	/// Name of the function being checked.
	pub func: String,
	/// kind of error.
	pub kind: IrErrorKind,
}

impl Error for IrError {}

impl IrError {
	pub fn new(func: &str, kind: IrErrorKind) -> Self {
		Self { func: func.into(), kind }
	}

	/// Shorthand constructors.
	pub fn undefined_value(func: &str, v: ValueId) -> Self {
		Self::new(func, IrErrorKind::UndefinedValue(v.0))
	}

	/// Ditto.
	pub fn redefined(func: &str, v: ValueId) -> Self {
		Self::new(func, IrErrorKind::Redefined(v.0))
	}

	/// Ditto.
	pub fn missing_terminator(func: &str, bb: BlockId) -> Self {
		Self::new(func, IrErrorKind::MissingTerminator(bb.0))
	}

	/// Ditto.
	pub fn unknown_block(func: &str, bb: BlockId) -> Self {
		Self::new(func, IrErrorKind::UnknownBlock(bb.0))
	}
}

// ------------------------------------------------------------------------------------------------
// IrResult
// ------------------------------------------------------------------------------------------------

/// Alias for a `Result` with an `IrError` as its error type.
pub type IrResult<T> = Result<T, IrError>;
