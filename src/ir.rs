use std::fmt::{ Debug, Formatter, Result as FmtResult };

use delegate::delegate;
use generational_arena::{ Arena, Index };
use petgraph::{
	Direction,
	graphmap::{ DiGraphMap },
	dot::{ Dot, Config as DotConfig },
};

// ------------------------------------------------------------------------------------------------
// Sub-modules
// ------------------------------------------------------------------------------------------------

pub mod builder;
pub mod defuse;
pub mod error;
pub mod inst;
pub mod module;
pub mod print;
pub mod types;
pub mod verify;

pub use builder::*;
pub use defuse::*;
pub use error::*;
pub use inst::*;
pub use module::*;
pub use print::*;
pub use types::*;
pub use verify::*;

// ------------------------------------------------------------------------------------------------
// ValueId
// ------------------------------------------------------------------------------------------------

/// Names an SSA value: an instruction's result or a module global. Unique across a [`Module`].
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct ValueId(pub u32);

impl Debug for ValueId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "%{}", self.0)
	}
}

// ------------------------------------------------------------------------------------------------
// BlockId
// ------------------------------------------------------------------------------------------------

/// Index of a basic block within its [`Function`]. Block 0 is the entry.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct BlockId(pub u32);

impl Debug for BlockId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "bb{}", self.0)
	}
}

// ------------------------------------------------------------------------------------------------
// InstId
// ------------------------------------------------------------------------------------------------

/// Names an instruction within its [`Function`]. Once the instruction is erased, its ID will
/// never resolve again, even if the slot is reused.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct InstId(pub Index);

impl Debug for InstId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let (index, generation) = self.0.into_raw_parts();
		write!(f, "InstId({}, {})", index, generation)
	}
}

// ------------------------------------------------------------------------------------------------
// BasicBlock
// ------------------------------------------------------------------------------------------------

/// An ordered list of instructions, the last of which is a terminator.
pub struct BasicBlock {
	id:    BlockId,
	insts: Vec<InstId>,
}

impl BasicBlock {
	fn new(id: BlockId) -> Self {
		Self { id, insts: Vec::new() }
	}

	pub fn id(&self) -> BlockId {
		self.id
	}

	pub fn insts(&self) -> impl Iterator<Item = InstId> + '_ {
		self.insts.iter().copied()
	}

	delegate! {
		to self.insts {
			/// How many instructions it has.
			pub fn len(&self) -> usize;
			/// True if it has no instructions at all (not even a terminator).
			pub fn is_empty(&self) -> bool;
		}
	}

	/// The last instruction, which should be the terminator.
	pub fn last(&self) -> Option<InstId> {
		self.insts.last().copied()
	}

	fn position(&self, id: InstId) -> Option<usize> {
		self.insts.iter().position(|&i| i == id)
	}
}

// ------------------------------------------------------------------------------------------------
// Function
// ------------------------------------------------------------------------------------------------

/// Control flow graph of a function. Nodes are blocks, edges go from a block to its successors.
pub type IrCfg = DiGraphMap<BlockId, ()>;

/// A function body. Instructions live in an arena; blocks list them in program order.
pub struct Function {
	name:   String,
	blocks: Vec<BasicBlock>,
	insts:  Arena<Inst>,
}

impl Function {
	pub fn new(name: &str) -> Self {
		Self {
			name: name.into(),
			blocks: Vec::new(),
			insts: Arena::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Adds a new, empty block at the end and returns its ID.
	pub fn add_block(&mut self) -> BlockId {
		let id = BlockId(self.blocks.len() as u32);
		self.blocks.push(BasicBlock::new(id));
		id
	}

	pub fn entry(&self) -> BlockId {
		BlockId(0)
	}

	pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> {
		self.blocks.iter()
	}

	pub fn num_blocks(&self) -> usize {
		self.blocks.len()
	}

	/// Panics if `id` is not a block of this function.
	pub fn block(&self, id: BlockId) -> &BasicBlock {
		&self.blocks[id.0 as usize]
	}

	pub fn has_block(&self, id: BlockId) -> bool {
		(id.0 as usize) < self.blocks.len()
	}

	/// Appends `inst` to the end of `block`.
	pub fn append(&mut self, block: BlockId, inst: Inst) -> InstId {
		let id = InstId(self.insts.insert(inst));
		self.blocks[block.0 as usize].insts.push(id);
		id
	}

	/// Inserts `inst` right before the instruction `before`. Returns `None` (and does nothing)
	/// if `before` is no longer in the function.
	pub fn insert_before(&mut self, before: InstId, inst: Inst) -> Option<InstId> {
		let (bb, pos) = self.locate(before)?;
		let id = InstId(self.insts.insert(inst));
		self.blocks[bb].insts.insert(pos, id);
		Some(id)
	}

	/// Removes an instruction from the function, returning it. `None` if it was already gone.
	pub fn erase_inst(&mut self, id: InstId) -> Option<Inst> {
		let (bb, pos) = self.locate(id)?;
		self.blocks[bb].insts.remove(pos);
		self.insts.remove(id.0)
	}

	pub fn inst(&self, id: InstId) -> Option<&Inst> {
		self.insts.get(id.0)
	}

	pub(crate) fn inst_mut(&mut self, id: InstId) -> Option<&mut Inst> {
		self.insts.get_mut(id.0)
	}

	pub fn contains(&self, id: InstId) -> bool {
		self.insts.contains(id.0)
	}

	pub fn num_insts(&self) -> usize {
		self.insts.len()
	}

	/// Which block an instruction is in.
	pub fn block_of(&self, id: InstId) -> Option<BlockId> {
		self.locate(id).map(|(bb, _)| BlockId(bb as u32))
	}

	/// All instruction IDs, in program order (blocks in order, instructions in order).
	pub fn inst_ids(&self) -> impl Iterator<Item = InstId> + '_ {
		self.blocks.iter().flat_map(|bb| bb.insts())
	}

	/// All instructions in program order, along with their IDs.
	pub fn insts(&self) -> impl Iterator<Item = (InstId, &Inst)> + '_ {
		self.inst_ids().map(move |id| (id, &self.insts[id.0]))
	}

	/// Builds the control flow graph from the block terminators.
	pub fn cfg(&self) -> IrCfg {
		let mut cfg = IrCfg::new();

		for bb in self.blocks.iter() {
			cfg.add_node(bb.id);
		}

		for bb in self.blocks.iter() {
			if let Some(term) = bb.last().and_then(|t| self.inst(t)) {
				for succ in term.successors() {
					cfg.add_edge(bb.id, succ, ());
				}
			}
		}

		cfg
	}

	fn locate(&self, id: InstId) -> Option<(usize, usize)> {
		if !self.insts.contains(id.0) {
			return None;
		}

		self.blocks.iter()
			.enumerate()
			.find_map(|(i, bb)| bb.position(id).map(|pos| (i, pos)))
	}
}

/// Predecessors of `bb` in `cfg`, sorted.
pub fn predecessors(cfg: &IrCfg, bb: BlockId) -> Vec<BlockId> {
	let mut preds = cfg.neighbors_directed(bb, Direction::Incoming).collect::<Vec<_>>();
	preds.sort();
	preds
}

impl Debug for Function {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		writeln!(f, "fn {} {{", self.name)?;

		for bb in self.blocks.iter() {
			writeln!(f, "{:?}:", bb.id)?;

			for id in bb.insts() {
				writeln!(f, "    {:?}", self.insts[id.0])?;
			}
		}

		writeln!(f, "}}")
	}
}

/// Dumps the CFG in dot format along with the function, at debug level.
pub fn debug_dump_cfg(func: &Function) {
	let cfg = func.cfg();
	log::debug!("CFG for {}:\n{:?}\n{:?}",
		func.name(), Dot::with_config(&cfg, &[DotConfig::EdgeNoLabel]), func);
}
