
use std::collections::{ HashMap };

use crate::ir::*;

// ------------------------------------------------------------------------------------------------
// FunctionBuilder
// ------------------------------------------------------------------------------------------------

/// Helper for building functions. Result types are inferred from operand types wherever the
/// opcode allows it; those methods panic if an operand's type isn't known yet.
pub struct FunctionBuilder<'m> {
	module: &'m mut Module,
	func:   Function,
	cur:    Option<BlockId>,
	defs:   HashMap<ValueId, (InstId, TypeId)>,
}

impl<'m> FunctionBuilder<'m> {
	/// Constructor.
	pub fn new(module: &'m mut Module, name: &str) -> Self {
		Self {
			module,
			func: Function::new(name),
			cur: None,
			defs: HashMap::new(),
		}
	}

	/// Adds a new block. Does not switch to it, unless it's the first one.
	pub fn block(&mut self) -> BlockId {
		let bb = self.func.add_block();

		if self.cur.is_none() {
			self.cur = Some(bb);
		}

		bb
	}

	/// Subsequent instructions will be appended to `bb`.
	pub fn switch_to(&mut self, bb: BlockId) {
		assert!(self.func.has_block(bb), "no block {:?}", bb);
		self.cur = Some(bb);
	}

	/// Verifies the function and adds it to the module.
	pub fn finish(self) -> IrResult<FuncId> {
		verify_function(&self.module.types, &self.module.globals, &self.func)?;
		Ok(self.module.add_function(self.func))
	}

	/// Type of a value defined so far (in this function or as a global).
	pub fn ty_of(&self, v: ValueId) -> TypeId {
		match self.defs.get(&v) {
			Some(&(_, ty)) => ty,
			None => self.module.globals.ty(v)
				.unwrap_or_else(|| panic!("type of {:?} isn't known yet", v)),
		}
	}
}

// ------------------------------------------------------------------------------------------------
// Values
// ------------------------------------------------------------------------------------------------

impl<'m> FunctionBuilder<'m> {
	pub fn undef(&mut self, ty: TypeId) -> ValueId {
		self.value(Opcode::Undef, ty, vec![])
	}

	pub fn constant(&mut self, ty: TypeId, bits: u32) -> ValueId {
		self.value(Opcode::Constant, ty, vec![Operand::Literal(bits)])
	}

	pub fn load(&mut self, ptr: ValueId) -> ValueId {
		let ptr_ty = self.ty_of(ptr);
		let ty = self.module.types.pointee(ptr_ty)
			.unwrap_or_else(|| panic!("load through non-pointer {:?}", ptr));
		self.value(Opcode::Load, ty, vec![ptr.into()])
	}

	/// `ty` is the resulting pointer type.
	pub fn access_chain(&mut self, ty: TypeId, base: ValueId, indices: &[ValueId]) -> ValueId {
		let ops = std::iter::once(base).chain(indices.iter().copied()).map(Operand::from);
		self.value(Opcode::AccessChain, ty, ops)
	}

	pub fn copy(&mut self, src: ValueId) -> ValueId {
		let ty = self.ty_of(src);
		self.value(Opcode::CopyObject, ty, vec![src.into()])
	}

	pub fn fadd(&mut self, a: ValueId, b: ValueId) -> ValueId {
		self.binary(Opcode::FAdd, a, b)
	}

	pub fn fmul(&mut self, a: ValueId, b: ValueId) -> ValueId {
		self.binary(Opcode::FMul, a, b)
	}

	pub fn fsub(&mut self, a: ValueId, b: ValueId) -> ValueId {
		self.binary(Opcode::FSub, a, b)
	}

	pub fn iadd(&mut self, a: ValueId, b: ValueId) -> ValueId {
		self.binary(Opcode::IAdd, a, b)
	}

	pub fn isub(&mut self, a: ValueId, b: ValueId) -> ValueId {
		self.binary(Opcode::ISub, a, b)
	}

	pub fn imul(&mut self, a: ValueId, b: ValueId) -> ValueId {
		self.binary(Opcode::IMul, a, b)
	}

	pub fn slt(&mut self, a: ValueId, b: ValueId) -> ValueId {
		let ty = self.module.types.bool();
		self.value(Opcode::SLessThan, ty, vec![a.into(), b.into()])
	}

	pub fn ine(&mut self, a: ValueId, b: ValueId) -> ValueId {
		let ty = self.module.types.bool();
		self.value(Opcode::INotEqual, ty, vec![a.into(), b.into()])
	}

	pub fn vtimess(&mut self, v: ValueId, s: ValueId) -> ValueId {
		self.binary(Opcode::VectorTimesScalar, v, s)
	}

	pub fn dot(&mut self, a: ValueId, b: ValueId) -> ValueId {
		let (elem, _) = self.vector_info_of(a);
		self.value(Opcode::Dot, elem, vec![a.into(), b.into()])
	}

	/// Calls extended instruction number `number` (e.g. a math library function).
	pub fn ext_inst(&mut self, ty: TypeId, number: u32, args: &[ValueId]) -> ValueId {
		let ops = std::iter::once(Operand::Literal(number))
			.chain(args.iter().copied().map(Operand::from));
		self.value(Opcode::ExtInst, ty, ops)
	}

	/// Calls some function with a result of type `ty`.
	pub fn call(&mut self, ty: TypeId, args: &[ValueId]) -> ValueId {
		self.value(Opcode::FunctionCall, ty, args.iter().copied().map(Operand::from))
	}

	/// Calls some function with no result.
	pub fn call_void(&mut self, args: &[ValueId]) -> InstId {
		self.inst(Inst::new(Opcode::FunctionCall, None, args.iter().copied().map(Operand::from)))
	}

	// --------------------------------------------------------------------------------------------
	// Composites

	/// `base` with its `lane`th lane replaced by `obj`.
	pub fn insert(&mut self, obj: ValueId, base: ValueId, lane: u32) -> ValueId {
		let ty = self.ty_of(base);
		self.value(Opcode::CompositeInsert, ty, vec![obj.into(), base.into(), Operand::Literal(lane)])
	}

	/// The `lane`th lane of `src`.
	pub fn extract(&mut self, src: ValueId, lane: u32) -> ValueId {
		let (elem, _) = self.vector_info_of(src);
		self.value(Opcode::CompositeExtract, elem, vec![src.into(), Operand::Literal(lane)])
	}

	/// A `ty` made by concatenating `parts`.
	pub fn construct(&mut self, ty: TypeId, parts: &[ValueId]) -> ValueId {
		self.value(Opcode::CompositeConstruct, ty, parts.iter().copied().map(Operand::from))
	}

	/// Picks lanes out of `a ++ b`. Use [`Opcode::SHUFFLE_UNDEF`] for don't-care lanes.
	pub fn shuffle(&mut self, a: ValueId, b: ValueId, sels: &[u32]) -> ValueId {
		let (elem, _) = self.vector_info_of(a);
		let ty = self.module.types.vector(elem, sels.len() as u32);
		let ops = vec![Operand::Value(a), Operand::Value(b)].into_iter()
			.chain(sels.iter().map(|&s| Operand::Literal(s)));
		self.value(Opcode::VectorShuffle, ty, ops)
	}

	/// A phi. More incoming values (say, along loop back-edges, which haven't been built yet)
	/// can be added later with [`add_incoming`](Self::add_incoming).
	pub fn phi(&mut self, ty: TypeId, incoming: &[(ValueId, BlockId)]) -> ValueId {
		let ops = incoming.iter().flat_map(|&(v, b)| vec![Operand::Value(v), Operand::Block(b)]);
		self.value(Opcode::Phi, ty, ops)
	}

	/// Adds an incoming value to a phi made with [`phi`](Self::phi).
	pub fn add_incoming(&mut self, phi: ValueId, v: ValueId, pred: BlockId) {
		let &(id, _) = self.defs.get(&phi).unwrap_or_else(|| panic!("{:?} isn't defined", phi));
		// safe, since nothing is erased while building.
		let inst = self.func.inst_mut(id).unwrap();
		assert_eq!(inst.opcode(), Opcode::Phi, "{:?} isn't a phi", phi);
		inst.push_operand(v.into());
		inst.push_operand(pred.into());
	}

	fn binary(&mut self, opcode: Opcode, a: ValueId, b: ValueId) -> ValueId {
		let ty = self.ty_of(a);
		self.value(opcode, ty, vec![a.into(), b.into()])
	}

	fn vector_info_of(&self, v: ValueId) -> (TypeId, u32) {
		let ty = self.ty_of(v);
		self.module.types.vector_info(ty)
			.unwrap_or_else(|| panic!("{:?} is not a vector", v))
	}

	fn value(&mut self, opcode: Opcode, ty: TypeId, ops: impl IntoIterator<Item = Operand>)
	-> ValueId {
		let v = self.module.fresh_value();
		let id = self.inst(Inst::new(opcode, Some((v, ty)), ops));
		self.defs.insert(v, (id, ty));
		v
	}

	fn inst(&mut self, inst: Inst) -> InstId {
		let bb = self.cur.expect("no block to append to; call block() first");
		self.func.append(bb, inst)
	}
}

// ------------------------------------------------------------------------------------------------
// Side effects and terminators
// ------------------------------------------------------------------------------------------------

impl<'m> FunctionBuilder<'m> {
	pub fn store(&mut self, ptr: ValueId, val: ValueId) -> InstId {
		self.inst(Inst::new(Opcode::Store, None, vec![ptr.into(), val.into()]))
	}

	pub fn br(&mut self, target: BlockId) -> InstId {
		self.inst(Inst::new(Opcode::Branch, None, vec![target.into()]))
	}

	pub fn brc(&mut self, cond: ValueId, then: BlockId, els: BlockId) -> InstId {
		self.inst(Inst::new(Opcode::BranchConditional, None,
			vec![cond.into(), then.into(), els.into()]))
	}

	pub fn ret(&mut self) -> InstId {
		self.inst(Inst::new(Opcode::Return, None, vec![]))
	}

	pub fn ret_value(&mut self, v: ValueId) -> InstId {
		self.inst(Inst::new(Opcode::ReturnValue, None, vec![v.into()]))
	}

	pub fn unreachable(&mut self) -> InstId {
		self.inst(Inst::new(Opcode::Unreachable, None, vec![]))
	}
}
