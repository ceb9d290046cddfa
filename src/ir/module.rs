
use std::collections::{ BTreeMap };

use super::*;

// ------------------------------------------------------------------------------------------------
// Global
// ------------------------------------------------------------------------------------------------

/// What kind of module-level value a [`Global`] is.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum GlobalKind {
	/// A scalar constant, stored as raw bits.
	Constant(u64),
	/// A constant vector made of other constants.
	ConstantComposite(Vec<ValueId>),
	/// An undefined value.
	Undef,
	/// A variable; the global's type is a pointer to it.
	Variable(StorageClass),
}

/// A module-level value. Globals have no defining instruction inside any function.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Global {
	pub ty:   TypeId,
	pub kind: GlobalKind,
}

/// All module-level values, by ID.
#[derive(Default)]
pub struct Globals {
	values: BTreeMap<ValueId, Global>,
}

impl Globals {
	pub fn get(&self, v: ValueId) -> Option<&Global> {
		self.values.get(&v)
	}

	/// The type of a global, if `v` is one.
	pub fn ty(&self, v: ValueId) -> Option<TypeId> {
		self.values.get(&v).map(|g| g.ty)
	}

	pub fn contains(&self, v: ValueId) -> bool {
		self.values.contains_key(&v)
	}

	/// All globals in ID order.
	pub fn iter(&self) -> impl Iterator<Item = (ValueId, &Global)> {
		self.values.iter().map(|(v, g)| (*v, g))
	}

	fn insert(&mut self, v: ValueId, global: Global) {
		self.values.insert(v, global);
	}
}

// ------------------------------------------------------------------------------------------------
// Module
// ------------------------------------------------------------------------------------------------

/// Index of a [`Function`] in its [`Module`].
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct FuncId(pub usize);

/// A set of functions along with the types and globals they share. Value IDs are allocated from
/// the module so they're unique across all of its functions.
#[derive(Default)]
pub struct Module {
	pub types:   TypeTable,
	pub globals: Globals,
	funcs:       Vec<Function>,
	next_value:  u32,
}

impl Module {
	pub fn new() -> Self {
		Self { next_value: 1, ..Self::default() }
	}

	/// Allocates a fresh value ID.
	pub fn fresh_value(&mut self) -> ValueId {
		let ret = ValueId(self.next_value);
		self.next_value += 1;
		ret
	}

	/// Adds a scalar constant global of type `ty` with the given bits.
	pub fn add_constant(&mut self, ty: TypeId, bits: u64) -> ValueId {
		self.add_global(Global { ty, kind: GlobalKind::Constant(bits) })
	}

	/// Shorthand for a 32-bit float constant.
	pub fn const_f32(&mut self, val: f32) -> ValueId {
		let ty = self.types.float(32);
		self.add_constant(ty, val.to_bits() as u64)
	}

	/// Shorthand for a 32-bit signed int constant.
	pub fn const_i32(&mut self, val: i32) -> ValueId {
		let ty = self.types.int(32, true);
		self.add_constant(ty, val as u32 as u64)
	}

	pub fn add_constant_composite(&mut self, ty: TypeId, parts: Vec<ValueId>) -> ValueId {
		self.add_global(Global { ty, kind: GlobalKind::ConstantComposite(parts) })
	}

	pub fn add_undef(&mut self, ty: TypeId) -> ValueId {
		self.add_global(Global { ty, kind: GlobalKind::Undef })
	}

	/// Adds a variable holding a `pointee`. The returned value is a pointer to it.
	pub fn add_variable(&mut self, pointee: TypeId, storage: StorageClass) -> ValueId {
		let ty = self.types.pointer(pointee, storage);
		self.add_global(Global { ty, kind: GlobalKind::Variable(storage) })
	}

	fn add_global(&mut self, global: Global) -> ValueId {
		let v = self.fresh_value();
		self.globals.insert(v, global);
		v
	}

	/// Adds a finished function. Normally [`FunctionBuilder::finish`] does this.
	pub fn add_function(&mut self, func: Function) -> FuncId {
		self.funcs.push(func);
		FuncId(self.funcs.len() - 1)
	}

	/// Panics if `id` did not come from this module.
	pub fn func(&self, id: FuncId) -> &Function {
		&self.funcs[id.0]
	}

	/// Same as above but mutable.
	pub fn func_mut(&mut self, id: FuncId) -> &mut Function {
		&mut self.funcs[id.0]
	}

	pub fn funcs(&self) -> impl Iterator<Item = &Function> {
		self.funcs.iter()
	}

	/// Splits the module into the parts a function pass needs: shared types and globals, plus
	/// each function mutably.
	pub fn parts_mut(&mut self) -> (&TypeTable, &Globals, &mut [Function]) {
		(&self.types, &self.globals, &mut self.funcs)
	}
}
