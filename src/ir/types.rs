
use std::collections::{ HashMap };
use std::fmt::{ Debug, Display, Formatter, Result as FmtResult };

use parse_display::Display;

// ------------------------------------------------------------------------------------------------
// TypeId
// ------------------------------------------------------------------------------------------------

/// Index of an interned [`Type`] in a [`TypeTable`].
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct TypeId(pub u32);

impl Debug for TypeId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "ty{}", self.0)
	}
}

// ------------------------------------------------------------------------------------------------
// StorageClass
// ------------------------------------------------------------------------------------------------

/// Where a pointer points. Stores through `Output` and `Uniform` pointers (and really through any
/// pointer at all) are externally observable.
#[derive(Debug, Display, PartialEq, Eq, Clone, Copy, Hash)]
pub enum StorageClass {
	Function,
	Private,
	Input,
	Output,
	Uniform,
}

// ------------------------------------------------------------------------------------------------
// Type
// ------------------------------------------------------------------------------------------------

/// The types values can have.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Type {
	Void,
	Bool,
	Int     { width: u8, signed: bool },
	Float   { width: u8 },
	Vector  { elem: TypeId, lanes: u32 },
	Pointer { pointee: TypeId, storage: StorageClass },
}

// ------------------------------------------------------------------------------------------------
// TypeTable
// ------------------------------------------------------------------------------------------------

/// Interns types so that equal types always get the same [`TypeId`].
#[derive(Default)]
pub struct TypeTable {
	types:  Vec<Type>,
	lookup: HashMap<Type, TypeId>,
}

impl TypeTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Gets the ID for `ty`, adding it to the table if it isn't there yet.
	pub fn intern(&mut self, ty: Type) -> TypeId {
		if let Some(&id) = self.lookup.get(&ty) {
			return id;
		}

		let id = TypeId(self.types.len() as u32);
		self.types.push(ty);
		self.lookup.insert(ty, id);
		id
	}

	pub fn void(&mut self) -> TypeId {
		self.intern(Type::Void)
	}

	pub fn bool(&mut self) -> TypeId {
		self.intern(Type::Bool)
	}

	pub fn int(&mut self, width: u8, signed: bool) -> TypeId {
		self.intern(Type::Int { width, signed })
	}

	pub fn float(&mut self, width: u8) -> TypeId {
		self.intern(Type::Float { width })
	}

	/// Panics if `elem` is not a scalar type or `lanes` is less than 2.
	pub fn vector(&mut self, elem: TypeId, lanes: u32) -> TypeId {
		assert!(self.is_scalar(elem), "vector element type {:?} must be a scalar", elem);
		assert!(lanes >= 2, "vectors have at least 2 lanes, not {}", lanes);
		self.intern(Type::Vector { elem, lanes })
	}

	pub fn pointer(&mut self, pointee: TypeId, storage: StorageClass) -> TypeId {
		self.intern(Type::Pointer { pointee, storage })
	}

	/// Looks up a type. Panics if `id` did not come from this table.
	pub fn get(&self, id: TypeId) -> &Type {
		&self.types[id.0 as usize]
	}

	/// `true` if `id` came from this table.
	pub fn contains(&self, id: TypeId) -> bool {
		(id.0 as usize) < self.types.len()
	}

	/// If `id` is a vector type, its element type and lane count.
	pub fn vector_info(&self, id: TypeId) -> Option<(TypeId, u32)> {
		match self.get(id) {
			Type::Vector { elem, lanes } => Some((*elem, *lanes)),
			_                            => None,
		}
	}

	/// Lane count of a vector type, `None` for everything else.
	pub fn lanes(&self, id: TypeId) -> Option<u32> {
		self.vector_info(id).map(|(_, lanes)| lanes)
	}

	pub fn is_scalar(&self, id: TypeId) -> bool {
		matches!(self.get(id), Type::Bool | Type::Int { .. } | Type::Float { .. })
	}

	pub fn is_void(&self, id: TypeId) -> bool {
		matches!(self.get(id), Type::Void)
	}

	/// If `id` is a pointer type, what it points to.
	pub fn pointee(&self, id: TypeId) -> Option<TypeId> {
		match self.get(id) {
			Type::Pointer { pointee, .. } => Some(*pointee),
			_                             => None,
		}
	}

	/// Something that displays the type's name, like `v4f32`.
	pub fn name(&self, id: TypeId) -> TypeName<'_> {
		TypeName(self, id)
	}
}

/// Returned by [`TypeTable::name`].
pub struct TypeName<'t>(&'t TypeTable, TypeId);

impl<'t> Display for TypeName<'t> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let TypeName(table, id) = *self;

		if !table.contains(id) {
			return write!(f, "{:?}", id);
		}

		match table.get(id) {
			Type::Void                     => write!(f, "void"),
			Type::Bool                     => write!(f, "bool"),
			Type::Int { width, signed }    => write!(f, "{}{}", if *signed { "i" } else { "u" }, width),
			Type::Float { width }          => write!(f, "f{}", width),
			Type::Vector { elem, lanes }   => write!(f, "v{}{}", lanes, table.name(*elem)),
			Type::Pointer { pointee, storage } =>
				write!(f, "ptr<{}, {}>", storage, table.name(*pointee)),
		}
	}
}
