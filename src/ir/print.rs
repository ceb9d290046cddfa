
use std::fmt::{ Display, Formatter, Result as FmtResult };

use super::*;

// ------------------------------------------------------------------------------------------------
// Text form
// ------------------------------------------------------------------------------------------------

// Debug on Function can't name types, since the type table lives in the Module. These wrappers
// carry it along. The output is stable, so tests compare against it.

/// Returned by [`Function::display`].
pub struct FunctionDisplay<'a>(&'a Function, &'a TypeTable);

/// Returned by [`Module::display`].
pub struct ModuleDisplay<'a>(&'a Module);

impl Function {
	/// Something that prints the function like:
	///
	/// ```text
	/// fn main {
	/// bb0:
	///     %7 = insert v4f32 %5 %6 2
	///     ret
	/// }
	/// ```
	pub fn display<'a>(&'a self, types: &'a TypeTable) -> FunctionDisplay<'a> {
		FunctionDisplay(self, types)
	}
}

impl Module {
	/// Prints globals, then every function.
	pub fn display(&self) -> ModuleDisplay<'_> {
		ModuleDisplay(self)
	}
}

fn write_inst(f: &mut Formatter, types: &TypeTable, inst: &Inst) -> FmtResult {
	if let Some(result) = inst.result() {
		write!(f, "{:?} = ", result)?;
	}

	write!(f, "{}", inst.opcode())?;

	if let Some(ty) = inst.ty() {
		write!(f, " {}", types.name(ty))?;
	}

	for op in inst.operands() {
		write!(f, " {:?}", op)?;
	}

	Ok(())
}

impl<'a> Display for FunctionDisplay<'a> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let FunctionDisplay(func, types) = *self;
		writeln!(f, "fn {} {{", func.name())?;

		for bb in func.blocks() {
			writeln!(f, "{:?}:", bb.id())?;

			for id in bb.insts() {
				if let Some(inst) = func.inst(id) {
					write!(f, "    ")?;
					write_inst(f, types, inst)?;
					writeln!(f)?;
				}
			}
		}

		writeln!(f, "}}")
	}
}

impl<'a> Display for ModuleDisplay<'a> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let m = self.0;

		for (v, global) in m.globals.iter() {
			let ty = m.types.name(global.ty);

			match &global.kind {
				GlobalKind::Constant(bits) => writeln!(f, "{:?} = const {} {:#x}", v, ty, bits)?,
				GlobalKind::ConstantComposite(parts) => {
					write!(f, "{:?} = constcomp {}", v, ty)?;

					for part in parts {
						write!(f, " {:?}", part)?;
					}

					writeln!(f)?;
				}
				GlobalKind::Undef            => writeln!(f, "{:?} = undef {}", v, ty)?,
				GlobalKind::Variable(_)      => writeln!(f, "{:?} = var {}", v, ty)?,
			}
		}

		for func in m.funcs() {
			writeln!(f)?;
			write!(f, "{}", func.display(&m.types))?;
		}

		Ok(())
	}
}
