
use std::collections::{ HashMap };

use super::*;

// ------------------------------------------------------------------------------------------------
// Verifier
// ------------------------------------------------------------------------------------------------

/// Checks that `func` is well-formed SSA which passes can rely on:
///
/// - every value is defined once and every use refers to a definition;
/// - every block ends with exactly one terminator, and phis come first;
/// - phis have exactly one incoming value per CFG predecessor;
/// - composite instructions have the right operand shapes, types and lane indices.
///
/// It does *not* check dominance of defs over uses.
pub fn verify_function(types: &TypeTable, globals: &Globals, func: &Function) -> IrResult<()> {
	let name = func.name();
	let mut value_types = HashMap::new();

	for (v, global) in globals.iter() {
		value_types.insert(v, global.ty);
	}

	for (_, inst) in func.insts() {
		check_result(name, inst)?;

		if let (Some(v), Some(ty)) = (inst.result(), inst.ty()) {
			if value_types.insert(v, ty).is_some() {
				return Err(IrError::redefined(name, v));
			}
		}
	}

	let cfg = func.cfg();

	for bb in func.blocks() {
		check_block_shape(name, func, bb)?;

		for id in bb.insts() {
			// safe, since erasing an instruction also takes it out of its block's list.
			let inst = func.inst(id).unwrap();

			for op in inst.operands() {
				match op {
					Operand::Value(v) if !value_types.contains_key(v) =>
						return Err(IrError::undefined_value(name, *v)),
					Operand::Block(b) if !func.has_block(*b) =>
						return Err(IrError::unknown_block(name, *b)),
					_ => {}
				}
			}

			if inst.opcode() == Opcode::Phi {
				check_phi(name, &cfg, bb.id(), inst)?;
			}

			let ty_of = |v: ValueId| value_types[&v];
			check_composite(name, types, inst, ty_of)?;
		}
	}

	Ok(())
}

fn check_result(name: &str, inst: &Inst) -> IrResult<()> {
	let opcode = inst.opcode();
	let has_result = inst.result().is_some();
	let ok = has_result == inst.ty().is_some() && match opcode {
		Opcode::FunctionCall => true,
		_ if opcode.flags().contains(OpFlags::NO_RESULT) => !has_result,
		_ => has_result,
	};

	if ok {
		Ok(())
	} else {
		Err(IrError::new(name, IrErrorKind::BadResult { opcode: opcode.to_string() }))
	}
}

fn check_block_shape(name: &str, func: &Function, bb: &BasicBlock) -> IrResult<()> {
	let n = bb.len();
	let mut seen_non_phi = false;

	for (i, id) in bb.insts().enumerate() {
		// safe, since erased instructions are never left in a block list.
		let inst = func.inst(id).unwrap();
		let opcode = inst.opcode();

		if opcode.is_terminator() && i != n - 1 {
			return Err(IrError::new(name, IrErrorKind::EarlyTerminator(bb.id().0)));
		}

		if opcode == Opcode::Phi {
			if seen_non_phi {
				let v = inst.result().map(|v| v.0).unwrap_or_default();
				return Err(IrError::new(name, IrErrorKind::MisplacedPhi(v)));
			}
		} else {
			seen_non_phi = true;
		}
	}

	match bb.last().and_then(|t| func.inst(t)) {
		Some(term) if term.opcode().is_terminator() => Ok(()),
		_ => Err(IrError::missing_terminator(name, bb.id())),
	}
}

fn check_phi(name: &str, cfg: &IrCfg, bb: BlockId, inst: &Inst) -> IrResult<()> {
	let mut incoming = inst.phi_incoming().map(|(_, b)| b).collect::<Vec<_>>();
	incoming.sort();

	let well_formed = inst.operands().len() == incoming.len() * 2;

	if !well_formed || incoming != predecessors(cfg, bb) {
		let value = inst.result().map(|v| v.0).unwrap_or_default();
		return Err(IrError::new(name, IrErrorKind::PhiPredecessors { value, block: bb.0 }));
	}

	Ok(())
}

fn check_composite(
	name:  &str,
	types: &TypeTable,
	inst:  &Inst,
	ty_of: impl Fn(ValueId) -> TypeId,
) -> IrResult<()> {
	let opcode = inst.opcode();
	let result = inst.result().map(|v| v.0).unwrap_or_default();
	let bad_operands = || IrError::new(name, IrErrorKind::BadOperands {
		opcode: opcode.to_string(),
		result: format!("%{}", result),
	});
	let mismatch = || IrError::new(name, IrErrorKind::TypeMismatch {
		opcode: opcode.to_string(),
		result: format!("%{}", result),
	});
	let out_of_range = |lane, lanes| IrError::new(name, IrErrorKind::LaneOutOfRange {
		value: result,
		lane,
		lanes,
	});

	// the result check already ran, so these opcodes have a type.
	let result_lanes = || inst.ty().and_then(|ty| types.lanes(ty));

	match opcode {
		Opcode::CompositeInsert => {
			let (obj, base, lane) = inst.as_insert().ok_or_else(bad_operands)?;
			let (elem, lanes) = inst.ty()
				.and_then(|ty| types.vector_info(ty))
				.ok_or_else(mismatch)?;

			if Some(ty_of(base)) != inst.ty() || ty_of(obj) != elem {
				return Err(mismatch());
			}

			if lane >= lanes {
				return Err(out_of_range(lane, lanes));
			}
		}

		Opcode::CompositeExtract => {
			let (src, lane) = inst.as_extract().ok_or_else(bad_operands)?;
			let (elem, lanes) = types.vector_info(ty_of(src)).ok_or_else(mismatch)?;

			if inst.ty() != Some(elem) {
				return Err(mismatch());
			}

			if lane >= lanes {
				return Err(IrError::new(name, IrErrorKind::LaneOutOfRange {
					value: src.0,
					lane,
					lanes,
				}));
			}
		}

		Opcode::CompositeConstruct => {
			let lanes = result_lanes().ok_or_else(mismatch)?;

			if inst.literals().next().is_some() {
				return Err(bad_operands());
			}

			let covered: u32 = inst.value_operands()
				.map(|(_, v)| types.lanes(ty_of(v)).unwrap_or(1))
				.sum();

			if covered != lanes {
				return Err(mismatch());
			}
		}

		Opcode::VectorShuffle => {
			let (a, b, sels) = inst.as_shuffle().ok_or_else(bad_operands)?;
			let lanes = result_lanes().ok_or_else(mismatch)?;
			let na = types.lanes(ty_of(a)).ok_or_else(mismatch)?;
			let nb = types.lanes(ty_of(b)).ok_or_else(mismatch)?;

			if sels.len() != lanes as usize {
				return Err(bad_operands());
			}

			for &sel in sels.iter() {
				if sel != Opcode::SHUFFLE_UNDEF && sel >= na + nb {
					return Err(IrError::new(name, IrErrorKind::BadSelector { value: result, sel }));
				}
			}
		}

		_ => {}
	}

	Ok(())
}
